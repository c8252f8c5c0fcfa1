//! Error types for sparsity-kernels

use thiserror::Error;

/// Result type alias using the crate's [`KernelError`]
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors surfaced by executors and structural kernels
#[derive(Error, Debug)]
pub enum KernelError {
    /// A kernel launch did not complete on its backend.
    ///
    /// There is no partial-result recovery: the output buffers of the
    /// failed phase are unusable.
    #[error("execution fault in kernel '{kernel}' on {backend} backend: {reason}")]
    ExecutionFault {
        /// Name of the backend the launch ran on
        backend: &'static str,
        /// Name of the kernel that faulted
        kernel: &'static str,
        /// Panic message or backend diagnostic
        reason: String,
    },

    /// A worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Executor configuration was rejected
    #[error("invalid executor configuration '{field}': {reason}")]
    InvalidConfig {
        /// Offending configuration field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A caller-supplied buffer does not match the pattern it is used with
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Which buffer or dimension disagreed
        what: &'static str,
        /// Size implied by the pattern
        expected: usize,
        /// Size actually supplied
        got: usize,
    },

    /// Pattern arrays violate the CSR invariants
    #[error("invalid sparsity pattern: {0}")]
    InvalidPattern(String),
}

impl KernelError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(what: &'static str, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch { what, expected, got }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error means a launch faulted mid-flight
    pub fn is_execution_fault(&self) -> bool {
        matches!(self, Self::ExecutionFault { .. })
    }
}
