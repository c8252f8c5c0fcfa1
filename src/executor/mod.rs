//! Kernel launch abstraction
//!
//! An [`Executor`] runs one invocation of a kernel body per index of a
//! logical iteration domain. Kernel bodies are written once against the typed
//! views in [`views`] and launched through [`run_kernel`]; they never see
//! which backend executes them.
//!
//! Three engines implement the trait:
//!
//! - [`ReferenceExecutor`]: an in-order loop on the calling thread
//! - [`ThreadedExecutor`]: a rayon parallel iterator over the domain
//! - [`DeviceExecutor`]: an accelerator-style grid of fixed-size blocks
//!
//! Invocations are unordered and must only communicate through disjoint
//! memory. A panic inside a body is caught at the launch boundary and
//! reported as [`KernelError::ExecutionFault`].

pub mod device;
pub mod launch;
pub mod reference;
pub mod threaded;
pub mod views;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::config::Backend;
use crate::error::{KernelError, Result};
use crate::profiler::ProfilerHook;

pub use device::DeviceExecutor;
pub use launch::{run_kernel, run_kernel_2d};
pub use reference::ReferenceExecutor;
pub use threaded::ThreadedExecutor;
pub use views::{DenseView, IndexView, OutputView, RowPtrView};

/// An execution engine for data-parallel kernels
///
/// Implementations must invoke `body(index)` exactly once for every index in
/// `[0, size)` before returning `Ok(())`, and must not return until every
/// invocation of the launch has finished.
pub trait Executor: Send + Sync {
    /// Which backend this engine implements
    fn backend(&self) -> Backend;

    /// Human-readable backend name
    fn name(&self) -> &'static str {
        self.backend().name()
    }

    /// Number of invocations that may run at the same time
    fn num_workers(&self) -> usize;

    /// Preferred number of elements handled by one block of work
    fn block_size(&self) -> usize;

    /// Profiler hook injected at construction
    fn profiler(&self) -> &dyn ProfilerHook;

    /// Invoke `body(index)` once for every index in `[0, size)`
    fn parallel_for(
        &self,
        kernel: &'static str,
        size: usize,
        body: &(dyn Fn(usize) + Sync),
    ) -> Result<()>;

    /// Invoke `body(row, col)` once for every cell of a `rows × cols` domain
    fn parallel_for_2d(
        &self,
        kernel: &'static str,
        rows: usize,
        cols: usize,
        body: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<()> {
        if cols == 0 {
            return Ok(());
        }
        self.parallel_for(kernel, rows * cols, &|idx| body(idx / cols, idx % cols))
    }
}

/// Run `launch` and turn a panic escaping it into an execution fault
pub(crate) fn catch_fault<F>(backend: &'static str, kernel: &'static str, launch: F) -> Result<()>
where
    F: FnOnce(),
{
    panic::catch_unwind(AssertUnwindSafe(launch)).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        log::error!("kernel '{}' faulted on {} backend: {}", kernel, backend, reason);
        KernelError::ExecutionFault {
            backend,
            kernel,
            reason,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "kernel panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_fault_passes_through_success() {
        assert!(catch_fault("reference", "noop", || {}).is_ok());
    }

    #[test]
    fn test_catch_fault_converts_panic() {
        let err = catch_fault("reference", "boom", || panic!("row 3 exploded")).unwrap_err();
        match err {
            KernelError::ExecutionFault {
                backend,
                kernel,
                reason,
            } => {
                assert_eq!(backend, "reference");
                assert_eq!(kernel, "boom");
                assert_eq!(reason, "row 3 exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_catch_fault_formatted_panic() {
        let row = 7;
        let err = catch_fault("device", "fmt", || panic!("row {} exploded", row)).unwrap_err();
        assert!(err.to_string().contains("row 7 exploded"));
    }
}
