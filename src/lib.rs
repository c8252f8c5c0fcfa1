//! # sparsity-kernels: portable parallel kernels for sparsity patterns
//!
//! This library implements structural transformations of sparsity-pattern
//! matrices (CSR matrices whose nonzeros all share one value) as kernels that
//! are written once and run unchanged on several parallel backends.
//!
//! ## Overview
//!
//! - **Kernel launch abstraction** ([`executor`]): an [`Executor`] invokes a
//!   kernel body once per index of an iteration domain. Bodies read and write
//!   through typed views and never name their backend.
//! - **Prefix sum** ([`components`]): exclusive scan turning per-row counts
//!   into per-row output offsets.
//! - **Structural kernels** ([`kernels`]): dense fill-in, diagonal counting,
//!   and stable removal of diagonal entries.
//!
//! ## Backends
//!
//! - `Reference`: sequential loop on the calling thread
//! - `Threaded`: rayon parallel iterator on a private pool
//! - `Device`: accelerator model, a grid of fixed-size blocks
//!
//! ## Usage
//!
//! ```
//! use sparsity_kernels::{create_executor, to_adjacency, Backend, ExecutorConfig, SparsityCsr};
//!
//! let pattern = SparsityCsr::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 0, 2], 1.0);
//! let exec = create_executor(&ExecutorConfig::for_backend(Backend::Threaded)).unwrap();
//!
//! let adjacency = to_adjacency(exec.as_ref(), &pattern).unwrap();
//! assert_eq!(adjacency.row_ptrs, vec![0, 1, 1, 2]);
//! assert_eq!(adjacency.col_idxs, vec![1, 0]);
//! ```
//!
//! The two compaction phases can also be driven with caller-owned buffers:
//!
//! ```
//! use sparsity_kernels::executor::ReferenceExecutor;
//! use sparsity_kernels::{diagonal_element_prefix_sum, remove_diagonal_elements, SparsityCsr};
//!
//! let pattern = SparsityCsr::new(2, 2, vec![0usize, 2, 3], vec![1, 0, 1], 1.0);
//! let exec = ReferenceExecutor::new();
//!
//! let mut diag = vec![0; 3];
//! diagonal_element_prefix_sum(&exec, &pattern, &mut diag).unwrap();
//! assert_eq!(diag, vec![0, 1, 2]);
//!
//! let mut row_ptrs = vec![0; 3];
//! let mut col_idxs = vec![0; pattern.nnz()];
//! remove_diagonal_elements(&exec, &pattern, &diag, &mut row_ptrs, &mut col_idxs).unwrap();
//! assert_eq!(row_ptrs, vec![0, 1, 1]);
//! assert_eq!(col_idxs[..1], [1]);
//! ```

pub mod components;
pub mod config;
pub mod error;
pub mod executor;
pub mod kernels;
pub mod matrix;
pub mod profiler;

// Re-export primary components
pub use components::prefix_sum_nonnegative;
pub use config::{
    create_executor, create_executor_with_profiler, Backend, DeviceProperties, ExecutorConfig,
    SystemParameters,
};
pub use error::{KernelError, Result};
pub use executor::{run_kernel, run_kernel_2d, Executor};
pub use kernels::{
    diagonal_element_prefix_sum, fill_dense, fill_in_dense, remove_diagonal_elements,
    to_adjacency, to_dense, write_dense,
};
pub use matrix::{IndexType, SparsityCsr};
pub use profiler::{EventCategory, LogProfiler, NoopProfiler, ProfilerHook, ProfilingScope};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
