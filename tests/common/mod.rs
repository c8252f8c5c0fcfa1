//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use sparsity_kernels::{create_executor, Backend, Executor, ExecutorConfig, SparsityCsr};

/// One executor per backend, with blocks small enough that even tiny
/// inputs are split across several blocks
pub fn executors() -> Vec<Arc<dyn Executor>> {
    Backend::ALL
        .iter()
        .map(|&backend| create_executor(&small_block_config(backend)).unwrap())
        .collect()
}

pub fn small_block_config(backend: Backend) -> ExecutorConfig {
    let mut config = ExecutorConfig::for_backend(backend)
        .with_threads(4)
        .with_block_size(8);
    config.device.warp_size = 4;
    config.device.num_multiprocessors = 4;
    config
}

/// 3 rows: row0 = {0, 1}, row1 = {1}, row2 = {0, 2}
pub fn example_pattern() -> SparsityCsr<f64, i32> {
    SparsityCsr::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 0, 2], 1.0)
}

/// Columns of every row, in stored order
pub fn rows_of<T: Copy, I: sparsity_kernels::IndexType>(
    pattern: &SparsityCsr<T, I>,
) -> Vec<Vec<usize>> {
    (0..pattern.n_rows)
        .map(|row| pattern.row_iter(row).collect())
        .collect()
}
