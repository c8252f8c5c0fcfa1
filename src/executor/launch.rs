//! Kernel launch helpers
//!
//! `run_kernel(exec, name, size, args, body)` calls `body(index, &args)` once
//! per index. `args` is usually a tuple of views; bundling them separately
//! from the body keeps kernel bodies free of captured backend state.

use crate::error::Result;
use crate::executor::Executor;
use crate::profiler::{EventCategory, ProfilingScope};

/// Launch `body` over the 1-D domain `[0, size)`
pub fn run_kernel<A, F>(
    exec: &dyn Executor,
    name: &'static str,
    size: usize,
    args: A,
    body: F,
) -> Result<()>
where
    A: Sync,
    F: Fn(usize, &A) + Sync,
{
    let _scope = ProfilingScope::new(exec.profiler(), name, EventCategory::Kernel);
    log::trace!("launch '{}' over {} indices on {}", name, size, exec.name());

    let args = &args;
    exec.parallel_for(name, size, &|idx| body(idx, args))
}

/// Launch `body` over the 2-D domain `[0, rows) × [0, cols)`
pub fn run_kernel_2d<A, F>(
    exec: &dyn Executor,
    name: &'static str,
    rows: usize,
    cols: usize,
    args: A,
    body: F,
) -> Result<()>
where
    A: Sync,
    F: Fn(usize, usize, &A) + Sync,
{
    let _scope = ProfilingScope::new(exec.profiler(), name, EventCategory::Kernel);
    log::trace!(
        "launch '{}' over {} x {} cells on {}",
        name,
        rows,
        cols,
        exec.name()
    );

    let args = &args;
    exec.parallel_for_2d(name, rows, cols, &|row, col| body(row, col, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{OutputView, ReferenceExecutor};

    #[test]
    fn test_run_kernel_passes_args() {
        let exec = ReferenceExecutor::new();
        let input = [1u64, 2, 3, 4];
        let mut output = [0u64; 4];

        run_kernel(
            &exec,
            "square",
            input.len(),
            (&input[..], OutputView::new(&mut output)),
            |i, (input, output)| unsafe { output.write(i, input[i] * input[i]) },
        )
        .unwrap();

        assert_eq!(output, [1, 4, 9, 16]);
    }

    #[test]
    fn test_run_kernel_2d_passes_args() {
        let exec = ReferenceExecutor::new();
        let mut output = [0usize; 6];

        run_kernel_2d(
            &exec,
            "index",
            2,
            3,
            OutputView::new(&mut output),
            |r, c, output| unsafe { output.write(r * 3 + c, r * 10 + c) },
        )
        .unwrap();

        assert_eq!(output, [0, 1, 2, 10, 11, 12]);
    }
}
