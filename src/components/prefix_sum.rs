//! Exclusive prefix sum over non-negative counts
//!
//! After the scan, `values[i]` holds the sum of the original
//! `values[0..i]`. Scanning a count array of length `n + 1` therefore leaves
//! the grand total of the first `n` counts in the last slot; whatever that
//! slot held before is ignored.
//!
//! Single-worker executors, and inputs that fit in one block, are scanned
//! sequentially. Everything else uses a three-pass blocked scan:
//!
//! 1. per-block totals, one invocation per block
//! 2. exclusive scan of the block totals in aligned scratch
//! 3. local exclusive scan of each block starting from its block offset
//!
//! Counts must fit the index type; overflow is not checked.

use std::ops::Range;

use aligned_vec::AVec;

use crate::error::Result;
use crate::executor::{run_kernel, Executor, OutputView};
use crate::matrix::IndexType;
use crate::profiler::{EventCategory, ProfilingScope};

/// Alignment of scan scratch buffers in bytes
const SCRATCH_ALIGN: usize = 64;

/// Replace `values` with its exclusive prefix sum, in place
pub fn prefix_sum_nonnegative<I: IndexType>(exec: &dyn Executor, values: &mut [I]) -> Result<()> {
    let _scope = ProfilingScope::new(
        exec.profiler(),
        "prefix_sum_nonnegative",
        EventCategory::Internal,
    );

    // The last slot only receives the total and never contributes to it
    let Some((last, head)) = values.split_last_mut() else {
        return Ok(());
    };

    let n = head.len();
    let block_size = exec.block_size().max(1);
    if exec.num_workers() <= 1 || n <= block_size {
        *last = exclusive_scan_in_place(head);
        return Ok(());
    }

    let num_blocks = n.div_ceil(block_size);
    let mut block_offsets: AVec<I> =
        AVec::from_iter(SCRATCH_ALIGN, (0..=num_blocks).map(|_| I::zero()));

    run_kernel(
        exec,
        "prefix_sum_block_totals",
        num_blocks,
        (&head[..], OutputView::new(&mut block_offsets[..])),
        |block, (values, totals)| {
            let total = values[block_range(block, block_size, n)]
                .iter()
                .fold(I::zero(), |acc, &v| acc + v);
            // SAFETY: each block writes only its own total.
            unsafe { totals.write(block, total) };
        },
    )?;

    // Slot num_blocks ends up holding the grand total
    exclusive_scan_in_place(&mut block_offsets[..]);

    run_kernel(
        exec,
        "prefix_sum_block_scan",
        num_blocks,
        (&block_offsets[..], OutputView::new(&mut *head)),
        |block, (offsets, values)| {
            let mut running = offsets[block];
            for i in block_range(block, block_size, n) {
                // SAFETY: blocks cover disjoint index ranges.
                unsafe {
                    let count = values.read(i);
                    values.write(i, running);
                    running = running + count;
                }
            }
        },
    )?;

    *last = block_offsets[num_blocks];
    Ok(())
}

/// Sequential exclusive scan, in place; returns the sum of all inputs
pub fn exclusive_scan_in_place<I: IndexType>(values: &mut [I]) -> I {
    let mut sum = I::zero();
    for value in values.iter_mut() {
        let count = *value;
        debug_assert!(count >= I::zero(), "prefix sum input must be non-negative");
        *value = sum;
        sum = sum + count;
    }
    sum
}

fn block_range(block: usize, block_size: usize, n: usize) -> Range<usize> {
    let start = block * block_size;
    start..(start + block_size).min(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, ExecutorConfig};
    use crate::executor::{DeviceExecutor, ReferenceExecutor, ThreadedExecutor};
    use crate::profiler::NoopProfiler;
    use std::sync::Arc;

    #[test]
    fn test_exclusive_scan() {
        let mut values = vec![1usize, 2, 3, 4];
        assert_eq!(exclusive_scan_in_place(&mut values), 10);
        assert_eq!(values, vec![0, 1, 3, 6]);

        let mut values = vec![0i32, 0, 5, 0, 0];
        exclusive_scan_in_place(&mut values);
        assert_eq!(values, vec![0, 0, 0, 5, 5]);

        let mut values: Vec<u32> = Vec::new();
        exclusive_scan_in_place(&mut values);
        assert!(values.is_empty());
    }

    #[test]
    fn test_last_slot_is_ignored() {
        let exec = ReferenceExecutor::new();
        let mut values = vec![1i64, 1, 0, 1, -99];
        prefix_sum_nonnegative(&exec, &mut values).unwrap();
        assert_eq!(values, vec![0, 1, 2, 2, 3]);

        let mut values = vec![i32::MAX];
        prefix_sum_nonnegative(&exec, &mut values).unwrap();
        assert_eq!(values, vec![0]);

        let mut values: Vec<u64> = Vec::new();
        prefix_sum_nonnegative(&exec, &mut values).unwrap();
    }

    #[test]
    fn test_blocked_matches_sequential() {
        let mut input: Vec<u32> = (0..1000u32).map(|i| (i * 7 + 3) % 5).collect();
        input.push(u32::MAX);
        let mut expected = input.clone();
        let (last, head) = expected.split_last_mut().unwrap();
        *last = exclusive_scan_in_place(head);

        // Small blocks so that the blocked path runs with many blocks
        let threaded = ThreadedExecutor::new(
            &ExecutorConfig::for_backend(Backend::Threaded)
                .with_threads(4)
                .with_block_size(33),
            Arc::new(NoopProfiler),
        )
        .unwrap();
        let device = DeviceExecutor::new(
            &ExecutorConfig::for_backend(Backend::Device).with_block_size(32),
            Arc::new(NoopProfiler),
        )
        .unwrap();

        let executors: [&dyn Executor; 2] = [&threaded, &device];
        for exec in executors {
            let mut values = input.clone();
            prefix_sum_nonnegative(exec, &mut values).unwrap();
            assert_eq!(values, expected, "backend {}", exec.name());
        }
    }

    #[test]
    fn test_block_range_clamps() {
        assert_eq!(block_range(0, 4, 10), 0..4);
        assert_eq!(block_range(2, 4, 10), 8..10);
    }
}
