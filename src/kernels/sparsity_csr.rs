//! Structural kernels for sparsity-pattern CSR matrices
//!
//! Every kernel runs one invocation per row. Rows write disjoint parts of
//! the output, so no kernel needs locks or atomics:
//!
//! - [`fill_in_dense`] writes only cells `(row, *)` of its own row
//! - [`diagonal_element_prefix_sum`] writes only `prefix_sum[row]`, then
//!   scans the counts once every row has finished
//! - [`remove_diagonal_elements`] writes `row_ptrs[row + 1]` and the
//!   compacted column range of its row, located by subtracting the number of
//!   diagonal entries in earlier rows from the original row offset
//!
//! Compaction depends on a fully computed offset table, so callers run
//! count → scan → compact strictly in that order. [`to_adjacency`] does this.

use ndarray::{Array2, ArrayViewMut2};
use num_traits::Zero;

use crate::components::prefix_sum_nonnegative;
use crate::error::{KernelError, Result};
use crate::executor::{run_kernel, run_kernel_2d, DenseView, Executor, IndexView, OutputView, RowPtrView};
use crate::matrix::{IndexType, SparsityCsr};
use crate::profiler::{EventCategory, ProfilingScope};

/// Writes the shared value at every structural nonzero of `input` into `output`
///
/// Cells not covered by the pattern keep whatever they held before the call;
/// zero `output` first (see [`fill_dense`]) for a plain dense conversion.
///
/// # Errors
///
/// [`KernelError::ShapeMismatch`] if `output` is not `n_rows × n_cols`, or an
/// execution fault from the backend.
pub fn fill_in_dense<T, I>(
    exec: &dyn Executor,
    input: &SparsityCsr<T, I>,
    output: ArrayViewMut2<'_, T>,
) -> Result<()>
where
    T: Copy + Send + Sync,
    I: IndexType,
{
    let (rows, cols) = output.dim();
    if rows != input.n_rows {
        return Err(KernelError::shape_mismatch("dense rows", input.n_rows, rows));
    }
    if cols != input.n_cols {
        return Err(KernelError::shape_mismatch("dense columns", input.n_cols, cols));
    }

    let value = input.value;
    run_kernel(
        exec,
        "fill_in_dense",
        input.n_rows,
        (
            RowPtrView::new(&input.row_ptrs),
            IndexView::new(&input.col_idxs),
            DenseView::new(output),
        ),
        |row, (row_ptrs, col_idxs, output)| {
            for nz in row_ptrs.range(row) {
                // SAFETY: only this invocation writes cells of `row`.
                unsafe { output.set(row, col_idxs.get(nz), value) };
            }
        },
    )
}

/// Counts the diagonal entry of every row and scans the counts
///
/// On success `prefix_sum[r]` is the number of rows before `r` that contain
/// their diagonal entry and `prefix_sum[n_rows]` is the total. The previous
/// content of `prefix_sum` is irrelevant.
///
/// # Errors
///
/// [`KernelError::ShapeMismatch`] if `prefix_sum.len() != n_rows + 1`, or an
/// execution fault from the backend.
pub fn diagonal_element_prefix_sum<T, I>(
    exec: &dyn Executor,
    matrix: &SparsityCsr<T, I>,
    prefix_sum: &mut [I],
) -> Result<()>
where
    I: IndexType,
{
    let num_rows = matrix.n_rows;
    if prefix_sum.len() != num_rows + 1 {
        return Err(KernelError::shape_mismatch(
            "diagonal prefix sum",
            num_rows + 1,
            prefix_sum.len(),
        ));
    }

    run_kernel(
        exec,
        "diagonal_element_count",
        num_rows,
        (
            RowPtrView::new(&matrix.row_ptrs),
            IndexView::new(&matrix.col_idxs),
            OutputView::new(prefix_sum),
        ),
        |row, (row_ptrs, col_idxs, counts)| {
            let count = row_ptrs
                .range(row)
                .filter(|&nz| col_idxs.get(nz) == row)
                .count();
            // SAFETY: only this invocation writes counts[row].
            unsafe { counts.write(row, I::from_index(count)) };
        },
    )?;

    // All counts are materialised once the launch has returned
    prefix_sum_nonnegative(exec, prefix_sum)
}

/// Copies `input` into `out_row_ptrs`/`out_col_idxs` without its diagonal entries
///
/// `diag_prefix_sum` must be the result of [`diagonal_element_prefix_sum`]
/// on the same pattern; this is not re-checked. Surviving entries keep their
/// relative order within each row. `out_col_idxs` may be longer than needed;
/// only its first `nnz - diag_prefix_sum[n_rows]` entries are written.
///
/// # Errors
///
/// [`KernelError::ShapeMismatch`] if a buffer has the wrong length, or an
/// execution fault from the backend.
pub fn remove_diagonal_elements<T, I>(
    exec: &dyn Executor,
    input: &SparsityCsr<T, I>,
    diag_prefix_sum: &[I],
    out_row_ptrs: &mut [I],
    out_col_idxs: &mut [I],
) -> Result<()>
where
    I: IndexType,
{
    let num_rows = input.n_rows;
    if diag_prefix_sum.len() != num_rows + 1 {
        return Err(KernelError::shape_mismatch(
            "diagonal prefix sum",
            num_rows + 1,
            diag_prefix_sum.len(),
        ));
    }
    if out_row_ptrs.len() != num_rows + 1 {
        return Err(KernelError::shape_mismatch(
            "output row pointers",
            num_rows + 1,
            out_row_ptrs.len(),
        ));
    }
    let new_nnz = input.nnz().saturating_sub(diag_prefix_sum[num_rows].index());
    if out_col_idxs.len() < new_nnz {
        return Err(KernelError::shape_mismatch(
            "output column indices",
            new_nnz,
            out_col_idxs.len(),
        ));
    }

    run_kernel(
        exec,
        "remove_diagonal_elements",
        num_rows,
        (
            RowPtrView::new(&input.row_ptrs),
            IndexView::new(&input.col_idxs),
            IndexView::new(diag_prefix_sum),
            OutputView::new(&mut *out_row_ptrs),
            OutputView::new(out_col_idxs),
        ),
        |row, (in_row_ptrs, in_col_idxs, diag_prefix_sum, out_row_ptrs, out_col_idxs)| {
            let in_range = in_row_ptrs.range(row);
            let mut out_idx = in_range.start - diag_prefix_sum.get(row);
            // SAFETY: this row owns out_row_ptrs[row + 1] (and slot 0 for row
            // 0) and the compacted range starting at out_idx, which ends where
            // the next row's range begins.
            unsafe {
                for nz in in_range {
                    let col = in_col_idxs[nz];
                    if col.index() != row {
                        out_col_idxs.write(out_idx, col);
                        out_idx += 1;
                    }
                }
                if row == 0 {
                    out_row_ptrs.write(0, I::zero());
                }
                out_row_ptrs.write(row + 1, I::from_index(out_idx));
            }
        },
    )?;

    if num_rows == 0 {
        out_row_ptrs[0] = I::zero();
    }
    Ok(())
}

/// Returns a copy of `pattern` with all diagonal entries removed
///
/// Runs the count, scan, and compaction phases in order and trims the
/// column array to the new number of nonzeros.
pub fn to_adjacency<T, I>(exec: &dyn Executor, pattern: &SparsityCsr<T, I>) -> Result<SparsityCsr<T, I>>
where
    T: Copy,
    I: IndexType,
{
    let _scope = ProfilingScope::new(exec.profiler(), "to_adjacency", EventCategory::Operation);

    let num_rows = pattern.n_rows;
    let mut diag_prefix_sum = vec![I::zero(); num_rows + 1];
    diagonal_element_prefix_sum(exec, pattern, &mut diag_prefix_sum)?;

    let num_diagonal = diag_prefix_sum[num_rows].index();
    let new_nnz = pattern.nnz() - num_diagonal;

    let mut row_ptrs = vec![I::zero(); num_rows + 1];
    let mut col_idxs = vec![I::zero(); pattern.nnz()];
    remove_diagonal_elements(exec, pattern, &diag_prefix_sum, &mut row_ptrs, &mut col_idxs)?;
    col_idxs.truncate(new_nnz);

    log::debug!(
        "removed {} diagonal entries from {} x {} pattern ({} -> {} nonzeros)",
        num_diagonal,
        pattern.n_rows,
        pattern.n_cols,
        pattern.nnz(),
        new_nnz
    );

    Ok(SparsityCsr {
        n_rows: pattern.n_rows,
        n_cols: pattern.n_cols,
        row_ptrs,
        col_idxs,
        value: pattern.value,
    })
}

/// Sets every element of `output` to `value`
pub fn fill_dense<T>(exec: &dyn Executor, output: ArrayViewMut2<'_, T>, value: T) -> Result<()>
where
    T: Copy + Send + Sync,
{
    let (rows, cols) = output.dim();
    run_kernel_2d(
        exec,
        "fill_dense",
        rows,
        cols,
        DenseView::new(output),
        |row, col, output| {
            // SAFETY: every cell is visited by exactly one invocation.
            unsafe { output.set(row, col, value) };
        },
    )
}

/// Overwrites `output` with the dense form of `pattern`
///
/// Zeroes the whole buffer, then writes the shared value at every structural
/// nonzero.
pub fn write_dense<T, I>(
    exec: &dyn Executor,
    pattern: &SparsityCsr<T, I>,
    mut output: ArrayViewMut2<'_, T>,
) -> Result<()>
where
    T: Copy + Zero + Send + Sync,
    I: IndexType,
{
    let _scope = ProfilingScope::new(exec.profiler(), "write_dense", EventCategory::Operation);
    fill_dense(exec, output.view_mut(), T::zero())?;
    fill_in_dense(exec, pattern, output)
}

/// Allocates the dense form of `pattern`
pub fn to_dense<T, I>(exec: &dyn Executor, pattern: &SparsityCsr<T, I>) -> Result<Array2<T>>
where
    T: Copy + Zero + Send + Sync,
    I: IndexType,
{
    let _scope = ProfilingScope::new(exec.profiler(), "to_dense", EventCategory::Operation);
    let mut dense = Array2::zeros((pattern.n_rows, pattern.n_cols));
    fill_in_dense(exec, pattern, dense.view_mut())?;
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ReferenceExecutor;
    use ndarray::array;

    fn example() -> SparsityCsr<f64, i32> {
        SparsityCsr::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 0, 2], 1.0)
    }

    #[test]
    fn test_fill_in_dense() {
        let exec = ReferenceExecutor::new();
        let mut dense = Array2::<f64>::zeros((3, 3));
        fill_in_dense(&exec, &example(), dense.view_mut()).unwrap();

        assert_eq!(
            dense,
            array![[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn test_fill_in_dense_keeps_untouched_cells() {
        let exec = ReferenceExecutor::new();
        let mut dense = Array2::<f64>::from_elem((3, 3), 7.0);
        fill_in_dense(&exec, &example(), dense.view_mut()).unwrap();

        assert_eq!(
            dense,
            array![[1.0, 1.0, 7.0], [7.0, 1.0, 7.0], [1.0, 7.0, 1.0]]
        );
    }

    #[test]
    fn test_fill_in_dense_shape_mismatch() {
        let exec = ReferenceExecutor::new();
        let mut dense = Array2::<f64>::zeros((3, 2));
        let err = fill_in_dense(&exec, &example(), dense.view_mut()).unwrap_err();
        assert!(matches!(
            err,
            KernelError::ShapeMismatch {
                what: "dense columns",
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn test_diagonal_prefix_sum() {
        let exec = ReferenceExecutor::new();
        let mut prefix_sum = vec![-5i32; 4];
        diagonal_element_prefix_sum(&exec, &example(), &mut prefix_sum).unwrap();
        assert_eq!(prefix_sum, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_diagonal_prefix_sum_wrong_length() {
        let exec = ReferenceExecutor::new();
        let mut prefix_sum = vec![0i32; 3];
        assert!(diagonal_element_prefix_sum(&exec, &example(), &mut prefix_sum).is_err());
    }

    #[test]
    fn test_remove_diagonal_elements() {
        let exec = ReferenceExecutor::new();
        let pattern = example();
        let diag = vec![0, 1, 2, 3];
        let mut row_ptrs = vec![-1i32; 4];
        let mut col_idxs = vec![-1i32; 5];

        remove_diagonal_elements(&exec, &pattern, &diag, &mut row_ptrs, &mut col_idxs).unwrap();

        assert_eq!(row_ptrs, vec![0, 1, 1, 2]);
        assert_eq!(&col_idxs[..2], &[1, 0]);
    }

    #[test]
    fn test_remove_diagonal_buffer_too_small() {
        let exec = ReferenceExecutor::new();
        let pattern = example();
        let diag = vec![0, 1, 2, 3];
        let mut row_ptrs = vec![0i32; 4];
        let mut col_idxs = vec![0i32; 1];

        let err = remove_diagonal_elements(&exec, &pattern, &diag, &mut row_ptrs, &mut col_idxs)
            .unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_empty_pattern() {
        let exec = ReferenceExecutor::new();
        let pattern = SparsityCsr::<f64, usize>::empty(0, 0, 1.0);

        let mut diag = vec![3usize];
        diagonal_element_prefix_sum(&exec, &pattern, &mut diag).unwrap();
        assert_eq!(diag, vec![0]);

        let mut row_ptrs = vec![9usize];
        let mut col_idxs: Vec<usize> = Vec::new();
        remove_diagonal_elements(&exec, &pattern, &diag, &mut row_ptrs, &mut col_idxs).unwrap();
        assert_eq!(row_ptrs, vec![0]);
    }

    #[test]
    fn test_to_adjacency() {
        let exec = ReferenceExecutor::new();
        let adjacency = to_adjacency(&exec, &example()).unwrap();

        assert_eq!(adjacency.row_ptrs, vec![0, 1, 1, 2]);
        assert_eq!(adjacency.col_idxs, vec![1, 0]);
        assert_eq!(adjacency.value, 1.0);
    }

    #[test]
    fn test_write_dense_overwrites() {
        let exec = ReferenceExecutor::new();
        let mut dense = Array2::<f64>::from_elem((3, 3), 4.0);
        write_dense(&exec, &example(), dense.view_mut()).unwrap();
        assert_eq!(dense, to_dense(&exec, &example()).unwrap());
    }
}
