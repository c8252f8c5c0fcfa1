//! Sparsity-pattern matrix in Compressed Sparse Row (CSR) layout

use std::fmt;

use num_traits::One;

use crate::error::{KernelError, Result};
use crate::matrix::IndexType;

/// A sparse matrix whose structural nonzeros all share one value
///
/// The pattern is stored in CSR form:
/// - row_ptrs: Array of size n_rows + 1; row i occupies col_idxs[row_ptrs[i]..row_ptrs[i + 1]]
/// - col_idxs: Array of size nnz containing the column of every structural nonzero
///
/// Column indices within a row need not be sorted, but their order is kept
/// by every transformation in this crate.
#[derive(Clone, PartialEq)]
pub struct SparsityCsr<T, I = usize> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptrs[0] is 0 and row_ptrs[n_rows] is equal to nnz
    pub row_ptrs: Vec<I>,

    /// Column indices (size: nnz)
    pub col_idxs: Vec<I>,

    /// Value shared by every structural nonzero
    pub value: T,
}

impl<T, I> SparsityCsr<T, I>
where
    T: Copy,
    I: IndexType,
{
    /// Creates a new pattern, checking the CSR invariants
    ///
    /// Returns [`KernelError::InvalidPattern`] if:
    /// - row_ptrs.len() is not n_rows + 1
    /// - row_ptrs[0] is not 0 or row_ptrs decreases anywhere
    /// - row_ptrs[n_rows] is not col_idxs.len()
    /// - a column index is negative or not below n_cols
    /// - a row lists the same column twice
    pub fn try_new(
        n_rows: usize,
        n_cols: usize,
        row_ptrs: Vec<I>,
        col_idxs: Vec<I>,
        value: T,
    ) -> Result<Self> {
        if row_ptrs.len() != n_rows + 1 {
            return Err(KernelError::InvalidPattern(format!(
                "row_ptrs.len() must be n_rows + 1 (got {}, n_rows = {})",
                row_ptrs.len(),
                n_rows
            )));
        }
        if row_ptrs[0] != I::zero() {
            return Err(KernelError::InvalidPattern(
                "row_ptrs[0] must be 0".to_string(),
            ));
        }
        if let Some(row) = row_ptrs.windows(2).position(|w| w[1] < w[0]) {
            return Err(KernelError::InvalidPattern(format!(
                "row_ptrs must be non-decreasing (row {})",
                row
            )));
        }
        if row_ptrs[n_rows].index() != col_idxs.len() {
            return Err(KernelError::InvalidPattern(format!(
                "row_ptrs[n_rows] must equal col_idxs.len() ({} != {})",
                row_ptrs[n_rows],
                col_idxs.len()
            )));
        }

        // Check that column indices are within bounds
        for &col in &col_idxs {
            if col < I::zero() || col.index() >= n_cols {
                return Err(KernelError::InvalidPattern(format!(
                    "column index {} out of bounds (n_cols = {})",
                    col, n_cols
                )));
            }
        }

        let mut seen = Vec::new();
        for row in 0..n_rows {
            seen.clear();
            seen.extend_from_slice(&col_idxs[row_ptrs[row].index()..row_ptrs[row + 1].index()]);
            seen.sort_unstable();
            if seen.windows(2).any(|w| w[0] == w[1]) {
                return Err(KernelError::InvalidPattern(format!(
                    "row {} contains a duplicate column",
                    row
                )));
            }
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptrs,
            col_idxs,
            value,
        })
    }

    /// Creates a new pattern with the given dimensions and data
    ///
    /// # Panics
    ///
    /// Panics if the arrays are inconsistent; see [`SparsityCsr::try_new`].
    pub fn new(n_rows: usize, n_cols: usize, row_ptrs: Vec<I>, col_idxs: Vec<I>, value: T) -> Self {
        match Self::try_new(n_rows, n_cols, row_ptrs, col_idxs, value) {
            Ok(pattern) => pattern,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a pattern with no structural nonzeros
    pub fn empty(n_rows: usize, n_cols: usize, value: T) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptrs: vec![I::zero(); n_rows + 1],
            col_idxs: Vec::new(),
            value,
        }
    }

    /// Creates the pattern of an `n × n` identity matrix
    pub fn identity(n: usize, value: T) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptrs: (0..=n).map(I::from_index).collect(),
            col_idxs: (0..n).map(I::from_index).collect(),
            value,
        }
    }
}

impl<T, I: IndexType> SparsityCsr<T, I> {
    /// Returns the number of structural nonzeros
    pub fn nnz(&self) -> usize {
        self.col_idxs.len()
    }

    /// Returns an iterator over the columns of row i, in stored order
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        assert!(i < self.n_rows, "Row index out of bounds");

        let start = self.row_ptrs[i].index();
        let end = self.row_ptrs[i + 1].index();

        self.col_idxs[start..end].iter().map(|col| col.index())
    }

    /// Whether row i has a structural nonzero in column i
    pub fn has_diagonal(&self, i: usize) -> bool {
        self.row_iter(i).any(|col| col == i)
    }
}

impl<T, I> SparsityCsr<T, I>
where
    T: Copy + One,
    I: IndexType,
{
    /// Creates a pattern whose shared value is one
    pub fn from_structure(
        n_rows: usize,
        n_cols: usize,
        row_ptrs: Vec<I>,
        col_idxs: Vec<I>,
    ) -> Result<Self> {
        Self::try_new(n_rows, n_cols, row_ptrs, col_idxs, T::one())
    }
}

/// Rows past this many are left out of the `Debug` output
const DEBUG_ROWS: usize = 5;

impl<T: fmt::Debug, I: IndexType> fmt::Debug for SparsityCsr<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<usize>> = (0..self.n_rows.min(DEBUG_ROWS))
            .map(|row| self.row_iter(row).collect())
            .collect();

        f.debug_struct("SparsityCsr")
            .field("shape", &(self.n_rows, self.n_cols))
            .field("nnz", &self.nnz())
            .field("value", &self.value)
            .field("rows", &rows)
            .finish()
    }
}
