//! Conversion between sparsity patterns and sprs matrices

use num_traits::Num;
use sprs::CsMat;

use crate::matrix::{IndexType, SparsityCsr};

impl<T, I> SparsityCsr<T, I>
where
    T: Copy,
    I: IndexType,
{
    /// Takes the structure of an sprs matrix, discarding its values
    ///
    /// CSC input is converted to CSR first. Every stored entry becomes a
    /// structural nonzero carrying `value`, explicit zeros included.
    pub fn from_csmat<N>(matrix: &CsMat<N>, value: T) -> Self
    where
        N: Copy + Num + Default,
    {
        let converted;
        let matrix = if matrix.is_csr() {
            matrix
        } else {
            converted = matrix.to_csr();
            &converted
        };

        let (n_rows, n_cols) = matrix.shape();
        let mut row_ptrs = Vec::with_capacity(n_rows + 1);
        let mut col_idxs = Vec::with_capacity(matrix.nnz());

        row_ptrs.push(I::zero());
        for row in matrix.outer_iterator() {
            col_idxs.extend(row.iter().map(|(col, _)| I::from_index(col)));
            row_ptrs.push(I::from_index(col_idxs.len()));
        }

        Self {
            n_rows,
            n_cols,
            row_ptrs,
            col_idxs,
            value,
        }
    }

    /// Converts to an sprs CSR matrix in which every entry holds the shared value
    ///
    /// sprs requires sorted indices, so each row is emitted in ascending
    /// column order regardless of the stored order.
    pub fn to_csmat(&self) -> CsMat<T> {
        let mut indices: Vec<usize> = self.col_idxs.iter().map(|c| c.index()).collect();
        for row in 0..self.n_rows {
            let start = self.row_ptrs[row].index();
            let end = self.row_ptrs[row + 1].index();
            indices[start..end].sort_unstable();
        }

        let indptr: Vec<usize> = self.row_ptrs.iter().map(|p| p.index()).collect();
        let data = vec![self.value; indices.len()];

        CsMat::new((self.n_rows, self.n_cols), indptr, indices, data)
    }
}
