//! Typed views handed to kernel bodies
//!
//! Read-only views are plain indexed lookups and may be shared by any number
//! of invocations. Writable views hand out raw element access to every
//! invocation at once; their write methods are `unsafe` because the caller
//! guarantees, by construction of the kernel, that no two invocations touch
//! the same element. Indices are still bounds-checked, so a kernel that
//! computes an out-of-range offset faults instead of corrupting memory.

use std::marker::PhantomData;
use std::ops::{Index, Range};

use ndarray::ArrayViewMut2;

use crate::matrix::IndexType;

/// Row-pointer lookup over a CSR offset table of length `num_rows + 1`
#[derive(Debug, Clone, Copy)]
pub struct RowPtrView<'a, I> {
    ptrs: &'a [I],
}

impl<'a, I: IndexType> RowPtrView<'a, I> {
    /// Wrap an offset table
    pub fn new(ptrs: &'a [I]) -> Self {
        Self { ptrs }
    }

    /// Offset stored at position `i`
    #[inline]
    pub fn get(&self, i: usize) -> usize {
        self.ptrs[i].index()
    }

    /// Flat entry range of row `row`
    #[inline]
    pub fn range(&self, row: usize) -> Range<usize> {
        self.get(row)..self.get(row + 1)
    }

    /// Number of rows described by the table
    pub fn num_rows(&self) -> usize {
        self.ptrs.len().saturating_sub(1)
    }
}

/// Plain indexed lookup into an index array
#[derive(Debug, Clone, Copy)]
pub struct IndexView<'a, I> {
    data: &'a [I],
}

impl<'a, I: IndexType> IndexView<'a, I> {
    /// Wrap an index array
    pub fn new(data: &'a [I]) -> Self {
        Self { data }
    }

    /// Element `i` as a `usize`
    #[inline]
    pub fn get(&self, i: usize) -> usize {
        self.data[i].index()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<I> Index<usize> for IndexView<'_, I> {
    type Output = I;

    #[inline]
    fn index(&self, i: usize) -> &I {
        &self.data[i]
    }
}

/// Shared writable view over a caller-owned slice
pub struct OutputView<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// Invocations on different threads write disjoint elements through the
// same view.
unsafe impl<T: Send> Send for OutputView<'_, T> {}
unsafe impl<T: Send> Sync for OutputView<'_, T> {}

impl<'a, T> OutputView<'a, T> {
    /// Take exclusive ownership of `data` for the duration of a launch
    pub fn new(data: &'a mut [T]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            _marker: PhantomData,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` at position `i`
    ///
    /// # Safety
    ///
    /// No other invocation of the same launch may read or write position `i`.
    #[inline]
    pub unsafe fn write(&self, i: usize, value: T) {
        assert!(i < self.len, "output index {} out of bounds ({})", i, self.len);
        self.ptr.add(i).write(value);
    }

    /// Load the value at position `i`
    ///
    /// # Safety
    ///
    /// No other invocation of the same launch may write position `i`.
    #[inline]
    pub unsafe fn read(&self, i: usize) -> T
    where
        T: Copy,
    {
        assert!(i < self.len, "output index {} out of bounds ({})", i, self.len);
        self.ptr.add(i).read()
    }
}

/// `(row, col)` addressing of a dense matrix, independent of memory order
pub struct DenseView<'a, T> {
    ptr: *mut T,
    rows: usize,
    cols: usize,
    row_stride: isize,
    col_stride: isize,
    _marker: PhantomData<&'a mut T>,
}

unsafe impl<T: Send> Send for DenseView<'_, T> {}
unsafe impl<T: Send> Sync for DenseView<'_, T> {}

impl<'a, T> DenseView<'a, T> {
    /// Wrap a mutable 2-D ndarray view of any layout
    pub fn new(mut view: ArrayViewMut2<'a, T>) -> Self {
        let (rows, cols) = view.dim();
        let strides = view.strides();
        let (row_stride, col_stride) = (strides[0], strides[1]);
        Self {
            ptr: view.as_mut_ptr(),
            rows,
            cols,
            row_stride,
            col_stride,
            _marker: PhantomData,
        }
    }

    /// `(rows, cols)` of the matrix
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> isize {
        assert!(
            row < self.rows && col < self.cols,
            "dense index ({}, {}) out of bounds ({} x {})",
            row,
            col,
            self.rows,
            self.cols
        );
        row as isize * self.row_stride + col as isize * self.col_stride
    }

    /// Store `value` at `(row, col)`
    ///
    /// # Safety
    ///
    /// No other invocation of the same launch may read or write `(row, col)`.
    #[inline]
    pub unsafe fn set(&self, row: usize, col: usize, value: T) {
        let offset = self.offset(row, col);
        self.ptr.offset(offset).write(value);
    }

    /// Load the value at `(row, col)`
    ///
    /// # Safety
    ///
    /// No other invocation of the same launch may write `(row, col)`.
    #[inline]
    pub unsafe fn get(&self, row: usize, col: usize) -> T
    where
        T: Copy,
    {
        let offset = self.offset(row, col);
        self.ptr.offset(offset).read()
    }
}
