//! Integer types usable as row pointers and column indices

use std::fmt;

use num_traits::PrimInt;

/// An integer type that stores CSR offsets and column indices
///
/// Conversions are plain casts. Values are assumed to be non-negative and to
/// fit both `usize` and `Self`; the containers that hand patterns to the
/// kernels are responsible for that.
pub trait IndexType: PrimInt + Default + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Convert to a `usize` offset
    fn index(self) -> usize;

    /// Convert a `usize` offset back into this type
    fn from_index(i: usize) -> Self;
}

macro_rules! impl_index_type {
    ($($t:ty),*) => {
        $(
            impl IndexType for $t {
                #[inline]
                fn index(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_index(i: usize) -> Self {
                    i as $t
                }
            }
        )*
    };
}

impl_index_type!(i32, i64, u32, u64, usize);
