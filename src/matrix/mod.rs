// Matrix data structures and conversions

pub mod conversion;
pub mod index;
pub mod sparsity;

pub use index::IndexType;
pub use sparsity::SparsityCsr;
