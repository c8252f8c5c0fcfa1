//! Backend-agnostic kernels built on the launch abstraction

pub mod sparsity_csr;

pub use sparsity_csr::{
    diagonal_element_prefix_sum, fill_dense, fill_in_dense, remove_diagonal_elements,
    to_adjacency, to_dense, write_dense,
};
