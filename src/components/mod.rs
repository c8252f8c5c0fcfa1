//! Reusable parallel primitives

pub mod prefix_sum;

pub use prefix_sum::{exclusive_scan_in_place, prefix_sum_nonnegative};
