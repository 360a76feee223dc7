//! Sparse matrix assembly (C2): triplet accumulation into CSR.

pub mod builder;

pub use builder::{diag_view, row_iter, TripletBuilder};
