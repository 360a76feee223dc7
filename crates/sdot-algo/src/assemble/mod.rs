//! Gradient (C5) and Hessian (C6) assembly from a Laguerre diagram.

pub mod areas;
pub mod hessian;

pub use areas::{cell_areas, count_empty_cells};
pub use hessian::assemble_hessian;
