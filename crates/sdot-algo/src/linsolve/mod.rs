//! Symmetric linear solve `H·p = b` (C3): a direct dense-factorization
//! path and a preconditioned conjugate-gradient path, selected per
//! `SolverKind`.

mod direct;
mod iterative;

pub use direct::DirectSolver;
pub use iterative::IterativeSolver;

use sprs::CsMat;

use sdot_core::error::SdotResult;

/// Which linear-solve backend `one_iteration` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Direct,
    Iterative,
}

/// Strategy boundary for `H·p = b`: swap `DirectSolver` and
/// `IterativeSolver` without touching the Newton loop that calls them.
pub trait LinearSolver {
    /// Solves `H·p = b`, returning `p`.
    fn solve(&mut self, h: &CsMat<f64>, b: &[f64]) -> SdotResult<Vec<f64>>;
}
