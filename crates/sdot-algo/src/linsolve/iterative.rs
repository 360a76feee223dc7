//! Iterative solve: preconditioned conjugate gradients on the operator
//! `x ↦ H·x + diag·x` with a Jacobi (diagonal) preconditioner
//! (`M: x ↦ x/diag`, `tol=1e-3`).
//!
//! The Hessian itself is passed in unregularized here; the diagonal
//! carries the regularization the direct path folds into the matrix.

use sprs::CsMat;

use sdot_core::error::{SdotError, SdotResult};

use crate::sparse::{diag_view, row_iter};

use super::LinearSolver;

/// Relative residual tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Conjugate-gradient breakdown guard: `|p·Ap|` below this is treated as a
/// failed search direction rather than a division by a tiny number.
const BREAKDOWN_EPS: f64 = 1e-15;

/// PCG with Jacobi preconditioning on `H + diag(extra_diag)`.
pub struct IterativeSolver {
    /// Extra diagonal term added to the matvec (the regularization term
    /// when used, or simply the Hessian's own diagonal when not).
    extra_diag: Vec<f64>,
    max_iterations: usize,
    tolerance: f64,
}

impl IterativeSolver {
    /// `max_iterations` defaults to `10*n` when `None`.
    pub fn new(extra_diag: Vec<f64>, max_iterations: Option<usize>) -> Self {
        let n = extra_diag.len();
        Self {
            extra_diag,
            max_iterations: max_iterations.unwrap_or(10 * n),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn matvec(&self, h: &CsMat<f64>, x: &[f64], out: &mut [f64]) {
        for i in 0..x.len() {
            let mut acc = self.extra_diag[i] * x[i];
            for (j, v) in row_iter(h, i) {
                acc += v * x[j];
            }
            out[i] = acc;
        }
    }
}

impl LinearSolver for IterativeSolver {
    fn solve(&mut self, h: &CsMat<f64>, b: &[f64]) -> SdotResult<Vec<f64>> {
        let n = b.len();
        if h.rows() != n || self.extra_diag.len() != n {
            return Err(SdotError::LinearSolveFailed(
                "dimension mismatch between matrix, diagonal, and rhs".into(),
            ));
        }

        // Jacobi preconditioner operates on H's own diagonal plus the
        // extra term, same as the diagonal the matvec itself uses.
        let h_diag = diag_view(h);
        let precond_diag: Vec<f64> = h_diag
            .iter()
            .zip(self.extra_diag.iter())
            .map(|(&hd, &ed)| hd + ed)
            .collect();

        let mut x = vec![0.0; n];
        let mut ax = vec![0.0; n];
        self.matvec(h, &x, &mut ax);
        let mut r: Vec<f64> = b.iter().zip(ax.iter()).map(|(&bi, &axi)| bi - axi).collect();

        let b_norm = norm2(b).max(1e-300);
        if norm2(&r) / b_norm <= self.tolerance {
            return Ok(x);
        }

        let mut z = jacobi_apply(&precond_diag, &r);
        let mut p = z.clone();
        let mut rz_old = dot(&r, &z);

        for _ in 0..self.max_iterations {
            let mut ap = vec![0.0; n];
            self.matvec(h, &p, &mut ap);
            let p_ap = dot(&p, &ap);
            if p_ap.abs() < BREAKDOWN_EPS {
                return Err(SdotError::LinearSolveFailed(
                    "conjugate gradient breakdown (p·Ap ≈ 0)".into(),
                ));
            }
            let alpha = rz_old / p_ap;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }
            if norm2(&r) / b_norm <= self.tolerance {
                return Ok(x);
            }
            z = jacobi_apply(&precond_diag, &r);
            let rz_new = dot(&r, &z);
            let beta = rz_new / rz_old;
            for i in 0..n {
                p[i] = z[i] + beta * p[i];
            }
            rz_old = rz_new;
        }

        Err(SdotError::LinearSolveFailed(format!(
            "conjugate gradient did not converge in {} iterations",
            self.max_iterations
        )))
    }
}

fn jacobi_apply(diag: &[f64], r: &[f64]) -> Vec<f64> {
    r.iter()
        .zip(diag.iter())
        .map(|(&ri, &di)| if di.abs() > 1e-300 { ri / di } else { ri })
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}

fn norm2(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}
