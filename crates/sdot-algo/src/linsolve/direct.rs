//! Direct solve: dense LU factorization with partial pivoting, applied to
//! the Tikhonov-regularized Hessian `H + α·diag(ν)`.
//!
//! The regularization kills the constant-vector kernel of the unregularized
//! Hessian; without it the dense factorization below would hit a
//! near-zero pivot on the last column.

use sprs::CsMat;

use sdot_core::error::{SdotError, SdotResult};

use super::LinearSolver;

/// Tikhonov coefficient `α` in `H + α·ν·I`.
pub const DEFAULT_REGULARIZATION: f64 = 1e-6;

/// Dense LU with partial pivoting, refactorized from scratch on every
/// `solve` call: the Hessian changes every Newton substep, so there is no
/// incremental-update opportunity to exploit.
#[derive(Debug, Default)]
pub struct DirectSolver;

impl DirectSolver {
    pub fn new() -> Self {
        Self
    }

    fn lu_factorize(matrix: &[f64], n: usize) -> Result<(Vec<f64>, Vec<usize>), String> {
        let mut lu = matrix.to_vec();
        let mut pivots = vec![0usize; n];

        for k in 0..n {
            let mut max_val = lu[k * n + k].abs();
            let mut max_idx = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_idx = i;
                }
            }
            if max_val < 1e-14 {
                return Err(format!("singular matrix at column {k}"));
            }
            pivots[k] = max_idx;
            if max_idx != k {
                for j in 0..n {
                    lu.swap(k * n + j, max_idx * n + j);
                }
            }
            let pivot = lu[k * n + k];
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }
        Ok((lu, pivots))
    }

    fn lu_solve(lu: &[f64], pivots: &[usize], b: &mut [f64], n: usize) {
        for k in 0..n {
            if pivots[k] != k {
                b.swap(k, pivots[k]);
            }
        }
        for i in 1..n {
            for j in 0..i {
                b[i] -= lu[i * n + j] * b[j];
            }
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                b[i] -= lu[i * n + j] * b[j];
            }
            b[i] /= lu[i * n + i];
        }
    }
}

impl LinearSolver for DirectSolver {
    fn solve(&mut self, h: &CsMat<f64>, b: &[f64]) -> SdotResult<Vec<f64>> {
        let n = h.rows();
        if b.len() != n {
            return Err(SdotError::LinearSolveFailed(format!(
                "rhs length {} does not match matrix dimension {n}",
                b.len()
            )));
        }
        let mut dense = vec![0.0; n * n];
        for (val, (i, j)) in h.iter() {
            dense[i * n + j] = *val;
        }
        let (lu, pivots) = Self::lu_factorize(&dense, n)
            .map_err(SdotError::LinearSolveFailed)?;
        let mut x = b.to_vec();
        Self::lu_solve(&lu, &pivots, &mut x, n);
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::TripletBuilder;

    /// Builds a regularized 2x2 Laplacian: [[2+r,-1],[-1,2+r]].
    fn laplacian_2x2(r: f64) -> CsMat<f64> {
        let mut b = TripletBuilder::new(2);
        b.add_triple(0, 0, 2.0 + r);
        b.add_triple(1, 1, 2.0 + r);
        b.add_triple(0, 1, -1.0);
        b.add_triple(1, 0, -1.0);
        b.finalize()
    }

    #[test]
    fn test_solves_small_spd_system() {
        let h = laplacian_2x2(1e-6);
        let mut solver = DirectSolver::new();
        let p = solver.solve(&h, &[1.0, 1.0]).unwrap();
        // H*p ≈ b
        let r0 = (2.0 + 1e-6) * p[0] - p[1] - 1.0;
        let r1 = (2.0 + 1e-6) * p[1] - p[0] - 1.0;
        assert!(r0.abs() < 1e-8);
        assert!(r1.abs() < 1e-8);
    }

    #[test]
    fn test_unregularized_singular_laplacian_fails() {
        // Pure row-sum-zero Laplacian without regularization is singular.
        let h = laplacian_2x2(0.0);
        let mut solver = DirectSolver::new();
        let err = solver.solve(&h, &[1.0, -1.0]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_mismatched_rhs_length() {
        let h = laplacian_2x2(1e-6);
        let mut solver = DirectSolver::new();
        assert!(solver.solve(&h, &[1.0]).is_err());
    }
}
