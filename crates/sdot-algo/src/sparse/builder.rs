//! Triplet accumulation into a symmetric sparse matrix (C2).
//!
//! Accumulates `(i, j, value)` triples — duplicate coordinates sum, which
//! is exactly `sprs::TriMat`'s own accumulation behavior — and converts
//! to CSR once assembly is done.

use sprs::{CsMat, TriMat};

use sdot_core::error::{SdotError, SdotResult};

/// Accumulates triples for one sparse matrix assembly pass.
pub struct TripletBuilder {
    n: usize,
    triplets: TriMat<f64>,
}

impl TripletBuilder {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            triplets: TriMat::new((n, n)),
        }
    }

    /// Accumulates a single `(i, j, v)` triple. Duplicate coordinates sum.
    #[inline]
    pub fn add_triple(&mut self, i: usize, j: usize, v: f64) {
        self.triplets.add_triplet(i, j, v);
    }

    /// Accumulates parallel `i`, `j`, `v` arrays. Out-of-bounds indices are
    /// skipped when `ignore_oob`, otherwise rejected with `InputInvalid`.
    pub fn add_triples(
        &mut self,
        i: &[usize],
        j: &[usize],
        v: &[f64],
        ignore_oob: bool,
    ) -> SdotResult<()> {
        if i.len() != j.len() || i.len() != v.len() {
            return Err(SdotError::InputInvalid(
                "triplet arrays must have equal length".into(),
            ));
        }
        for ((&row, &col), &val) in i.iter().zip(j.iter()).zip(v.iter()) {
            let in_bounds = row < self.n && col < self.n;
            if !in_bounds {
                if ignore_oob {
                    continue;
                }
                return Err(SdotError::InputInvalid(format!(
                    "triplet index ({row},{col}) out of bounds for {0}x{0} matrix",
                    self.n
                )));
            }
            self.triplets.add_triplet(row, col, val);
        }
        Ok(())
    }

    /// Accumulates a diagonal vector, `D[i]` added to entry `(i,i)`.
    pub fn add_to_diagonal(&mut self, d: &[f64]) {
        for (i, &v) in d.iter().enumerate() {
            self.triplets.add_triplet(i, i, v);
        }
    }

    /// Converts the accumulated triples to CSR.
    pub fn finalize(self) -> CsMat<f64> {
        self.triplets.to_csr()
    }
}

/// Extracts the diagonal of a CSR matrix as a dense vector.
pub fn diag_view(m: &CsMat<f64>) -> Vec<f64> {
    (0..m.rows()).map(|i| m.get(i, i).copied().unwrap_or(0.0)).collect()
}

/// Zero-allocation iteration over the non-zero entries of row `i`, via
/// direct `indptr/indices/data` indexing.
pub fn row_iter(m: &CsMat<f64>, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
    let indptr = m.indptr();
    let start = indptr.index(i);
    let end = indptr.index(i + 1);
    let indices = &m.indices()[start..end];
    let data = &m.data()[start..end];
    indices.iter().zip(data.iter()).map(|(&j, &v)| (j, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_coordinates_sum() {
        let mut b = TripletBuilder::new(2);
        b.add_triple(0, 1, 1.0);
        b.add_triple(0, 1, 2.0);
        let m = b.finalize();
        assert!((m.get(0, 1).copied().unwrap_or(0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_triples_rejects_oob_when_not_ignored() {
        let mut b = TripletBuilder::new(2);
        let err = b.add_triples(&[0], &[5], &[1.0], false);
        assert!(err.is_err());
    }

    #[test]
    fn test_add_triples_skips_oob_when_ignored() {
        let mut b = TripletBuilder::new(2);
        b.add_triples(&[0, 5], &[1, 1], &[1.0, 2.0], true).unwrap();
        let m = b.finalize();
        assert!((m.get(0, 1).copied().unwrap_or(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_to_diagonal() {
        let mut b = TripletBuilder::new(3);
        b.add_to_diagonal(&[1.0, 2.0, 3.0]);
        let m = b.finalize();
        assert!((m.get(1, 1).copied().unwrap_or(0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_diag_view() {
        let mut b = TripletBuilder::new(2);
        b.add_triple(0, 0, 5.0);
        b.add_triple(1, 1, 7.0);
        b.add_triple(0, 1, 9.0);
        let m = b.finalize();
        assert_eq!(diag_view(&m), vec![5.0, 7.0]);
    }

    #[test]
    fn test_row_iter() {
        let mut b = TripletBuilder::new(2);
        b.add_triple(0, 0, 1.0);
        b.add_triple(0, 1, 2.0);
        let m = b.finalize();
        let row: Vec<_> = row_iter(&m, 0).collect();
        assert_eq!(row.len(), 2);
    }
}
