//! Seed points and target masses.

use crate::domain::Domain;
use crate::error::{SdotError, SdotResult};
use crate::mesh::point_distance;

/// Minimum pairwise distance between seeds for them to be considered
/// distinct; seeds closer than this are treated as coincident.
const COINCIDENT_TOLERANCE: f64 = 1e-10;

/// An ordered, immutable set of `N ≥ 2` distinct seed points.
#[derive(Debug, Clone)]
pub struct Seeds(Vec<[f64; 2]>);

impl Seeds {
    pub fn new(points: Vec<[f64; 2]>) -> SdotResult<Self> {
        if points.len() < 2 {
            return Err(SdotError::InputInvalid(
                "at least two seeds are required".into(),
            ));
        }
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if point_distance(points[i], points[j]) < COINCIDENT_TOLERANCE {
                    return Err(SdotError::InputInvalid(format!(
                        "seeds {i} and {j} are coincident"
                    )));
                }
            }
        }
        Ok(Self(points))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[[f64; 2]] {
        &self.0
    }
}

/// Target mass per seed, `νᵢ > 0`, summing to the domain's measure within
/// `1e-9` relative.
#[derive(Debug, Clone)]
pub struct TargetMasses(Vec<f64>);

impl TargetMasses {
    pub fn new(nu: Vec<f64>, seeds: &Seeds, domain: &Domain) -> SdotResult<Self> {
        if nu.len() != seeds.len() {
            return Err(SdotError::InputInvalid(format!(
                "expected {} target masses, got {}",
                seeds.len(),
                nu.len()
            )));
        }
        if nu.iter().any(|&v| v <= 0.0) {
            return Err(SdotError::InputInvalid(
                "target masses must be strictly positive".into(),
            ));
        }
        let total: f64 = nu.iter().sum();
        let relative_err = (total - domain.measure()).abs() / domain.measure();
        if relative_err > 1e-9 {
            return Err(SdotError::InputInvalid(format!(
                "target masses sum to {total}, domain measure is {}",
                domain.measure()
            )));
        }
        Ok(Self(nu))
    }

    /// Equal masses, `νᵢ = |Ω| / N`: the common case where every cell
    /// should carry the same share of the domain's measure.
    pub fn equal(seeds: &Seeds, domain: &Domain) -> Self {
        let n = seeds.len();
        Self(vec![domain.measure() / n as f64; n])
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Domain {
        Domain::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_two_distinct_seeds_ok() {
        assert!(Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).is_ok());
    }

    #[test]
    fn test_single_seed_rejected() {
        assert!(matches!(
            Seeds::new(vec![[0.5, 0.5]]),
            Err(SdotError::InputInvalid(_))
        ));
    }

    #[test]
    fn test_coincident_seeds_rejected() {
        let err = Seeds::new(vec![[0.5, 0.5], [0.5, 0.5]]);
        assert!(matches!(err, Err(SdotError::InputInvalid(_))));
    }

    #[test]
    fn test_equal_masses_sum_to_measure() {
        let seeds = Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).unwrap();
        let domain = square();
        let nu = TargetMasses::equal(&seeds, &domain);
        let total: f64 = nu.as_slice().iter().sum();
        assert!((total - domain.measure()).abs() < 1e-12);
    }

    #[test]
    fn test_masses_not_summing_to_measure_rejected() {
        let seeds = Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).unwrap();
        let domain = square();
        let err = TargetMasses::new(vec![0.4995, 0.4995], &seeds, &domain);
        assert!(matches!(err, Err(SdotError::InputInvalid(_))));
    }
}
