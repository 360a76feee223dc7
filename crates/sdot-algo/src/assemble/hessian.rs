//! Hessian assembler (C6): the P1 Laplacian of the Kantorovich dual on the
//! current Laguerre diagram.
//!
//! `H[i,j] = -|e_ij| / (2·‖x_i - x_j‖)` for `i ≠ j` with `|e_ij| > 0`;
//! `H[i,i] = -Σ_{j≠i} H[i,j]`: symmetric, non-positive off-diagonal,
//! row-sum zero before regularization.

use sprs::CsMat;

use sdot_core::diagram::Diagram;
use sdot_core::mesh::{edge_length, point_distance};

use crate::sparse::TripletBuilder;

/// Assembles `H(ψ)`.
///
/// `regularization`, when given, is `α·νᵢ` added to the diagonal before
/// finalizing — the direct-solver path only; the iterative path leaves
/// the matrix unregularized and carries the same values separately as
/// the PCG operator's extra diagonal term.
pub fn assemble_hessian(
    diagram: &Diagram,
    seeds: &[[f64; 2]],
    n_seeds: usize,
    regularization: Option<&[f64]>,
) -> CsMat<f64> {
    let mut builder = TripletBuilder::new(n_seeds);
    let mut diag = vec![0.0_f64; n_seeds];

    for (t, tri) in diagram.triangles.iter().enumerate() {
        let i = diagram.seed_of_triangle[t];
        for k in 0..3 {
            let j_raw = diagram.adjacency[t][k];
            let Some(j_raw) = j_raw else {
                continue; // boundary edge
            };
            let j = diagram.seed_of_triangle[j_raw as usize];
            if i == j {
                continue; // edge interior to a cell
            }
            let u = tri[(k + 1) % 3];
            let v = tri[(k + 2) % 3];
            let edge_len = edge_length(&diagram.xy, u, v);
            if edge_len <= 0.0 {
                continue;
            }
            let seed_dist = point_distance(seeds[i as usize], seeds[j as usize]);
            let c = -edge_len / (2.0 * seed_dist);
            builder.add_triple(i as usize, j as usize, c);
            diag[i as usize] -= c;
        }
    }

    if let Some(reg) = regularization {
        for (i, &r) in reg.iter().enumerate() {
            diag[i] += r;
        }
    }
    builder.add_to_diagonal(&diag);
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the edge (1,2): canonical adjacency neighbor
    /// sits at column 0 of each, seeds 0 and 1 at distance 1 apart, shared
    /// edge length 1.
    fn two_cell_diagram() -> (Diagram, Vec<[f64; 2]>) {
        let diagram = Diagram {
            xy: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            adjacency: vec![[Some(1), None, None], [Some(0), None, None]],
            seed_of_triangle: vec![0, 1],
        };
        (diagram, vec![[0.0, 2.0], [0.0, -1.0]])
    }

    #[test]
    fn test_off_diagonal_is_non_positive() {
        let (diagram, seeds) = two_cell_diagram();
        let h = assemble_hessian(&diagram, &seeds, 2, None);
        assert!(h.get(0, 1).copied().unwrap_or(0.0) <= 0.0);
    }

    #[test]
    fn test_row_sum_zero_before_regularization() {
        let (diagram, seeds) = two_cell_diagram();
        let h = assemble_hessian(&diagram, &seeds, 2, None);
        for i in 0..2 {
            let row_sum: f64 = (0..2).map(|j| h.get(i, j).copied().unwrap_or(0.0)).sum();
            assert!(row_sum.abs() < 1e-9, "row {i} sum = {row_sum}");
        }
    }

    #[test]
    fn test_symmetric() {
        let (diagram, seeds) = two_cell_diagram();
        let h = assemble_hessian(&diagram, &seeds, 2, None);
        assert!(
            (h.get(0, 1).copied().unwrap_or(0.0) - h.get(1, 0).copied().unwrap_or(0.0)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_regularization_added_only_to_diagonal() {
        let (diagram, seeds) = two_cell_diagram();
        let h_plain = assemble_hessian(&diagram, &seeds, 2, None);
        let h_reg = assemble_hessian(&diagram, &seeds, 2, Some(&[0.1, 0.1]));
        assert!((h_reg.get(0, 0).unwrap() - h_plain.get(0, 0).unwrap() - 0.1).abs() < 1e-12);
        assert!((h_reg.get(0, 1).unwrap() - h_plain.get(0, 1).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_no_shared_edge_means_no_off_diagonal() {
        let mut diagram = two_cell_diagram().0;
        diagram.adjacency = vec![[None, None, None], [None, None, None]];
        let (_, seeds) = two_cell_diagram();
        let h = assemble_hessian(&diagram, &seeds, 2, None);
        assert_eq!(h.get(0, 1).copied().unwrap_or(0.0), 0.0);
    }
}
