//! Diagram adapter (C4): the boundary between an external, opaque
//! Laguerre-diagram producer and the rest of the solver.
//!
//! The producer's native adjacency convention (column k = neighbor across
//! the edge `(v_k, v_{k+1})`) differs from the canonical convention used by
//! the gradient/Hessian assemblers (column k = neighbor across the edge
//! opposite vertex k, i.e. edge `(v_{k+1}, v_{k+2})`). `adapt` performs the
//! one-time `[1,2,0]` column permutation so nothing downstream has to know
//! the producer's convention exists.

use tracing::debug;

use crate::domain::Domain;
use crate::error::{SdotError, SdotResult};
use crate::mesh::NO_INDEX;
use crate::seeds::Seeds;

/// As-delivered output of a [`LaguerreDiagramBuilder::build`] call, in the
/// producer's native adjacency convention.
#[derive(Debug, Clone)]
pub struct RawDiagram {
    /// Vertices of the triangulation of D(ψ) ⊂ Ω.
    pub xy: Vec<[f64; 2]>,
    /// Triangles, oriented CCW.
    pub triangles: Vec<[u32; 3]>,
    /// Neighbor across edge `(v_k, v_{k+1})`, native convention. `NO_INDEX`
    /// marks a boundary edge.
    pub adjacency: Vec<[u32; 3]>,
    /// Seed owner per triangle, in `[0, N)`.
    pub seed_of_triangle: Vec<u32>,
}

/// A normalized, read-only view of one Newton substep's Laguerre diagram:
/// canonical adjacency, coincident vertices merged.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub xy: Vec<[f64; 2]>,
    pub triangles: Vec<[u32; 3]>,
    /// Neighbor across the edge opposite vertex k. `None` marks a boundary.
    pub adjacency: Vec<[Option<u32>; 3]>,
    pub seed_of_triangle: Vec<u32>,
}

/// Tolerance for merging coincident vertices produced independently by
/// each cell's clipping pass, matching the producer's own merge pass.
const VERTEX_MERGE_TOLERANCE: f64 = 1e-10;

/// Strategy-pattern boundary for the external Laguerre-diagram producer.
/// Implementations may be a real geometric clipper (`sdot-geom`) or a
/// fixture replaying captured diagrams in tests.
pub trait LaguerreDiagramBuilder {
    fn build(&mut self, domain: &Domain, seeds: &Seeds, psi: &[f64]) -> SdotResult<RawDiagram>;
}

/// Normalizes a builder's raw output into the canonical [`Diagram`] view.
pub fn adapt(raw: RawDiagram, n_seeds: usize) -> SdotResult<Diagram> {
    for tri in &raw.triangles {
        let distinct = tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2];
        if !distinct {
            return Err(SdotError::InputInvalid(
                "diagram builder returned a degenerate (non-triangular) face".into(),
            ));
        }
    }
    for &seed in &raw.seed_of_triangle {
        if seed as usize >= n_seeds {
            return Err(SdotError::InputInvalid(format!(
                "triangle seed owner {seed} out of range [0,{n_seeds})"
            )));
        }
    }

    let (xy, vertex_map) = merge_coincident_vertices(&raw.xy);
    debug!(
        raw_vertices = raw.xy.len(),
        merged_vertices = xy.len(),
        triangles = raw.triangles.len(),
        "adapted raw diagram to canonical convention"
    );
    let triangles: Vec<[u32; 3]> = raw
        .triangles
        .iter()
        .map(|t| [vertex_map[t[0] as usize], vertex_map[t[1] as usize], vertex_map[t[2] as usize]])
        .collect();

    // Native convention: column k = neighbor across edge (v_k, v_{k+1}).
    // Canonical convention: column k = neighbor across edge opposite v_k,
    // i.e. edge (v_{k+1}, v_{k+2}), which is the native column (k+1)%3.
    let adjacency: Vec<[Option<u32>; 3]> = raw
        .adjacency
        .iter()
        .map(|native| {
            let canonical = [native[1], native[2], native[0]];
            canonical.map(|v| if v == NO_INDEX { None } else { Some(v) })
        })
        .collect();

    Ok(Diagram {
        xy,
        triangles,
        adjacency,
        seed_of_triangle: raw.seed_of_triangle,
    })
}

/// Merges vertices within [`VERTEX_MERGE_TOLERANCE`] of each other,
/// returning the deduplicated coordinate list and a map from old to new
/// vertex index. Quadratic in vertex count, acceptable at the scale of a
/// single triangulated cell boundary per seed.
fn merge_coincident_vertices(xy: &[[f64; 2]]) -> (Vec<[f64; 2]>, Vec<u32>) {
    let mut merged: Vec<[f64; 2]> = Vec::with_capacity(xy.len());
    let mut map = vec![0u32; xy.len()];
    for (i, &p) in xy.iter().enumerate() {
        let existing = merged.iter().position(|&q| {
            (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) < VERTEX_MERGE_TOLERANCE.powi(2)
        });
        match existing {
            Some(idx) => map[i] = idx as u32,
            None => {
                map[i] = merged.len() as u32;
                merged.push(p);
            }
        }
    }
    (merged, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_raw() -> RawDiagram {
        // Two triangles sharing edge (1,2): canonical adjacency should put
        // the neighbor at column 0 for both (edge opposite vertex 0).
        RawDiagram {
            xy: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
            // native: column k = neighbor across edge (v_k, v_{k+1})
            // triangle 0 edges: (0,1)->NO_INDEX, (1,2)->tri1, (2,0)->NO_INDEX
            adjacency: vec![[NO_INDEX, 1, NO_INDEX], [NO_INDEX, NO_INDEX, 0]],
            seed_of_triangle: vec![0, 1],
        }
    }

    #[test]
    fn test_permutation_moves_native_col1_to_canonical_col0() {
        let diagram = adapt(two_triangle_raw(), 2).unwrap();
        assert_eq!(diagram.adjacency[0][0], Some(1));
        assert_eq!(diagram.adjacency[1][1], Some(0));
    }

    #[test]
    fn test_no_index_becomes_none() {
        let diagram = adapt(two_triangle_raw(), 2).unwrap();
        assert_eq!(diagram.adjacency[0][1], None);
        assert_eq!(diagram.adjacency[0][2], None);
    }

    #[test]
    fn test_rejects_degenerate_triangle() {
        let mut raw = two_triangle_raw();
        raw.triangles[0] = [0, 0, 1];
        assert!(adapt(raw, 2).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_seed_owner() {
        let mut raw = two_triangle_raw();
        raw.seed_of_triangle[0] = 7;
        assert!(adapt(raw, 2).is_err());
    }

    #[test]
    fn test_merges_coincident_vertices() {
        let xy = vec![[0.0, 0.0], [1.0, 0.0], [1.0 + 1e-12, 0.0]];
        let (merged, map) = merge_coincident_vertices(&xy);
        assert_eq!(merged.len(), 2);
        assert_eq!(map[1], map[2]);
    }
}
