//! Reference `LaguerreDiagramBuilder`: per-seed half-plane clipping of a
//! convex domain, fan triangulation, and native-convention adjacency via
//! an edge hash over the combined triangle set.
//!
//! Non-convex domains are out of scope for this reference implementation
//! (see `DESIGN.md`); the core itself places no such restriction on a
//! `LaguerreDiagramBuilder`.

use std::collections::HashMap;

use sdot_core::diagram::{LaguerreDiagramBuilder, RawDiagram};
use sdot_core::domain::Domain;
use sdot_core::error::{SdotError, SdotResult};
use sdot_core::mesh::NO_INDEX;
use sdot_core::seeds::Seeds;

use crate::clip::{clip_half_plane, domain_boundary_loop, fan_triangulate};

/// Tolerance used to merge vertices produced independently by each cell's
/// clipping pass before computing adjacency. `sdot_core::diagram::adapt`
/// performs its own merge pass afterward; on already-merged input that
/// pass is a no-op.
const MERGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Default)]
pub struct NaiveLaguerreBuilder;

impl NaiveLaguerreBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl LaguerreDiagramBuilder for NaiveLaguerreBuilder {
    fn build(&mut self, domain: &Domain, seeds: &Seeds, psi: &[f64]) -> SdotResult<RawDiagram> {
        let boundary = domain_boundary_loop(domain);
        let seed_points = seeds.as_slice();
        let n = seed_points.len();

        let mut global_xy: Vec<[f64; 2]> = Vec::new();
        let mut triangles: Vec<[u32; 3]> = Vec::new();
        let mut seed_of_triangle: Vec<u32> = Vec::new();

        for i in 0..n {
            let mut cell = boundary.clone();
            for j in 0..n {
                if i == j {
                    continue;
                }
                cell = clip_half_plane(&cell, seed_points[i], seed_points[j], psi[i], psi[j]);
                if cell.len() < 3 {
                    break;
                }
            }
            if cell.len() < 3 {
                return Err(SdotError::EmptyCell { seed: i as u32 });
            }

            let global_indices: Vec<u32> = cell
                .iter()
                .map(|&p| merge_or_insert(&mut global_xy, p))
                .collect();

            for tri in fan_triangulate(cell.len()) {
                triangles.push([
                    global_indices[tri[0]],
                    global_indices[tri[1]],
                    global_indices[tri[2]],
                ]);
                seed_of_triangle.push(i as u32);
            }
        }

        let adjacency = native_adjacency(&triangles);

        Ok(RawDiagram {
            xy: global_xy,
            triangles,
            adjacency,
            seed_of_triangle,
        })
    }
}

fn merge_or_insert(global: &mut Vec<[f64; 2]>, p: [f64; 2]) -> u32 {
    if let Some(idx) = global.iter().position(|&q| {
        (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) < MERGE_TOLERANCE.powi(2)
    }) {
        idx as u32
    } else {
        global.push(p);
        (global.len() - 1) as u32
    }
}

/// Builds native-convention adjacency (`adjacency[t][k]` = neighbor across
/// edge `(v_k, v_{k+1})`) by hashing each triangle's three edges on their
/// unordered global vertex pair; an edge shared by exactly two triangles
/// links them, otherwise it is a boundary edge.
fn native_adjacency(triangles: &[[u32; 3]]) -> Vec<[u32; 3]> {
    let mut edge_map: HashMap<(u32, u32), Vec<(usize, usize)>> = HashMap::new();
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            edge_map.entry(key).or_default().push((t, k));
        }
    }

    let mut adjacency = vec![[NO_INDEX; 3]; triangles.len()];
    for occurrences in edge_map.values() {
        if occurrences.len() == 2 {
            let (t1, k1) = occurrences[0];
            let (t2, k2) = occurrences[1];
            adjacency[t1][k1] = t2 as u32;
            adjacency[t2][k2] = t1 as u32;
        }
    }
    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Domain {
        Domain::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_two_seed_split_produces_triangles_for_both_cells() {
        let domain = unit_square();
        let seeds = Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).unwrap();
        let mut builder = NaiveLaguerreBuilder::new();
        let raw = builder.build(&domain, &seeds, &[0.0, 0.0]).unwrap();
        assert!(raw.seed_of_triangle.contains(&0));
        assert!(raw.seed_of_triangle.contains(&1));
    }

    #[test]
    fn test_bisector_edge_is_mutually_adjacent() {
        let domain = unit_square();
        let seeds = Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).unwrap();
        let mut builder = NaiveLaguerreBuilder::new();
        let raw = builder.build(&domain, &seeds, &[0.0, 0.0]).unwrap();
        // At least one triangle from each cell touches the shared bisector.
        let cross_links = raw
            .adjacency
            .iter()
            .enumerate()
            .filter(|(t, adj)| {
                adj.iter().any(|&n| {
                    n != NO_INDEX && raw.seed_of_triangle[n as usize] != raw.seed_of_triangle[*t]
                })
            })
            .count();
        assert!(cross_links > 0);
    }

    #[test]
    fn test_extreme_weight_can_empty_a_cell() {
        let domain = unit_square();
        let seeds = Seeds::new(vec![[0.25, 0.5], [0.75, 0.5]]).unwrap();
        let mut builder = NaiveLaguerreBuilder::new();
        let err = builder.build(&domain, &seeds, &[-100.0, 100.0]);
        assert!(matches!(err, Err(SdotError::EmptyCell { .. })));
    }
}
