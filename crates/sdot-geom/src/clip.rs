//! Convex-polygon clipping against weighted bisector half-planes, and
//! boundary-loop extraction from a triangulated domain.
//!
//! Each seed's cell is clipped from the domain boundary, triangle by
//! triangle, then fan-triangulated and exposed as plain XY/T/Tadj/Tseed
//! arrays — implemented as plain computational geometry rather than
//! calling out to an external mesh-processing library.

use std::collections::HashMap;

use sdot_core::domain::Domain;

/// Extracts the ordered boundary loop of a triangulated domain.
///
/// Assumes a single convex boundary component. An edge is a boundary edge
/// iff it belongs to exactly one triangle; boundary edges form a single
/// cycle, walked here into vertex order.
pub fn domain_boundary_loop(domain: &Domain) -> Vec<[f64; 2]> {
    let mut edge_count: HashMap<(u32, u32), u32> = HashMap::new();
    for tri in &domain.triangles {
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(key).or_insert(0) += 1;
        }
    }

    let mut adjacency: HashMap<u32, Vec<u32>> = HashMap::new();
    for tri in &domain.triangles {
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            if edge_count[&key] == 1 {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
    }

    let start = *adjacency
        .keys()
        .next()
        .expect("triangulated domain must have a non-empty boundary");
    let mut loop_vertices = vec![start];
    let mut prev = start;
    let mut current = adjacency[&start][0];
    loop {
        if current == start {
            break;
        }
        loop_vertices.push(current);
        let neighbors = &adjacency[&current];
        let next = if neighbors[0] == prev { neighbors[1] } else { neighbors[0] };
        prev = current;
        current = next;
        if loop_vertices.len() > domain.vertices.len() {
            break; // malformed/non-convex boundary, avoid an infinite loop
        }
    }

    loop_vertices.into_iter().map(|v| domain.vertices[v as usize]).collect()
}

/// Clips a convex polygon against the half-plane
/// `x·(xj-xi) ≤ (|xj|²-|xi|²+ψi-ψj)/2`, i.e. the set of points at least as
/// close (in weighted distance) to seed `i` as to seed `j`.
///
/// Sutherland-Hodgman against a single half-plane: the polygon stays
/// convex as long as the input is convex.
pub fn clip_half_plane(
    poly: &[[f64; 2]],
    xi: [f64; 2],
    xj: [f64; 2],
    psi_i: f64,
    psi_j: f64,
) -> Vec<[f64; 2]> {
    if poly.is_empty() {
        return Vec::new();
    }
    let normal = [xj[0] - xi[0], xj[1] - xi[1]];
    let rhs = 0.5
        * (xj[0] * xj[0] + xj[1] * xj[1] - xi[0] * xi[0] - xi[1] * xi[1] + psi_i - psi_j);
    let inside = |p: &[f64; 2]| normal[0] * p[0] + normal[1] * p[1] <= rhs;

    let mut out = Vec::with_capacity(poly.len() + 1);
    for k in 0..poly.len() {
        let curr = poly[k];
        let next = poly[(k + 1) % poly.len()];
        let curr_in = inside(&curr);
        let next_in = inside(&next);
        if curr_in {
            out.push(curr);
        }
        if curr_in != next_in {
            let d_curr = normal[0] * curr[0] + normal[1] * curr[1] - rhs;
            let d_next = normal[0] * next[0] + normal[1] * next[1] - rhs;
            let t = d_curr / (d_curr - d_next);
            out.push([
                curr[0] + t * (next[0] - curr[0]),
                curr[1] + t * (next[1] - curr[1]),
            ]);
        }
    }
    out
}

/// Fan-triangulates a convex polygon around its first vertex, returning
/// local vertex-index triples.
pub fn fan_triangulate(n_vertices: usize) -> Vec<[usize; 3]> {
    (1..n_vertices.saturating_sub(1))
        .map(|k| [0, k, k + 1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_loop_of_unit_square() {
        let domain = Domain::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let loop_vertices = domain_boundary_loop(&domain);
        assert_eq!(loop_vertices.len(), 4);
    }

    #[test]
    fn test_clip_bisects_square_down_the_middle() {
        let square = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let left_half = clip_half_plane(&square, [0.25, 0.5], [0.75, 0.5], 0.0, 0.0);
        for p in &left_half {
            assert!(p[0] <= 0.5 + 1e-9);
        }
        let area = polygon_area(&left_half);
        assert!((area - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_clip_against_empty_polygon_is_empty() {
        assert!(clip_half_plane(&[], [0.0, 0.0], [1.0, 0.0], 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_fan_triangulate_quad() {
        let tris = fan_triangulate(4);
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    fn polygon_area(poly: &[[f64; 2]]) -> f64 {
        let mut acc = 0.0;
        for k in 0..poly.len() {
            let p = poly[k];
            let q = poly[(k + 1) % poly.len()];
            acc += p[0] * q[1] - q[0] * p[1];
        }
        0.5 * acc.abs()
    }
}
