//! Domain and seed generators for the `solve` subcommand's `--domain` and
//! `--seeds` specs, plus the `--shrink` seed transform.

use anyhow::{bail, Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use sdot_core::domain::Domain;
use sdot_geom::clip::domain_boundary_loop;

/// Builds a `Domain` from a spec string: `quad` (the unit square) or
/// `ngon:N` (a regular N-gon fan-triangulated around its centroid,
/// inscribed in the unit square).
pub fn parse_domain(spec: &str) -> Result<Domain> {
    if spec == "quad" {
        return unit_square();
    }
    if let Some(n_str) = spec.strip_prefix("ngon:") {
        let n: usize = n_str
            .parse()
            .with_context(|| format!("invalid vertex count in domain spec '{spec}'"))?;
        if n < 3 {
            bail!("ngon domain needs at least 3 vertices, got {n}");
        }
        return Ok(regular_ngon(n));
    }
    bail!("unrecognized domain spec '{spec}' (expected 'quad' or 'ngon:N')")
}

fn unit_square() -> Result<Domain> {
    Domain::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .context("building unit square domain")
}

/// A regular N-gon inscribed in the unit square, fan-triangulated around
/// its centroid (which is appended as the last vertex).
fn regular_ngon(n: usize) -> Domain {
    let center = [0.5, 0.5];
    let radius = 0.5;
    let mut vertices: Vec<[f64; 2]> = (0..n)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            [center[0] + radius * theta.cos(), center[1] + radius * theta.sin()]
        })
        .collect();
    let centroid_idx = vertices.len() as u32;
    vertices.push(center);

    let triangles: Vec<[u32; 3]> = (0..n as u32)
        .map(|k| [centroid_idx, k, (k + 1) % n as u32])
        .collect();

    Domain::new(vertices, triangles).expect("regular n-gon always has positive measure")
}

/// Parses a `--seeds` spec (`random:N`) and rejection-samples `n` distinct
/// points inside `domain`'s convex boundary.
pub fn parse_seeds(spec: &str, domain: &Domain, rng_seed: u64) -> Result<Vec<[f64; 2]>> {
    let n_str = spec
        .strip_prefix("random:")
        .ok_or_else(|| anyhow::anyhow!("unrecognized seeds spec '{spec}' (expected 'random:N')"))?;
    let n: usize = n_str
        .parse()
        .with_context(|| format!("invalid seed count in seeds spec '{spec}'"))?;
    if n < 2 {
        bail!("need at least 2 seeds, got {n}");
    }

    let boundary = domain_boundary_loop(domain);
    let (lo, hi) = bounding_box(&boundary);
    let min_sep = 1e-3 / (n as f64).sqrt().max(1.0);

    let mut rng = SmallRng::seed_from_u64(rng_seed);
    let mut points: Vec<[f64; 2]> = Vec::with_capacity(n);
    let mut attempts = 0u64;
    while points.len() < n {
        attempts += 1;
        if attempts > 1_000_000 {
            bail!("could not place {n} distinct seeds inside the domain after 1,000,000 attempts");
        }
        let candidate = [
            rng.random_range(lo[0]..hi[0]),
            rng.random_range(lo[1]..hi[1]),
        ];
        if !point_in_convex_polygon(&boundary, candidate) {
            continue;
        }
        let too_close = points
            .iter()
            .any(|p| (p[0] - candidate[0]).hypot(p[1] - candidate[1]) < min_sep);
        if !too_close {
            points.push(candidate);
        }
    }
    Ok(points)
}

/// Blends every seed a quarter of the way from the domain's centroid,
/// generalizing the unit-square `x ← 0.125 + x/4` shrink to any domain.
pub fn shrink_toward_centroid(points: &mut [[f64; 2]], domain: &Domain) {
    let centroid = vertex_centroid(&domain.vertices);
    for p in points.iter_mut() {
        p[0] = centroid[0] + 0.25 * (p[0] - centroid[0]);
        p[1] = centroid[1] + 0.25 * (p[1] - centroid[1]);
    }
}

fn vertex_centroid(vertices: &[[f64; 2]]) -> [f64; 2] {
    let n = vertices.len() as f64;
    let sum = vertices.iter().fold([0.0, 0.0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
    [sum[0] / n, sum[1] / n]
}

fn bounding_box(poly: &[[f64; 2]]) -> ([f64; 2], [f64; 2]) {
    let mut lo = [f64::INFINITY, f64::INFINITY];
    let mut hi = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in poly {
        lo[0] = lo[0].min(p[0]);
        lo[1] = lo[1].min(p[1]);
        hi[0] = hi[0].max(p[0]);
        hi[1] = hi[1].max(p[1]);
    }
    (lo, hi)
}

/// Assumes `poly` is convex and CCW-oriented (true of `domain_boundary_loop`
/// on a domain produced by this module): `p` is inside iff it is on the
/// left of every edge.
fn point_in_convex_polygon(poly: &[[f64; 2]], p: [f64; 2]) -> bool {
    for k in 0..poly.len() {
        let a = poly[k];
        let b = poly[(k + 1) % poly.len()];
        let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
        if cross < 0.0 {
            return false;
        }
    }
    true
}

/// Fan-triangulates a convex vertex loop from vertex 0, for reconstructing
/// a `Domain` from a persisted state (which stores vertices only).
pub fn fan_triangulate_domain(vertices: Vec<[f64; 2]>) -> Result<Domain> {
    let n = vertices.len();
    if n < 3 {
        bail!("persisted domain has fewer than 3 vertices");
    }
    let triangles: Vec<[u32; 3]> = (1..n as u32 - 1).map(|k| [0, k, k + 1]).collect();
    Domain::new(vertices, triangles).context("reconstructing domain from persisted vertices")
}
