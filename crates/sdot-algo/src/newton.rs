//! Newton-KMT driver (C7): the damped-Newton outer loop with Kitagawa–
//! Mérigot–Thibert step-length backtracking.
//!
//! Two subtle sequencing points are worth calling out (see `DESIGN.md`
//! for the full reasoning):
//!
//! 1. Every trial weight, including the initial full Newton step, is
//!    computed explicitly as `psi_trial = psi_prev + alpha * p` from a
//!    `psi_prev` snapshot taken once per outer iteration — never via an
//!    in-place `psi += p` / `psi -= alpha*p` sequence.
//! 2. `g_norm` is computed once, before the line search, from the
//!    pre-step residual `b`, and held fixed for every substep's KMT-2
//!    check — this is the intended Armijo condition, not a bug to "fix"
//!    into a per-substep recomputation.

use sprs::CsMat;
use tracing::debug;

use sdot_core::diagram::{adapt, Diagram, LaguerreDiagramBuilder};
use sdot_core::domain::Domain;
use sdot_core::error::{SdotError, SdotResult};
use sdot_core::seeds::Seeds;

use crate::assemble::{assemble_hessian, cell_areas, count_empty_cells};
use crate::linsolve::{DirectSolver, IterativeSolver, LinearSolver, SolverKind};

/// Options governing one outer Newton iteration. Owned by the `Solver`
/// facade (C8) and passed by reference into every call here.
#[derive(Debug, Clone)]
pub struct NewtonOptions {
    pub solver_kind: SolverKind,
    pub regularization: f64,
    pub max_line_search: u32,
    pub cg_max_iterations: Option<usize>,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            solver_kind: SolverKind::Direct,
            regularization: 1e-6,
            max_line_search: 10,
            cg_max_iterations: None,
        }
    }
}

/// `θ = 0.5 * min(min(a(0)), min(ν))`, the KMT-1 mass floor, computed once
/// at solver construction from the ψ=0 diagram. Generalizes the scalar
/// `ν_i` case to a non-uniform target-mass vector by taking `min(ν)`.
pub fn initial_area_threshold(a0: &[f64], nu: &[f64]) -> f64 {
    let min_a0 = a0.iter().cloned().fold(f64::INFINITY, f64::min);
    let min_nu = nu.iter().cloned().fold(f64::INFINITY, f64::min);
    0.5 * min_a0.min(min_nu)
}

fn build_diagram(
    domain: &Domain,
    seeds: &Seeds,
    psi: &[f64],
    builder: &mut dyn LaguerreDiagramBuilder,
) -> SdotResult<Diagram> {
    let raw = builder.build(domain, seeds, psi)?;
    adapt(raw, seeds.len())
}

fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn norm_inf(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

fn solve_newton_step(
    h: &CsMat<f64>,
    b: &[f64],
    reg_vec: &[f64],
    options: &NewtonOptions,
) -> SdotResult<Vec<f64>> {
    match options.solver_kind {
        SolverKind::Direct => DirectSolver::new().solve(h, b),
        SolverKind::Iterative => {
            IterativeSolver::new(reg_vec.to_vec(), options.cg_max_iterations).solve(h, b)
        }
    }
}

/// Runs one outer Newton-KMT iteration against `psi` in place, returning
/// the L∞ gradient error of the (possibly rejected) step.
pub fn one_iteration(
    domain: &Domain,
    seeds: &Seeds,
    nu: &[f64],
    theta: f64,
    options: &NewtonOptions,
    builder: &mut dyn LaguerreDiagramBuilder,
    psi: &mut [f64],
) -> SdotResult<f64> {
    let n = seeds.len();
    let reg_vec: Vec<f64> = nu.iter().map(|&v| options.regularization * v).collect();

    let diagram = build_diagram(domain, seeds, psi, builder)?;
    let a = cell_areas(&diagram, n);
    let mut b: Vec<f64> = nu.iter().zip(a.iter()).map(|(&ni, &ai)| ni - ai).collect();
    if options.regularization != 0.0 {
        for i in 0..n {
            b[i] -= reg_vec[i] * psi[i];
        }
    }

    // g_norm fixed for the whole line search (KMT-2 Armijo condition is
    // measured against this pre-step value; see module doc).
    let g_norm = norm2(&b);

    let h = match options.solver_kind {
        SolverKind::Direct => assemble_hessian(&diagram, seeds.as_slice(), n, Some(&reg_vec)),
        SolverKind::Iterative => assemble_hessian(&diagram, seeds.as_slice(), n, None),
    };
    let p = solve_newton_step(&h, &b, &reg_vec, options)?;

    let psi_prev: Vec<f64> = psi.to_vec();
    let mut alpha = 1.0_f64;
    let mut last_g_inf = norm_inf(&b);
    let mut last_empty_seed: Option<u32> = None;

    for substep in 0..options.max_line_search {
        for i in 0..n {
            psi[i] = psi_prev[i] + alpha * p[i];
        }

        let trial_diagram = match build_diagram(domain, seeds, psi, builder) {
            Ok(d) => d,
            Err(SdotError::EmptyCell { seed }) => {
                debug!(substep, alpha, seed, "KMT-1 rejection: builder reports empty cell");
                last_empty_seed = Some(seed);
                alpha /= 2.0;
                continue;
            }
            Err(e) => {
                psi.copy_from_slice(&psi_prev);
                return Err(e);
            }
        };
        let a_trial = cell_areas(&trial_diagram, n);
        if count_empty_cells(&a_trial) > 0 {
            let empty_seed = a_trial
                .iter()
                .position(|&area| area <= 0.0)
                .expect("count_empty_cells > 0 implies a zero-area entry exists") as u32;
            debug!(substep, alpha, empty_seed, "KMT-1 rejection: empty cell");
            last_empty_seed = Some(empty_seed);
            alpha /= 2.0;
            continue;
        }
        last_empty_seed = None;

        let smallest = a_trial.iter().cloned().fold(f64::INFINITY, f64::min);
        let g_trial: Vec<f64> = nu
            .iter()
            .zip(a_trial.iter())
            .map(|(&ni, &ai)| ai - ni)
            .collect();
        let g_norm_trial = norm2(&g_trial);

        let kmt1 = smallest > theta;
        let kmt2 = g_norm_trial <= (1.0 - 0.5 * alpha) * g_norm;
        debug!(substep, alpha, kmt1, kmt2, smallest, g_norm_trial, "KMT substep");

        last_g_inf = norm_inf(&g_trial);
        if kmt1 && kmt2 {
            return Ok(last_g_inf);
        }
        alpha /= 2.0;
    }

    // Line search exhausted without satisfying both KMT criteria. An
    // empty cell that persists through every substep is surfaced as a
    // fatal EmptyCell; a KMT-2-only rejection is not an error here — the
    // outer iteration cap in `solve` is what turns repeated
    // non-convergence into `DidNotConverge`.
    if let Some(seed) = last_empty_seed {
        psi.copy_from_slice(&psi_prev);
        return Err(SdotError::EmptyCell { seed });
    }
    Ok(last_g_inf)
}
