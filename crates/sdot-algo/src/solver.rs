//! Solver facade (C8): `Solver::new/solve/one_iteration/cell_areas`.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, instrument};

use sdot_core::diagram::LaguerreDiagramBuilder;
use sdot_core::domain::Domain;
use sdot_core::error::{SdotError, SdotResult};
use sdot_core::seeds::{Seeds, TargetMasses};

use crate::assemble::cell_areas as assemble_cell_areas;
use crate::linsolve::SolverKind;
use crate::newton::{initial_area_threshold, one_iteration, NewtonOptions};

/// Configuration for a `Solver`: a plain struct with a `Default` impl so
/// callers only override the fields they care about.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub solver: SolverKind,
    pub regularization: f64,
    pub max_outer: u32,
    pub max_line_search: u32,
    pub tol: f64,
    pub cg_max_iterations: Option<usize>,
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            solver: SolverKind::Direct,
            regularization: 1e-6,
            max_outer: 200,
            max_line_search: 10,
            tol: 0.01,
            cg_max_iterations: None,
            verbose: false,
        }
    }
}

/// End-to-end SDOT solver. Owns Ω, seeds, ν, ψ, the diagram builder, and
/// every per-iteration scratch buffer; two instances are fully
/// independent and `Send` (asserted below), so separate solves may run on
/// separate threads.
pub struct Solver {
    domain: Domain,
    seeds: Seeds,
    nu: TargetMasses,
    psi: Vec<f64>,
    builder: Box<dyn LaguerreDiagramBuilder + Send>,
    options: SolverOptions,
    theta: f64,
}

impl Solver {
    pub fn new(
        domain: Domain,
        seeds: Seeds,
        nu: TargetMasses,
        mut builder: Box<dyn LaguerreDiagramBuilder + Send>,
        options: SolverOptions,
    ) -> SdotResult<Self> {
        let n = seeds.len();
        let psi = vec![0.0_f64; n];
        let diagram = {
            let raw = builder.build(&domain, &seeds, &psi)?;
            sdot_core::diagram::adapt(raw, n)?
        };
        let a0 = assemble_cell_areas(&diagram, n);
        let theta = initial_area_threshold(&a0, nu.as_slice());

        Ok(Self {
            domain,
            seeds,
            nu,
            psi,
            builder,
            options,
            theta,
        })
    }

    fn newton_options(&self) -> NewtonOptions {
        NewtonOptions {
            solver_kind: self.options.solver,
            regularization: self.options.regularization,
            max_line_search: self.options.max_line_search,
            cg_max_iterations: self.options.cg_max_iterations,
        }
    }

    /// Runs a single Newton-KMT outer iteration, returning the L∞
    /// gradient error of the resulting step.
    #[instrument(skip(self), fields(n = self.seeds.len()))]
    pub fn one_iteration(&mut self) -> SdotResult<f64> {
        let newton_options = self.newton_options();
        one_iteration(
            &self.domain,
            &self.seeds,
            self.nu.as_slice(),
            self.theta,
            &newton_options,
            self.builder.as_mut(),
            &mut self.psi,
        )
    }

    /// Runs `one_iteration` until the reported error is below
    /// `tol * min(ν)`, or the outer iteration cap is reached, or `stop` is
    /// observed between iterations.
    pub fn solve(&mut self, stop: &AtomicBool) -> SdotResult<&[f64]> {
        let min_nu = self.nu.as_slice().iter().cloned().fold(f64::INFINITY, f64::min);
        let threshold = self.options.tol * min_nu;

        for iteration in 0..self.options.max_outer {
            if stop.load(Ordering::Relaxed) {
                return Err(SdotError::Interrupted {
                    weights: self.psi.clone(),
                });
            }
            let error = self.one_iteration()?;
            if self.options.verbose {
                info!(iteration, error, "Newton step");
            }
            if error <= threshold {
                return Ok(&self.psi);
            }
        }

        Err(SdotError::DidNotConverge {
            iterations: self.options.max_outer,
            error: threshold,
            weights: self.psi.clone(),
        })
    }

    /// Cell areas at the current ψ, rebuilding the diagram if necessary.
    pub fn cell_areas(&mut self) -> SdotResult<Vec<f64>> {
        let raw = self.builder.build(&self.domain, &self.seeds, &self.psi)?;
        let diagram = sdot_core::diagram::adapt(raw, self.seeds.len())?;
        Ok(assemble_cell_areas(&diagram, self.seeds.len()))
    }

    pub fn weights(&self) -> &[f64] {
        &self.psi
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn seeds(&self) -> &Seeds {
        &self.seeds
    }
}

fn _assert_send<T: Send>() {}

#[allow(dead_code)]
fn _solver_is_send() {
    _assert_send::<Solver>();
}
