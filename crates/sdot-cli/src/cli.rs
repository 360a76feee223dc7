//! Argument parsing for the `sdot` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a solve from scratch and report (or persist) the converged weights
    Solve {
        /// Domain spec: `quad` (unit square) or `ngon:N` (regular N-gon inscribed
        /// in the unit square)
        #[arg(long, default_value = "quad")]
        domain: String,
        /// Seed spec: `random:N`
        #[arg(long)]
        seeds: String,
        /// Shrink generated seeds toward the domain centroid (quarter scale)
        #[arg(long)]
        shrink: bool,
        /// Random seed for seed generation
        #[arg(long, default_value_t = 0)]
        rng_seed: u64,
        /// Linear solver
        #[arg(long, value_enum, default_value_t = SolverArg::Direct)]
        solver: SolverArg,
        /// Convergence tolerance, as a fraction of min(ν)
        #[arg(long, default_value_t = 0.01)]
        tol: f64,
        /// Hard cap on outer Newton iterations
        #[arg(long, default_value_t = 200)]
        max_outer: u32,
        /// Regularization coefficient for the direct solver
        #[arg(long, default_value_t = 1e-6)]
        regularization: f64,
        /// Persist the resulting {ψ, seeds, Ω} to this path
        #[arg(long)]
        out: Option<PathBuf>,
        /// Log per-iteration error
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run a fixed number of additional Newton iterations from a persisted state
    Step {
        /// Persisted state to resume from
        #[arg(long)]
        state: PathBuf,
        /// Number of outer iterations to run
        #[arg(long, default_value_t = 1)]
        iterations: u32,
        /// Linear solver
        #[arg(long, value_enum, default_value_t = SolverArg::Direct)]
        solver: SolverArg,
        /// Regularization coefficient for the direct solver
        #[arg(long, default_value_t = 1e-6)]
        regularization: f64,
        /// Persist the updated state back to this path (defaults to `--state`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report cell areas and weights for a persisted state
    Inspect {
        /// Persisted state to load
        state: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SolverArg {
    Direct,
    Iterative,
}

impl From<SolverArg> for sdot_algo::SolverKind {
    fn from(value: SolverArg) -> Self {
        match value {
            SolverArg::Direct => sdot_algo::SolverKind::Direct,
            SolverArg::Iterative => sdot_algo::SolverKind::Iterative,
        }
    }
}
