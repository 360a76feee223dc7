//! `sdot`: a CLI front-end for the semi-discrete optimal transport solver.
//!
//! Exit codes: 0 success, 1 convergence failure, 2 input error, 3 internal
//! error.

mod cli;
mod generate;

use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use sdot_algo::{Solver, SolverOptions};
use sdot_core::error::SdotError;
use sdot_core::persist::PersistedState;
use sdot_core::seeds::{Seeds, TargetMasses};
use sdot_geom::NaiveLaguerreBuilder;

#[repr(i32)]
enum ExitCode {
    Success = 0,
    ConvergenceFailure = 1,
    InputError = 2,
    InternalError = 3,
}

/// Unified error type for the CLI's command handlers: solver errors map to
/// specific exit codes, everything else (I/O, argument parsing) is an
/// internal error.
enum CliError {
    Solver(SdotError),
    Other(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Solver(SdotError::DidNotConverge { .. }) => ExitCode::ConvergenceFailure,
            CliError::Solver(SdotError::InputInvalid(_)) => ExitCode::InputError,
            CliError::Solver(_) => ExitCode::InternalError,
            CliError::Other(_) => ExitCode::InputError,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Solver(e) => write!(f, "{e}"),
            CliError::Other(e) => write!(f, "{e:?}"),
        }
    }
}

impl From<SdotError> for CliError {
    fn from(e: SdotError) -> Self {
        CliError::Solver(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Other(e)
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Commands::Solve { .. } => run_solve(&cli.command),
        Commands::Step { .. } => run_step(&cli.command),
        Commands::Inspect { state } => run_inspect(state),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit_code as i32);
}

fn run_solve(command: &Commands) -> Result<(), CliError> {
    let Commands::Solve {
        domain,
        seeds,
        shrink,
        rng_seed,
        solver,
        tol,
        max_outer,
        regularization,
        out,
        verbose,
    } = command
    else {
        unreachable!("run_solve called with a non-Solve command")
    };

    let domain = generate::parse_domain(domain)?;
    let mut points = generate::parse_seeds(seeds, &domain, *rng_seed)?;
    if *shrink {
        generate::shrink_toward_centroid(&mut points, &domain);
    }

    let seeds = Seeds::new(points).map_err(CliError::Solver)?;
    let nu = TargetMasses::equal(&seeds, &domain);

    info!(n = seeds.len(), "starting solve");

    let options = SolverOptions {
        solver: (*solver).into(),
        regularization: *regularization,
        max_outer: *max_outer,
        tol: *tol,
        verbose: *verbose,
        ..SolverOptions::default()
    };
    let mut solver = Solver::new(domain, seeds, nu, Box::new(NaiveLaguerreBuilder::new()), options)
        .map_err(CliError::Solver)?;

    let stop = AtomicBool::new(false);
    solver.solve(&stop).map_err(CliError::Solver)?;

    println!("converged: {} seeds", solver.seeds().len());
    let areas = solver.cell_areas().map_err(CliError::Solver)?;
    println!("cell areas: {areas:?}");

    if let Some(path) = out {
        persist(path, &solver).map_err(CliError::Other)?;
        info!(path = %path.display(), "persisted state");
    }

    Ok(())
}

fn run_step(command: &Commands) -> Result<(), CliError> {
    let Commands::Step {
        state,
        iterations,
        solver,
        regularization,
        out,
    } = command
    else {
        unreachable!("run_step called with a non-Step command")
    };

    let persisted = load(state).map_err(CliError::Other)?;
    let domain = generate::fan_triangulate_domain(persisted.domain_vertices)
        .map_err(CliError::Other)?;
    let seeds = Seeds::new(persisted.seeds).map_err(CliError::Solver)?;
    let nu = TargetMasses::equal(&seeds, &domain);

    let options = SolverOptions {
        solver: (*solver).into(),
        regularization: *regularization,
        ..SolverOptions::default()
    };
    let mut solver = Solver::new(domain, seeds, nu, Box::new(NaiveLaguerreBuilder::new()), options)
        .map_err(CliError::Solver)?;

    for i in 0..*iterations {
        let error = solver.one_iteration().map_err(CliError::Solver)?;
        info!(iteration = i, error, "step");
    }

    let out_path = out.as_ref().unwrap_or(state);
    persist(out_path, &solver).map_err(CliError::Other)?;
    println!("wrote {}", out_path.display());
    Ok(())
}

fn run_inspect(path: &std::path::Path) -> Result<(), CliError> {
    let persisted = load(path).map_err(CliError::Other)?;
    println!("weights (psi): {:?}", persisted.psi);
    println!("seed count: {}", persisted.seeds.len());
    println!("domain vertex count: {}", persisted.domain_vertices.len());
    Ok(())
}

fn persist(path: &std::path::Path, solver: &Solver) -> anyhow::Result<()> {
    let state = PersistedState {
        psi: solver.weights().to_vec(),
        seeds: solver.seeds().as_slice().to_vec(),
        domain_vertices: solver.domain().vertices.clone(),
    };
    let file = BufWriter::new(File::create(path)?);
    state.write(file)?;
    Ok(())
}

fn load(path: &std::path::Path) -> anyhow::Result<PersistedState> {
    let file = File::open(path)?;
    Ok(PersistedState::read(file)?)
}
