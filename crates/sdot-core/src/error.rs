//! Error taxonomy for the SDOT solver.
//!
//! [`SdotError`] is the single error type crossing crate boundaries in this
//! workspace. Recoverable conditions (`EmptyCell`, `LinearSolveFailed`) are
//! normally absorbed inside the Newton line search; they only escape as a
//! top-level error when every line-search substep in the cap is rejected.

use thiserror::Error;

/// Unified error type for all SDOT operations.
#[derive(Error, Debug)]
pub enum SdotError {
    /// Malformed or inconsistent input: duplicate seeds, seeds outside Ω,
    /// ν not summing to |Ω|, non-positive νᵢ.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// The diagram builder reports an empty cell for the current ψ.
    #[error("empty Laguerre cell for seed {seed}")]
    EmptyCell { seed: u32 },

    /// Factorization was indefinite, or CG hit its iteration cap.
    #[error("linear solve failed: {0}")]
    LinearSolveFailed(String),

    /// Outer iteration cap reached before the tolerance was met.
    #[error("did not converge after {iterations} iterations (error {error})")]
    DidNotConverge {
        iterations: u32,
        error: f64,
        weights: Vec<f64>,
    },

    /// The caller's stop flag was observed between outer iterations.
    #[error("interrupted")]
    Interrupted { weights: Vec<f64> },

    /// Persisted-state I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the workspace.
pub type SdotResult<T> = Result<T, SdotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdotError::LinearSolveFailed("indefinite".into());
        assert!(err.to_string().contains("linear solve failed"));
        assert!(err.to_string().contains("indefinite"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let sdot_err: SdotError = io_err.into();
        assert!(matches!(sdot_err, SdotError::Io(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> SdotResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }

    #[test]
    fn test_did_not_converge_carries_weights() {
        let err = SdotError::DidNotConverge {
            iterations: 200,
            error: 0.05,
            weights: vec![1.0, 2.0],
        };
        match err {
            SdotError::DidNotConverge { weights, .. } => assert_eq!(weights, vec![1.0, 2.0]),
            _ => panic!("wrong variant"),
        }
    }
}
