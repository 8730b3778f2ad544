//! This module defines the custom error types for the library.
//!
//! Every failure that the eigensolver or the correlator engine can report is collected
//! in a single enum, [`SpectralErrorKind`], wrapped by the public [`SpectralError`].
//!
//! Two families of errors exist. Structural errors (an unknown selection mode, a Krylov
//! basis that ends up empty, fewer candidates than requested eigenpairs) are fatal and
//! returned immediately. Numerical non-convergence is not an error for the solver: it is
//! reported through [`crate::algorithms::arnoldi::Convergence`] and only turned into
//! [`SpectralErrorKind::NonConvergence`] when the caller asks for it. Linear-solve
//! failures of the correction-vector backend are recoverable per frequency.
//!
//! Note that [`faer::linalg::evd::EvdError`] does not implement [`std::error::Error`],
//! so it is wrapped manually, as in the rest of the `faer` ecosystem.
use thiserror::Error;

/// Represents all possible errors that can occur while solving for eigenpairs or
/// evaluating a dynamical correlator.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct SpectralError(#[from] SpectralErrorKind);

impl SpectralError {
    /// Returns the kind of this error, so callers can match on it.
    pub fn kind(&self) -> &SpectralErrorKind {
        &self.0
    }

    /// Whether the caller can reasonably retry (larger budgets, another tolerance,
    /// or skipping the offending frequency).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.0,
            SpectralErrorKind::NonConvergence { .. } | SpectralErrorKind::LinearSolveFailure { .. }
        )
    }
}

/// The distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum SpectralErrorKind {
    /// The name does not correspond to any eigenvalue-selection policy.
    #[error("Unknown selection mode '{0}'.")]
    InvalidSelectionMode(String),

    /// The name does not correspond to any dynamical-correlator backend.
    #[error("Unknown correlator backend '{0}'.")]
    InvalidBackend(String),

    /// Krylov basis construction produced no vector at all.
    #[error("Krylov basis construction produced zero vectors.")]
    EmptyKrylovBasis,

    /// Fewer eigenpairs are available in the projected problem than were requested.
    #[error("Requested {requested} eigenpairs but only {available} candidates are available.")]
    InsufficientCandidates { requested: usize, available: usize },

    /// The restart budget was exhausted before every eigenpair met the tolerance.
    #[error(
        "Arnoldi did not converge after {iterations} iterations: \
         max energy error {max_error:e} exceeds tolerance {tolerance:e}."
    )]
    NonConvergence {
        iterations: usize,
        max_error: f64,
        tolerance: f64,
    },

    /// The iterative linear solve of the correction-vector method stalled.
    #[error(
        "Linear solve at frequency {frequency} failed after {iterations} iterations \
         (relative residual {residual:e})."
    )]
    LinearSolveFailure {
        frequency: f64,
        iterations: usize,
        residual: f64,
    },

    /// An operation needs the explicit matrix of an operator or vector that is matrix-free.
    #[error("The {0} has no explicit dense representation.")]
    NotExplicit(&'static str),

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),

    /// Wraps an error originating from [`faer`]'s eigendecomposition module.
    #[error("A numerical error occurred during an eigendecomposition: {0:?}")]
    EvdError(faer::linalg::evd::EvdError),
}

impl PartialEq for SpectralError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
