//! Building blocks of the restarted Arnoldi eigensolver.
//!
//! ** NOTE: We recommend using the high-level functions in [`crate::solvers`] instead.
//! These modules are intended for use cases where fine-grained control over the
//! individual stages is required (custom restart loops, benchmarking, diagnostics).
//!
//! The stages, leaves first:
//!
//! - [`orthogonalize`]: Gram–Schmidt against a basis, single vector and batch.
//! - [`power`]: power-method warm start with random restarts.
//! - [`krylov`]: Krylov basis growth, projected matrix and its eigendecomposition.
//! - [`selection`]: eigenvalue-selection policies and eigenpair extraction.
//! - [`linear`]: matrix-free conjugate gradient and the shifted-inverse operator.
//! - [`arnoldi`]: the restart loop that ties everything together.

pub mod arnoldi;
pub mod krylov;
pub mod linear;
pub mod orthogonalize;
pub mod power;
pub mod selection;

/// Relative residual below which an orthogonalized vector is treated as zero.
pub(crate) const RESIDUAL_TOLERANCE: f64 = 1e-10;
