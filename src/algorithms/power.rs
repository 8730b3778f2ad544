//! Power-method warm start.
//!
//! The power method converges to the dominant eigenvector of `H + shift`. The solver
//! uses it only to obtain a reasonable seed for the Krylov basis, and the correlator
//! engine uses it to estimate the spectral radius of a shifted Hamiltonian. Several
//! independent random trials are run and the one with the largest estimated |energy|
//! is kept, which protects against a seed that happens to be nearly orthogonal to the
//! dominant eigenvector.

use crate::{
    error::{SpectralError, SpectralErrorKind},
    matrix::{LinearOperator, Shifted},
    state::{StateVector, VectorSpace},
};
use faer::c64;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of the power method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerMethodOptions {
    /// Real shift added to the operator before iterating.
    pub shift: f64,
    /// Maximum number of applications per trial.
    pub max_iterations: usize,
    /// Stop a trial once two successive energy estimates differ by less than this.
    pub tolerance: f64,
    /// Number of independent random trials.
    pub restarts: usize,
}

impl Default for PowerMethodOptions {
    fn default() -> Self {
        Self {
            shift: 0.0,
            max_iterations: 20,
            tolerance: 1e-2,
            restarts: 3,
        }
    }
}

/// The outcome of a power-method run.
#[derive(Clone, Debug)]
pub struct PowerEstimate<V> {
    /// ⟨v|H|v⟩ for the retained vector (the unshifted operator).
    pub energy: c64,
    /// Normalized estimate of the dominant eigenvector of `H + shift`.
    pub vector: V,
    /// Applications performed by the retained trial.
    pub iterations: usize,
}

impl<V> PowerEstimate<V> {
    /// |energy|, the quantity used to rank trials.
    pub fn magnitude(&self) -> f64 {
        self.energy.norm()
    }
}

/// Runs the power method on `hamiltonian + options.shift`.
///
/// Every trial starts from a random vector orthogonal to `orthogonal_to`. The result is
/// deterministic for a given state of `rng`.
pub fn power_method<H, S, R>(
    hamiltonian: &H,
    space: &S,
    options: &PowerMethodOptions,
    orthogonal_to: &[&H::Vector],
    rng: &mut R,
) -> Result<PowerEstimate<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    let shifted = Shifted::new(hamiltonian, c64::new(options.shift, 0.0));
    let mut best: Option<PowerEstimate<H::Vector>> = None;

    for trial in 0..options.restarts.max(1) {
        let mut v = space.random_vector(orthogonal_to, rng).ok_or_else(|| {
            SpectralErrorKind::InputError(
                "the vector space has no direction orthogonal to the excluded vectors".to_string(),
            )
        })?;
        let mut energy = hamiltonian.expectation(&v, &v);
        let mut iterations = 0;

        for _ in 0..options.max_iterations {
            v = shifted.apply(&v).normalize();
            iterations += 1;
            let updated = hamiltonian.expectation(&v, &v);
            let change = (updated - energy).norm();
            energy = updated;
            if change < options.tolerance {
                break;
            }
        }
        log::trace!("Power method trial {trial}: energy {energy} after {iterations} iterations");

        let estimate = PowerEstimate {
            energy,
            vector: v,
            iterations,
        };
        // Ties keep the earliest trial.
        if best
            .as_ref()
            .is_none_or(|b| estimate.magnitude() > b.magnitude())
        {
            best = Some(estimate);
        }
    }

    // At least one trial always runs.
    best.ok_or_else(|| SpectralErrorKind::EmptyKrylovBasis.into())
}
