//! This module provides a high-level API for computing eigenpairs of matrix-free
//! operators with the restarted Arnoldi method, and dynamical correlators built on them.

use crate::{
    algorithms::{
        arnoldi::{ArnoldiOptions, ArnoldiOutput, Convergence, RestartedArnoldi},
        krylov::energy_error,
        power::{PowerMethodOptions, power_method},
        selection::{EigenPair, SelectionPolicy},
    },
    correlator::{self, CorrelatorOptions, Spectrum},
    error::SpectralError,
    matrix::{LinearOperator, Scaled, Shifted},
    state::VectorSpace,
};
use faer::c64;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Computes `count` eigenpairs of `hamiltonian` selected by `policy`.
///
/// # Arguments
/// * `hamiltonian`: The operator `H`. It does not need to be Hermitian, except for the
///   [`SelectionPolicy::ShiftInvert`] policy.
/// * `space`: Source of random vectors for warm starts and invariant-subspace recovery.
/// * `policy`: Which eigenpairs to target.
/// * `count`: How many eigenpairs to return.
/// * `options`: Tolerance, restart budget and Krylov sizes.
/// * `rng`: Random number generator; a seeded generator makes the result reproducible.
///
/// # Returns
/// The eigenpairs, ordered by the policy, with a convergence report. Running out of
/// restarts is not an error: the best result is returned with `converged == false`.
pub fn solve_extremal<H, S, R>(
    hamiltonian: &H,
    space: &S,
    policy: SelectionPolicy,
    count: usize,
    options: &ArnoldiOptions,
    rng: &mut R,
) -> Result<ArnoldiOutput<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    RestartedArnoldi::new(hamiltonian, space, policy, options.clone()).solve(count, rng)
}

/// The `count` lowest eigenpairs of a Hermitian operator.
pub fn lowest_energy<H, S, R>(
    hamiltonian: &H,
    space: &S,
    count: usize,
    options: &ArnoldiOptions,
    rng: &mut R,
) -> Result<ArnoldiOutput<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    solve_extremal(hamiltonian, space, SelectionPolicy::GroundState, count, options, rng)
}

/// The `count` eigenpairs with the most negative real part of a non-Hermitian operator.
///
/// The projected problem is solved with a general complex eigensolver, so the
/// returned energies may carry an imaginary part.
pub fn lowest_energy_non_hermitian<H, S, R>(
    hamiltonian: &H,
    space: &S,
    count: usize,
    options: &ArnoldiOptions,
    rng: &mut R,
) -> Result<ArnoldiOutput<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    solve_extremal(hamiltonian, space, SelectionPolicy::GroundState, count, options, rng)
}

/// Configuration of the rescaled-exponential search for the top of the spectrum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RescaledOptions {
    /// Time step of the linearized exponential `1 + dt (H - s) / s`.
    pub dt: f64,
    /// Relative safety margin on the power-method bound: `s = |e_max| (1 + margin)`.
    pub margin: f64,
    /// Bound estimate.
    pub power: PowerMethodOptions,
}

impl Default for RescaledOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            margin: 0.5,
            power: PowerMethodOptions {
                max_iterations: 10,
                ..Default::default()
            },
        }
    }
}

/// The `count` eigenpairs of a Hermitian operator with the largest energies.
///
/// The spectral radius is estimated with the power method and inflated by a safety
/// margin into `s`. The operator `1 + dt (H - s) / s` then maps the spectrum into
/// `[1 - 2 dt, 1]` with the largest energies at the largest magnitudes, and is solved
/// with the [`SelectionPolicy::LargestMagnitude`] policy on a subspace of at least
/// `2 count + 1` vectors. The rescaling shrinks energy uncertainties by `dt / s`, so
/// the inner solve runs with the tolerance shrunk by the same factor. The returned
/// energies and the convergence report are re-evaluated on `H` itself.
pub fn most_positive_energy<H, S, R>(
    hamiltonian: &H,
    space: &S,
    count: usize,
    options: &ArnoldiOptions,
    rescaling: &RescaledOptions,
    rng: &mut R,
) -> Result<ArnoldiOutput<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    let estimate = power_method(hamiltonian, space, &rescaling.power, &[], rng)?;
    let bound = estimate.magnitude();
    let scale = if bound > f64::EPSILON {
        bound * (1.0 + rescaling.margin)
    } else {
        1.0
    };
    log::debug!("Rescaling by {scale:.4} (power-method bound {bound:.4})");

    let exponential = Shifted::new(
        Scaled::new(hamiltonian, c64::new(rescaling.dt / scale, 0.0)),
        c64::new(1.0 - rescaling.dt, 0.0),
    );
    let rescaled = ArnoldiOptions {
        tolerance: options.tolerance * rescaling.dt / scale,
        min_krylov: options.min_krylov.or(Some(count + 1)),
        ..options.clone()
    };
    let output = solve_extremal(
        &exponential,
        space,
        SelectionPolicy::LargestMagnitude,
        count,
        &rescaled,
        rng,
    )?;

    let pairs: Vec<EigenPair<H::Vector>> = output
        .pairs
        .into_iter()
        .map(|p| EigenPair {
            energy: hamiltonian.expectation(&p.vector, &p.vector),
            ..p
        })
        .collect();
    let errors: Vec<f64> = pairs
        .iter()
        .map(|p| energy_error(hamiltonian, &p.vector))
        .collect();
    let max_error = errors.iter().copied().fold(0.0, f64::max);
    Ok(ArnoldiOutput {
        pairs,
        convergence: Convergence {
            converged: max_error < options.tolerance,
            iterations: output.convergence.iterations,
            max_error,
            errors,
        },
    })
}

/// The `count` eigenpairs of a Hermitian operator with the most negative energies,
/// computed as the most positive energies of `-H`.
pub fn most_negative_energy<H, S, R>(
    hamiltonian: &H,
    space: &S,
    count: usize,
    options: &ArnoldiOptions,
    rescaling: &RescaledOptions,
    rng: &mut R,
) -> Result<ArnoldiOutput<H::Vector>, SpectralError>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    let negated = Scaled::new(hamiltonian, c64::new(-1.0, 0.0));
    let mut output = most_positive_energy(&negated, space, count, options, rescaling, rng)?;
    for pair in &mut output.pairs {
        pair.energy = -pair.energy;
    }
    Ok(output)
}

/// Evaluates the dynamical correlator `<ref| A delta(w - (H - E_ref)) B |ref>` on
/// `frequencies` with the backend selected in `options`.
///
/// # Arguments
/// * `hamiltonian`: The Hermitian operator `H`.
/// * `a`, `b`: The operators on the left and on the right of the spectral delta.
/// * `reference`: The reference state, usually the ground state.
/// * `reference_energy`: `E_ref`, so that frequencies are excitation energies.
/// * `frequencies`: The grid. The output has one value per frequency.
/// * `options`: Backend, broadening and backend-specific settings.
/// * `space`, `rng`: Used by the polynomial backend to estimate the spectral bound.
#[allow(clippy::too_many_arguments)]
pub fn solve_dynamical_correlator<H, A, B, S, R>(
    hamiltonian: &H,
    a: &A,
    b: &B,
    reference: &H::Vector,
    reference_energy: f64,
    frequencies: &[f64],
    options: &CorrelatorOptions,
    space: &S,
    rng: &mut R,
) -> Result<Spectrum, SpectralError>
where
    H: LinearOperator,
    A: LinearOperator<Vector = H::Vector>,
    B: LinearOperator<Vector = H::Vector>,
    S: VectorSpace<H::Vector>,
    R: Rng + ?Sized,
{
    correlator::compute(
        hamiltonian,
        a,
        b,
        reference,
        reference_energy,
        frequencies,
        options,
        space,
        rng,
    )
}
