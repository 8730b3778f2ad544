//! Correction-vector backend.
//!
//! At every frequency `w` (measured from the reference energy, so the absolute energy is
//! `w + E_ref`) the correction vector `x = (w + i eta - H)^-1 B|ref>` is obtained from
//! the Hermitian positive definite normal equations
//!
//! ```text
//! ((H - w)^2 + eta^2) y = -eta B|ref>,    x = (H - w) y / eta + i y
//! ```
//!
//! and bracketed as `o(eta) = <ref|A x>`. The same construction with `-eta` gives the
//! advanced correction vector and the correlator is `i (o(eta) - o(-eta)) / (2 pi)`.
//! Flipping the sign of `eta` only flips the sign of the right-hand side, so a single
//! conjugate gradient solve serves both.
//!
//! For Hamiltonians with a dense form, [`CorrectionMode::ExactInverse`] replaces the
//! iterative solve by an LU factorization of `w + E_ref +- i eta - H` at every
//! frequency. It is exact up to roundoff and serves as a reference for the iterative
//! mode.

use super::{SolveFailurePolicy, Spectrum, check_broadening, exact::DenseProblem};
use crate::{
    algorithms::linear::{ConjugateGradientOptions, conjugate_gradient, shifted_square},
    error::{SpectralError, SpectralErrorKind},
    matrix::{LinearOperator, Shifted},
    state::StateVector,
};
use faer::{Mat, c64, prelude::Solve};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the correction vectors are obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionMode {
    /// Conjugate gradient on the normal equations. Matrix-free.
    #[default]
    ConjugateGradient,
    /// Dense LU factorization of the shifted Hamiltonian. Needs explicit matrices.
    ExactInverse,
}

/// The correlator at a single frequency, with the statistics of its linear solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectionPoint {
    pub value: c64,
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
}

/// Evaluates the correlator at one frequency. `b_reference` is `B|ref>`.
#[allow(clippy::too_many_arguments)]
pub fn correction_vector_at<H, A>(
    hamiltonian: &H,
    a: &A,
    b_reference: &H::Vector,
    reference: &H::Vector,
    reference_energy: f64,
    frequency: f64,
    broadening: f64,
    options: &ConjugateGradientOptions,
) -> CorrectionPoint
where
    H: LinearOperator,
    A: LinearOperator<Vector = H::Vector>,
{
    let w = frequency + reference_energy;
    let normal = shifted_square(hamiltonian, w, broadening);
    let rhs = b_reference.scale(c64::new(-broadening, 0.0));
    let solution = conjugate_gradient(&normal, &rhs, options);

    // With -eta the solution is -y.
    let y = &solution.x;
    let centered = Shifted::new(hamiltonian, c64::new(-w, 0.0)).apply(y);
    let imaginary = y.scale(c64::new(0.0, 1.0));
    let retarded = centered
        .scale(c64::new(1.0 / broadening, 0.0))
        .add_scaled(c64::new(1.0, 0.0), &imaginary);
    let advanced = centered
        .scale(c64::new(1.0 / broadening, 0.0))
        .add_scaled(c64::new(-1.0, 0.0), &imaginary);

    let o_plus = a.expectation(reference, &retarded);
    let o_minus = a.expectation(reference, &advanced);
    CorrectionPoint {
        value: c64::new(0.0, 1.0) * (o_plus - o_minus) / (2.0 * PI),
        iterations: solution.iterations,
        residual: solution.residual,
        converged: solution.converged,
    }
}

/// Correlator by the correction-vector method, one linear solve per frequency.
#[allow(clippy::too_many_arguments)]
pub fn correction_vector_correlator<H, A, B>(
    hamiltonian: &H,
    a: &A,
    b: &B,
    reference: &H::Vector,
    reference_energy: f64,
    frequencies: &[f64],
    broadening: f64,
    options: &ConjugateGradientOptions,
    on_failure: SolveFailurePolicy,
) -> Result<Spectrum, SpectralError>
where
    H: LinearOperator,
    A: LinearOperator<Vector = H::Vector>,
    B: LinearOperator<Vector = H::Vector>,
{
    check_broadening(broadening)?;
    let b_reference = b.apply(reference);
    let mut values = Vec::with_capacity(frequencies.len());
    let mut unconverged = Vec::new();

    for (index, &frequency) in frequencies.iter().enumerate() {
        let point = correction_vector_at(
            hamiltonian,
            a,
            &b_reference,
            reference,
            reference_energy,
            frequency,
            broadening,
            options,
        );
        log::trace!(
            "Correction vector at {frequency}: {} iterations, residual {:e}",
            point.iterations,
            point.residual
        );
        if !point.converged {
            match on_failure {
                SolveFailurePolicy::Propagate => {
                    return Err(SpectralErrorKind::LinearSolveFailure {
                        frequency,
                        iterations: point.iterations,
                        residual: point.residual,
                    }
                    .into());
                }
                SolveFailurePolicy::KeepBestEffort => {
                    log::warn!(
                        "Linear solve at frequency {frequency} did not converge \
                         (residual {:e}), keeping the best effort",
                        point.residual
                    );
                    unconverged.push(index);
                }
            }
        }
        values.push(point.value);
    }

    Ok(Spectrum {
        frequencies: frequencies.to_vec(),
        values,
        unconverged,
    })
}

/// Correlator from correction vectors computed by dense factorization.
///
/// Every frequency costs two LU factorizations of the `n x n` shifted Hamiltonian, so
/// this mode is meant for small systems and for validating the iterative mode.
pub fn exact_inverse_correlator<H, A, B>(
    hamiltonian: &H,
    a: &A,
    b: &B,
    reference: &H::Vector,
    reference_energy: f64,
    frequencies: &[f64],
    broadening: f64,
) -> Result<Spectrum, SpectralError>
where
    H: LinearOperator,
    A: LinearOperator<Vector = H::Vector>,
    B: LinearOperator<Vector = H::Vector>,
{
    check_broadening(broadening)?;
    let problem = DenseProblem::new(hamiltonian, a, b, reference)?;
    let n = problem.dim();
    let h = &problem.hamiltonian;
    let b_reference = &problem.right * &problem.reference;
    let a_adjoint_reference = problem.left.adjoint() * problem.reference.as_ref();
    log::debug!("Exact correction vectors of dimension {n}");

    let bracket = |z: c64| {
        let shifted = Mat::from_fn(n, n, |i, j| {
            if i == j { z - h[(i, j)] } else { -h[(i, j)] }
        });
        let x = shifted.as_ref().partial_piv_lu().solve(&b_reference);
        (0..n).fold(c64::new(0.0, 0.0), |acc, i| {
            acc + a_adjoint_reference[(i, 0)].conj() * x[(i, 0)]
        })
    };

    let values = frequencies
        .iter()
        .map(|&frequency| {
            let w = frequency + reference_energy;
            let o_plus = bracket(c64::new(w, broadening));
            let o_minus = bracket(c64::new(w, -broadening));
            c64::new(0.0, 1.0) * (o_plus - o_minus) / (2.0 * PI)
        })
        .collect();

    Ok(Spectrum {
        frequencies: frequencies.to_vec(),
        values,
        unconverged: Vec::new(),
    })
}
