//! Dynamical correlators in the frequency domain.
//!
//! Every backend evaluates
//!
//! ```text
//! C(w) = <ref| A delta_eta(w - (H - E_ref)) B |ref>
//! ```
//!
//! where `delta_eta` is a unit-area Lorentzian of half-width `eta` (the broadening) and
//! `E_ref` is the energy of the reference state (usually the ground state). For
//! `B = A^dagger` the correlator is the real, non-negative spectral function of `A`.
//!
//! Three interchangeable backends are provided:
//!
//! - [`CorrelatorBackend::Polynomial`]: Chebyshev expansion (kernel polynomial
//!   method). Only operator applications are needed; its cost is independent of the
//!   number of frequencies.
//! - [`CorrelatorBackend::ExactDiagonalization`]: Lehmann sum over every eigenstate of
//!   the explicit Hamiltonian. Exact, but limited to small dimensions.
//! - [`CorrelatorBackend::CorrectionVector`]: one pair of shifted linear solves per
//!   frequency, by conjugate gradient or, for explicit matrices, by dense
//!   factorization (see [`CorrectionMode`]).
//!
//! The backends agree on peak positions and areas up to the line shape of the chosen
//! broadening, which is what the integration tests check.

pub mod correction;
pub mod exact;
pub mod kpm;

pub use correction::{CorrectionMode, correction_vector_correlator, exact_inverse_correlator};
pub use exact::exact_correlator;
pub use kpm::{Kernel, PolynomialOptions, polynomial_correlator};

use crate::{
    algorithms::linear::ConjugateGradientOptions,
    error::{SpectralError, SpectralErrorKind},
    matrix::LinearOperator,
    state::VectorSpace,
};
use faer::c64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Numerical method used to evaluate the correlator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelatorBackend {
    /// Kernel polynomial method.
    #[default]
    Polynomial,
    ExactDiagonalization,
    CorrectionVector,
}

impl FromStr for CorrelatorBackend {
    type Err = SpectralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KPM" | "kpm" | "polynomial" => Ok(Self::Polynomial),
            "ED" | "ed" | "exact" => Ok(Self::ExactDiagonalization),
            "CV" | "cv" | "INV" | "inv" | "correction_vector" => Ok(Self::CorrectionVector),
            other => Err(SpectralErrorKind::InvalidBackend(other.to_string()).into()),
        }
    }
}

impl fmt::Display for CorrelatorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Polynomial => "KPM",
            Self::ExactDiagonalization => "ED",
            Self::CorrectionVector => "CV",
        };
        f.write_str(name)
    }
}

/// What the correction-vector backend does when a linear solve misses its tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveFailurePolicy {
    /// Return [`SpectralErrorKind::LinearSolveFailure`] for the first failing frequency.
    #[default]
    Propagate,
    /// Keep the best-effort value and record the frequency index in
    /// [`Spectrum::unconverged`].
    KeepBestEffort,
}

/// Configuration of a correlator evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelatorOptions {
    pub backend: CorrelatorBackend,
    /// Lorentzian half-width.
    pub broadening: f64,
    pub polynomial: PolynomialOptions,
    pub correction_mode: CorrectionMode,
    /// Linear solver of the correction-vector backend.
    pub correction: ConjugateGradientOptions,
    pub on_solve_failure: SolveFailurePolicy,
}

impl Default for CorrelatorOptions {
    fn default() -> Self {
        Self {
            backend: CorrelatorBackend::default(),
            broadening: 0.05,
            polynomial: PolynomialOptions::default(),
            correction_mode: CorrectionMode::default(),
            correction: ConjugateGradientOptions::default(),
            on_solve_failure: SolveFailurePolicy::default(),
        }
    }
}

/// An ordered set of frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyGrid {
    pub frequencies: Vec<f64>,
}

impl FrequencyGrid {
    /// `points` evenly spaced frequencies from `start` to `stop`, both included.
    pub fn linspace(start: f64, stop: f64, points: usize) -> Self {
        let frequencies = match points {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (points - 1) as f64;
                (0..points).map(|i| start + step * i as f64).collect()
            }
        };
        Self { frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }
}

/// A correlator sampled on a frequency grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    /// One value per frequency.
    pub values: Vec<c64>,
    /// Indices of frequencies whose linear solve did not converge.
    pub unconverged: Vec<usize>,
}

impl Spectrum {
    /// Trapezoidal integral of the real part over the grid.
    pub fn integrate(&self) -> f64 {
        self.frequencies
            .windows(2)
            .zip(self.values.windows(2))
            .map(|(w, v)| 0.5 * (w[1] - w[0]) * (v[0].re + v[1].re))
            .sum()
    }

    /// Frequency of the largest real value.
    pub fn peak(&self) -> Option<f64> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.re.is_nan())
            .max_by(|(_, a), (_, b)| a.re.total_cmp(&b.re))
            .map(|(i, _)| self.frequencies[i])
    }
}

pub(crate) fn check_broadening(broadening: f64) -> Result<(), SpectralError> {
    if broadening.is_finite() && broadening > 0.0 {
        Ok(())
    } else {
        Err(SpectralErrorKind::InputError(format!(
            "broadening must be positive and finite, got {broadening}"
        ))
        .into())
    }
}

/// Evaluates the correlator with the backend selected in `options`.
#[allow(clippy::too_many_arguments)]
pub fn compute<H, A, B, S, R>(
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
    check_broadening(options.broadening)?;
    log::debug!(
        "Correlator with the {} backend on {} frequencies (broadening {})",
        options.backend,
        frequencies.len(),
        options.broadening
    );
    match options.backend {
        CorrelatorBackend::Polynomial => polynomial_correlator(
            hamiltonian,
            a,
            b,
            reference,
            reference_energy,
            frequencies,
            options.broadening,
            &options.polynomial,
            space,
            rng,
        ),
        CorrelatorBackend::ExactDiagonalization => exact_correlator(
            hamiltonian,
            a,
            b,
            reference,
            reference_energy,
            frequencies,
            options.broadening,
        ),
        CorrelatorBackend::CorrectionVector => match options.correction_mode {
            CorrectionMode::ConjugateGradient => correction_vector_correlator(
                hamiltonian,
                a,
                b,
                reference,
                reference_energy,
                frequencies,
                options.broadening,
                &options.correction,
                options.on_solve_failure,
            ),
            CorrectionMode::ExactInverse => exact_inverse_correlator(
                hamiltonian,
                a,
                b,
                reference,
                reference_energy,
                frequencies,
                options.broadening,
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(
            "KPM".parse::<CorrelatorBackend>().unwrap(),
            CorrelatorBackend::Polynomial
        );
        assert_eq!(
            "INV".parse::<CorrelatorBackend>().unwrap(),
            CorrelatorBackend::CorrectionVector
        );
        let err = "TD".parse::<CorrelatorBackend>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown correlator backend 'TD'.");
        assert_eq!(CorrelatorBackend::ExactDiagonalization.to_string(), "ED");
    }

    #[test]
    fn test_linspace_includes_endpoints() {
        let grid = FrequencyGrid::linspace(-1.0, 1.0, 5);
        assert_eq!(grid.as_slice(), &[-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(FrequencyGrid::linspace(2.0, 3.0, 1).as_slice(), &[2.0]);
        assert!(FrequencyGrid::linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_spectrum_integral_and_peak() {
        let spectrum = Spectrum {
            frequencies: vec![0.0, 1.0, 2.0],
            values: vec![c64::new(0.0, 0.0), c64::new(2.0, 0.0), c64::new(0.0, 0.0)],
            unconverged: Vec::new(),
        };
        assert!((spectrum.integrate() - 2.0).abs() < 1e-14);
        assert_eq!(spectrum.peak(), Some(1.0));
    }

    #[test]
    fn test_broadening_must_be_positive() {
        assert!(check_broadening(0.1).is_ok());
        let err = check_broadening(0.0).unwrap_err();
        assert!(matches!(err.kind(), SpectralErrorKind::InputError(_)));
        assert!(check_broadening(f64::NAN).is_err());
    }
}
