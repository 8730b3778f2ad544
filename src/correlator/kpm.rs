//! Kernel polynomial method.
//!
//! The Hamiltonian is shifted by the reference energy and rescaled into `[-1, 1]`,
//! `H~ = (H - E_ref) / scale`, and the correlator is expanded in Chebyshev polynomials
//! of `H~`. The moments
//!
//! ```text
//! mu_n = <ref| A T_n(H~) B |ref>
//! ```
//!
//! follow from the three-term recurrence `r_{n+1} = 2 H~ r_n - r_{n-1}` applied to
//! `r_0 = B|ref>`, one operator application per moment. The truncated series is
//! damped by a kernel to suppress Gibbs oscillations. The Lorentz kernel turns every
//! delta peak into a Lorentzian of half-width `lambda / N` in rescaled units, so the
//! number of moments is chosen as `N = ceil(lambda * scale / eta)` to reproduce the
//! requested broadening.
//!
//! The damped series carries a `1 / sqrt(1 - x^2)` weight that diverges at the band
//! edges `x = +-1` even where the spectrum has no weight. The scale is therefore chosen
//! so that every requested frequency sits inside `|x| <= 0.9`, and points beyond
//! `|x| = 0.95` are never reconstructed.

use super::{Spectrum, check_broadening};
use crate::{
    algorithms::power::{PowerMethodOptions, power_method},
    error::SpectralError,
    matrix::{LinearOperator, Scaled, Shifted},
    state::{StateVector, VectorSpace},
};
use faer::c64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Largest rescaled frequency `|w| / scale` on the requested grid.
const GRID_FILL: f64 = 0.9;

/// Rescaled frequencies beyond this value evaluate to zero.
pub const EDGE_CUTOFF: f64 = 0.95;

/// Damping kernel applied to the Chebyshev moments.

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    /// `g_n = sinh(lambda (1 - n/N)) / sinh(lambda)`; Lorentzian line shape.
    Lorentz { lambda: f64 },
    /// Jackson kernel; nearly Gaussian line shape of width about `pi / N`.
    Jackson,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::Lorentz { lambda: 4.0 }
    }
}

impl Kernel {
    /// Resolution of the kernel in rescaled units, times the number of moments.
    pub fn resolution(&self) -> f64 {
        match *self {
            Self::Lorentz { lambda } => lambda,
            Self::Jackson => PI,
        }
    }

    /// Damping factors `g_0 .. g_{count-1}`.
    pub fn damping(&self, count: usize) -> Vec<f64> {
        let n_total = count as f64;
        match *self {
            Self::Lorentz { lambda } => (0..count)
                .map(|n| (lambda * (1.0 - n as f64 / n_total)).sinh() / lambda.sinh())
                .collect(),
            Self::Jackson => {
                let q = PI / (n_total + 1.0);
                (0..count)
                    .map(|n| {
                        let n = n as f64;
                        ((n_total - n + 1.0) * (q * n).cos() + (q * n).sin() / q.tan())
                            / (n_total + 1.0)
                    })
                    .collect()
            }
        }
    }
}

/// Configuration of the polynomial backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolynomialOptions {
    pub kernel: Kernel,
    /// Factor applied to the power-method estimate of the spectral bound.
    pub bound_margin: f64,
    /// Upper limit on the number of moments.
    pub max_moments: usize,
    /// Spectral-bound estimate.
    pub power: PowerMethodOptions,
}

impl Default for PolynomialOptions {
    fn default() -> Self {
        Self {
            kernel: Kernel::default(),
            bound_margin: 2.0,
            max_moments: 20_000,
            power: PowerMethodOptions {
                max_iterations: 100,
                tolerance: 1e-4,
                ..Default::default()
            },
        }
    }
}

/// Number of moments that resolves a broadening `eta` at the given scale.
pub fn moment_count(scale: f64, broadening: f64, options: &PolynomialOptions) -> usize {
    let wanted = (options.kernel.resolution() * scale / broadening).ceil();
    (wanted as usize).clamp(2, options.max_moments.max(2))
}

/// Chebyshev moments `<ref| A T_n((H - E_ref) / scale) B |ref>` for `n < count`.
pub fn chebyshev_moments<H, A, B>(
    hamiltonian: &H,
    a: &A,
    b: &B,
    reference: &H::Vector,
    reference_energy: f64,
    scale: f64,
    count: usize,
) -> Vec<c64>
where
    H: LinearOperator,
    A: LinearOperator<Vector = H::Vector>,
    B: LinearOperator<Vector = H::Vector>,
{
    let rescaled = Scaled::new(
        Shifted::new(hamiltonian, c64::new(-reference_energy, 0.0)),
        c64::new(1.0 / scale, 0.0),
    );
    let mut moments = Vec::with_capacity(count);
    if count == 0 {
        return moments;
    }

    let mut previous = b.apply(reference);
    moments.push(a.expectation(reference, &previous));
    if count == 1 {
        return moments;
    }
    let mut current = rescaled.apply(&previous);
    moments.push(a.expectation(reference, &current));

    for _ in 2..count {
        let next = rescaled
            .apply(&current)
            .scale(c64::new(2.0, 0.0))
            .add_scaled(c64::new(-1.0, 0.0), &previous);
        moments.push(a.expectation(reference, &next));
        previous = current;
        current = next;
    }
    moments
}

/// Evaluates the damped expansion at every frequency.
///
/// Frequencies with `|w| / scale > EDGE_CUTOFF` get a zero value.
pub fn reconstruct(moments: &[c64], kernel: &Kernel, scale: f64, frequencies: &[f64]) -> Vec<c64> {
    let damping = kernel.damping(moments.len());
    frequencies
        .iter()
        .map(|&w| {
            let x = w / scale;
            if moments.is_empty() || x.abs() > EDGE_CUTOFF {
                return c64::new(0.0, 0.0);
            }
            let theta = x.acos();
            let series = moments
                .iter()
                .zip(damping.iter())
                .enumerate()
                .skip(1)
                .fold(moments[0] * damping[0], |acc, (n, (mu, g))| {
                    acc + *mu * (2.0 * g * (n as f64 * theta).cos())
                });
            series / (PI * (1.0 - x * x).sqrt() * scale)
        })
        .collect()
}

/// Correlator by the kernel polynomial method.
///
/// The spectral bound of `H - E_ref` is estimated with the power method and inflated by
/// [`PolynomialOptions::bound_margin`], since the power method approaches the spectral
/// radius from below. The scale is widened further when the frequency grid reaches
/// beyond `0.9` of the inflated bound.
#[allow(clippy::too_many_arguments)]
pub fn polynomial_correlator<H, A, B, S, R>(
    hamiltonian: &H,
    a: &A,
    b: &B,
    reference: &H::Vector,
    reference_energy: f64,
    frequencies: &[f64],
    broadening: f64,
    options: &PolynomialOptions,
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
    check_broadening(broadening)?;
    let centered = Shifted::new(hamiltonian, c64::new(-reference_energy, 0.0));
    let bound = power_method(&centered, space, &options.power, &[], rng)?
        .magnitude()
        .max(broadening);
    let reach = frequencies.iter().fold(0.0, |acc: f64, w| acc.max(w.abs()));
    let scale = (options.bound_margin * bound).max(reach / GRID_FILL);
    let count = moment_count(scale, broadening, options);
    log::debug!("KPM with {count} moments, scale {scale:.4}");

    if count == options.max_moments {
        log::warn!(
            "Moment count capped at {count}; the effective broadening exceeds {broadening}"
        );
    }

    let moments = chebyshev_moments(
        hamiltonian,
        a,
        b,
        reference,
        reference_energy,
        scale,
        count,
    );
    Ok(Spectrum {
        frequencies: frequencies.to_vec(),
        values: reconstruct(&moments, &options.kernel, scale, frequencies),
        unconverged: Vec::new(),
    })
}
