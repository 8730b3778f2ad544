//! Restarted Arnoldi iteration.
//!
//! ** NOTE: We recommend using the high-level functions in [`crate::solvers`] instead.
//!
//! One restart cycle grows a Krylov basis of `count + k` vectors, projects the
//! Hamiltonian on it, extracts `count` eigenpairs with the active [`SelectionPolicy`]
//! and measures their energy uncertainty. The selected vectors seed the next cycle.
//! The Krylov padding `k` adapts between `min_krylov` and `max_krylov`: the further the
//! mean uncertainty is from the tolerance (on a logarithmic scale), the larger the next
//! subspace.
//!
//! The Krylov space is generated by a policy-dependent operator (the Hamiltonian, a
//! shifted Hamiltonian, or a resolvent for shift-and-invert), while the projected
//! problem always uses the Hamiltonian itself, so the returned energies are eigenvalues
//! of `H` regardless of the policy.

use super::{
    krylov::{diagonalize, energy_error, grow, most_mixed, projected_matrix},
    linear::{ConjugateGradientOptions, ShiftedInverse},
    orthogonalize::{orthogonalize_all, orthogonalize_one},
    power::{PowerEstimate, PowerMethodOptions, power_method},
    selection::{EigenPair, SelectionPolicy, select, sort_by_policy},
};
use crate::{
    error::{SpectralError, SpectralErrorKind},
    matrix::{LinearOperator, Shifted},
    state::{StateVector, VectorSpace},
};
use faer::c64;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of the restarted Arnoldi solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArnoldiOptions {
    /// Converged once every pair has an energy uncertainty below this value.
    pub tolerance: f64,
    /// Maximum number of restart cycles.
    pub max_iterations: usize,
    /// Smallest number of Krylov vectors added on top of the `count` carried vectors.
    /// Defaults to `count + 2`.
    pub min_krylov: Option<usize>,
    /// Largest number of Krylov vectors added on top of the carried vectors.
    /// Defaults to `min_krylov + 8`.
    pub max_krylov: Option<usize>,
    /// Compute eigenpairs one at a time, excluding those already found.
    pub recursive: bool,
    /// Warm start. With a zero `shift` the solver picks one that suits the policy.
    pub power: PowerMethodOptions,
    /// Weight of a random vector mixed into the seed of every restart, in `[0, 1)`.
    pub mix: f64,
    /// Inner solver of the shift-and-invert operator.
    pub inverse_solver: ConjugateGradientOptions,
}

impl Default for ArnoldiOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 10,
            min_krylov: None,
            max_krylov: None,
            recursive: false,
            power: PowerMethodOptions::default(),
            mix: 0.0,
            inverse_solver: ConjugateGradientOptions::default(),
        }
    }
}

/// Extra Krylov vectors added to `max_krylov` when it is not set explicitly.
const DEFAULT_KRYLOV_RANGE: usize = 8;

impl ArnoldiOptions {
    /// The `(min, max)` Krylov padding for `count` requested eigenpairs.
    pub fn krylov_bounds(&self, count: usize) -> (usize, usize) {
        let min = self.min_krylov.unwrap_or(count + 2);
        let max = self.max_krylov.unwrap_or(min + DEFAULT_KRYLOV_RANGE).max(min);
        (min, max)
    }
}

/// Convergence report of a solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Convergence {
    pub converged: bool,
    /// Restart cycles performed (summed over pairs in recursive mode).
    pub iterations: usize,
    pub max_error: f64,
    /// Energy uncertainty of each returned pair, in output order.
    pub errors: Vec<f64>,
}

/// Eigenpairs ordered by the selection policy, with their convergence report.
#[derive(Clone, Debug)]
pub struct ArnoldiOutput<V> {
    pub pairs: Vec<EigenPair<V>>,
    pub convergence: Convergence,
}

impl<V> ArnoldiOutput<V> {
    pub fn energies(&self) -> Vec<c64> {
        self.pairs.iter().map(|p| p.energy).collect()
    }

    pub fn vectors(&self) -> Vec<&V> {
        self.pairs.iter().map(|p| &p.vector).collect()
    }

    pub fn into_vectors(self) -> Vec<V> {
        self.pairs.into_iter().map(|p| p.vector).collect()
    }

    /// Turns an unconverged result into [`SpectralErrorKind::NonConvergence`].
    pub fn require_converged(self, tolerance: f64) -> Result<Self, SpectralError> {
        if self.convergence.converged {
            Ok(self)
        } else {
            Err(SpectralErrorKind::NonConvergence {
                iterations: self.convergence.iterations,
                max_error: self.convergence.max_error,
                tolerance,
            }
            .into())
        }
    }
}

/// Next Krylov padding from the mean energy uncertainty of the last cycle.
///
/// `f = 1 - clamp(ln(mean) / ln(tol), 0, 1)`, so any error of order one or larger
/// yields `max`, an error at or below the tolerance yields `min`, and the size never
/// decreases as the error grows.
pub fn next_krylov_size(mean_error: f64, tolerance: f64, min: usize, max: usize) -> usize {
    let ratio = mean_error.ln() / tolerance.ln();
    let ratio = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    };
    let fraction = 1.0 - ratio;
    (min as f64 + fraction * (max - min) as f64).round() as usize
}

/// The operator that generates the Krylov space for a given policy.
enum KrylovOperator<'a, H> {
    Plain(&'a H),
    Shifted(Shifted<&'a H>),
    Inverse(ShiftedInverse<&'a H>),
}

impl<'a, H: LinearOperator> KrylovOperator<'a, H> {
    fn new(hamiltonian: &'a H, policy: &SelectionPolicy, options: &ArnoldiOptions) -> Self {
        match *policy {
            SelectionPolicy::GroundState
            | SelectionPolicy::LargestMagnitude
            | SelectionPolicy::SmallestImaginary => Self::Plain(hamiltonian),
            SelectionPolicy::SmallestMagnitude { target } => {
                Self::Shifted(Shifted::new(hamiltonian, c64::new(-target, 0.0)))
            }
            SelectionPolicy::MostRealGroundState { operator_shift, .. } => {
                Self::Shifted(Shifted::new(hamiltonian, c64::new(-operator_shift, 0.0)))
            }
            SelectionPolicy::ShiftInvert { target, broadening } => Self::Inverse(
                ShiftedInverse::new(
                    hamiltonian,
                    c64::new(target, broadening),
                    options.inverse_solver.clone(),
                ),
            ),
        }
    }
}

impl<H: LinearOperator> LinearOperator for KrylovOperator<'_, H> {
    type Vector = H::Vector;

    fn apply(&self, v: &H::Vector) -> H::Vector {
        match self {
            Self::Plain(h) => h.apply(v),
            Self::Shifted(op) => op.apply(v),
            Self::Inverse(op) => op.apply(v),
        }
    }
}

/// A configured restarted Arnoldi solver for one Hamiltonian and one policy.
pub struct RestartedArnoldi<'a, H, S> {
    hamiltonian: &'a H,
    space: &'a S,
    policy: SelectionPolicy,
    options: ArnoldiOptions,
}

impl<'a, H, S> RestartedArnoldi<'a, H, S>
where
    H: LinearOperator,
    S: VectorSpace<H::Vector>,
{
    pub fn new(
        hamiltonian: &'a H,
        space: &'a S,
        policy: SelectionPolicy,
        options: ArnoldiOptions,
    ) -> Self {
        Self {
            hamiltonian,
            space,
            policy,
            options,
        }
    }

    pub fn options(&self) -> &ArnoldiOptions {
        &self.options
    }

    /// Computes `count` eigenpairs from a cold start.
    ///
    /// In recursive mode the pairs are found one at a time, each solve excluding the
    /// vectors found before it, and the result is reordered by the policy.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<ArnoldiOutput<H::Vector>, SpectralError> {
        if count == 0 {
            return Err(SpectralErrorKind::InputError(
                "at least one eigenpair must be requested".to_string(),
            )
            .into());
        }
        if !self.options.recursive || count == 1 {
            return self.solve_from(count, Vec::new(), &[], rng);
        }

        let mut found: Vec<H::Vector> = Vec::with_capacity(count);
        let mut pairs = Vec::with_capacity(count);
        let mut iterations = 0;
        let mut converged = true;
        for k in 0..count {
            let mut output = self.solve_from(1, Vec::new(), &found, rng)?;
            log::debug!(
                "Recursive Arnoldi: pair {k} at energy {} (error {:e})",
                output.pairs[0].energy,
                output.convergence.max_error
            );
            iterations += output.convergence.iterations;
            converged &= output.convergence.converged;
            let pair = output.pairs.remove(0);
            found.push(pair.vector.clone());
            pairs.push(pair);
        }

        let pairs = sort_by_policy(pairs, &self.policy);
        let errors: Vec<f64> = pairs
            .iter()
            .map(|p| energy_error(self.hamiltonian, &p.vector))
            .collect();
        let max_error = errors.iter().copied().fold(0.0, f64::max);
        Ok(ArnoldiOutput {
            pairs,
            convergence: Convergence {
                converged,
                iterations,
                max_error,
                errors,
            },
        })
    }

    /// Runs the restart loop from an optional initial basis, excluding `skip`.
    ///
    /// `initial` vectors are re-orthonormalized (against each other and against `skip`)
    /// before use. With no initial vector the seed comes from the power method.
    pub fn solve_from<R: Rng + ?Sized>(
        &self,
        count: usize,
        initial: Vec<H::Vector>,
        skip: &[H::Vector],
        rng: &mut R,
    ) -> Result<ArnoldiOutput<H::Vector>, SpectralError> {
        if count == 0 {
            return Err(SpectralErrorKind::InputError(
                "at least one eigenpair must be requested".to_string(),
            )
            .into());
        }
        let options = &self.options;
        if !(0.0..1.0).contains(&options.mix) {
            return Err(SpectralErrorKind::InputError(format!(
                "restart mixing must lie in [0, 1), got {}",
                options.mix
            ))
            .into());
        }
        let (min_krylov, max_krylov) = options.krylov_bounds(count);
        let operator = KrylovOperator::new(self.hamiltonian, &self.policy, options);

        let mut krylov_size = min_krylov;
        let mut carried = initial;
        let mut best: Option<ArnoldiOutput<H::Vector>> = None;

        for iteration in 1..=options.max_iterations.max(1) {
            let target_size = count + krylov_size;

            let (seed, basis) = if carried.is_empty() {
                let excluded: Vec<&H::Vector> = skip.iter().collect();
                let warm = self.warm_start(&excluded, rng)?;
                if target_size == 1 && count == 1 {
                    log::debug!("Single-vector subspace, returning the power-method estimate");
                    return Ok(self.power_result(warm.vector));
                }
                (warm.vector, Vec::new())
            } else {
                let cleaned: Vec<H::Vector> = carried
                    .iter()
                    .filter_map(|v| orthogonalize_one(v, skip.iter()))
                    .collect();
                let basis = orthogonalize_all(&cleaned);
                let seed = most_mixed(self.hamiltonian, &basis)
                    .map(|i| basis[i].clone())
                    .ok_or(SpectralErrorKind::EmptyKrylovBasis)?;
                (self.mix_seed(seed, &basis, skip, rng), basis)
            };

            let basis = grow(&operator, self.space, &seed, basis, skip, target_size, rng);
            if basis.is_empty() {
                return Err(SpectralErrorKind::EmptyKrylovBasis.into());
            }
            let projected = projected_matrix(self.hamiltonian, &basis);
            let eigen = diagonalize(&projected)?;
            let pairs = select(&eigen, &basis, &self.policy, count)?;

            let errors: Vec<f64> = pairs
                .iter()
                .map(|p| energy_error(self.hamiltonian, &p.vector))
                .collect();
            let max_error = errors.iter().copied().fold(0.0, f64::max);
            let mean_error = errors.iter().sum::<f64>() / errors.len() as f64;
            log::debug!(
                "Arnoldi iteration {iteration}: {} Krylov vectors, max error {max_error:e}",
                basis.len()
            );

            let converged = max_error < options.tolerance;
            let output = ArnoldiOutput {
                pairs,
                convergence: Convergence {
                    converged,
                    iterations: iteration,
                    max_error,
                    errors,
                },
            };
            if converged {
                return Ok(output);
            }

            krylov_size = next_krylov_size(mean_error, options.tolerance, min_krylov, max_krylov);
            carried = output.pairs.iter().map(|p| p.vector.clone()).collect();
            if best
                .as_ref()
                .is_none_or(|b| max_error < b.convergence.max_error)
            {
                best = Some(output);
            }
        }

        let mut best = best.ok_or(SpectralErrorKind::EmptyKrylovBasis)?;
        best.convergence.iterations = options.max_iterations.max(1);
        log::warn!(
            "Arnoldi did not converge after {} iterations (max error {:e}, tolerance {:e})",
            best.convergence.iterations,
            best.convergence.max_error,
            options.tolerance
        );
        Ok(best)
    }

    /// Power-method seed pointing towards the end of the spectrum the policy targets.
    ///
    /// The ground-state policies rerun the power method on `H - |e|` when the unshifted
    /// run settles on a positive energy `e`, which makes the most negative level
    /// dominant. A nonzero shift in the options is used as given.
    fn warm_start<R: Rng + ?Sized>(
        &self,
        excluded: &[&H::Vector],
        rng: &mut R,
    ) -> Result<PowerEstimate<H::Vector>, SpectralError> {
        let power = &self.options.power;
        let estimate = power_method(self.hamiltonian, self.space, power, excluded, rng)?;
        let seeks_low_end = matches!(
            self.policy,
            SelectionPolicy::GroundState | SelectionPolicy::MostRealGroundState { .. }
        );
        if power.shift != 0.0 || !seeks_low_end || estimate.energy.re <= 0.0 {
            return Ok(estimate);
        }
        let shift = -estimate.magnitude();
        log::debug!(
            "Warm start settled at the top of the spectrum ({}), shifting by {shift:.4}",
            estimate.energy
        );
        let shifted = PowerMethodOptions {
            shift,
            ..power.clone()
        };
        power_method(self.hamiltonian, self.space, &shifted, excluded, rng)
    }

    /// Mixes a random direction into a restart seed and orthogonalizes the result
    /// against the carried basis. Falls back to `seed` when nothing is left.
    fn mix_seed<R: Rng + ?Sized>(
        &self,
        seed: H::Vector,
        basis: &[H::Vector],
        skip: &[H::Vector],
        rng: &mut R,
    ) -> H::Vector {
        let mix = self.options.mix;
        if mix == 0.0 {
            return seed;
        }
        let excluded: Vec<&H::Vector> = skip.iter().collect();
        let Some(noise) = self.space.random_vector(&excluded, rng) else {
            return seed;
        };
        let mixed = seed
            .scale(c64::new(1.0 - mix, 0.0))
            .add_scaled(c64::new(mix, 0.0), &noise)
            .normalize();
        orthogonalize_one(&mixed, basis.iter())
            .map(|v| v.normalize())
            .unwrap_or(seed)
    }

    fn power_result(&self, vector: H::Vector) -> ArnoldiOutput<H::Vector> {
        let energy = self.hamiltonian.expectation(&vector, &vector);
        let error = energy_error(self.hamiltonian, &vector);
        ArnoldiOutput {
            pairs: vec![EigenPair {
                energy,
                vector,
                coefficients: vec![c64::new(1.0, 0.0)],
            }],
            convergence: Convergence {
                converged: error < self.options.tolerance,
                iterations: 1,
                max_error: error,
                errors: vec![error],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matrix::DenseOperator,
        state::{DenseSpace, StateVector},
    };
    use faer::Mat;
    use rand::{SeedableRng, rngs::StdRng};

    fn diagonal(values: &[f64]) -> DenseOperator {
        let n = values.len();
        DenseOperator::new(Mat::from_fn(n, n, |i, j| {
            c64::new(if i == j { values[i] } else { 0.0 }, 0.0)
        }))
    }

    fn options(min_krylov: usize) -> ArnoldiOptions {
        ArnoldiOptions {
            tolerance: 1e-6,
            max_iterations: 40,
            min_krylov: Some(min_krylov),
            max_krylov: Some(min_krylov + 2),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_krylov_size_grows_with_error() {
        assert_eq!(next_krylov_size(1.0, 1e-4, 3, 13), 13);
        assert_eq!(next_krylov_size(1e-2, 1e-4, 3, 13), 8);
        assert_eq!(next_krylov_size(1e-6, 1e-4, 3, 13), 3);
        assert_eq!(next_krylov_size(0.0, 1e-4, 3, 13), 3);
        assert_eq!(next_krylov_size(f64::NAN, 1e-4, 3, 13), 13);
        // Errors above one keep the largest subspace.
        assert_eq!(next_krylov_size(1e1, 1e-4, 3, 13), 13);
        assert_eq!(next_krylov_size(1e2, 1e-4, 3, 13), 13);
        assert_eq!(next_krylov_size(1e4, 1e-4, 3, 13), 13);
        let sizes: Vec<usize> = [1e-5, 1e-3, 1e-1, 1e1, 1e3]
            .iter()
            .map(|&e| next_krylov_size(e, 1e-4, 3, 13))
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "{sizes:?}");
    }

    #[test]
    fn test_ground_state_of_diagonal_operator() {
        let h = diagonal(&[2.0, -3.0, 0.0, 1.0, 2.5, -1.0, 3.0, 4.0]);
        let space = DenseSpace::new(8);
        let solver = RestartedArnoldi::new(&h, &space, SelectionPolicy::GroundState, options(4));
        let output = solver.solve(1, &mut StdRng::seed_from_u64(4)).unwrap();
        assert!(output.convergence.converged);
        assert!((output.pairs[0].energy.re + 3.0).abs() < 1e-6);
        assert!((output.pairs[0].vector.get(1).norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_space_gives_whole_spectrum() {
        let values = [0.5, -2.0, 1.5, -0.5];
        let h = diagonal(&values);
        let space = DenseSpace::new(4);
        let solver = RestartedArnoldi::new(&h, &space, SelectionPolicy::GroundState, options(0));
        let output = solver.solve(4, &mut StdRng::seed_from_u64(1)).unwrap();
        let energies: Vec<f64> = output.energies().iter().map(|e| e.re).collect();
        let expected = [-2.0, -0.5, 0.5, 1.5];
        for (e, x) in energies.iter().zip(expected.iter()) {
            assert!((e - x).abs() < 1e-10, "{energies:?}");
        }
        assert!(output.convergence.converged);
    }

    #[test]
    fn test_shift_invert_targets_interior_eigenvalue() {
        let h = diagonal(&[-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        let space = DenseSpace::new(6);
        let policy = SelectionPolicy::ShiftInvert {
            target: 0.9,
            broadening: 0.1,
        };
        let solver = RestartedArnoldi::new(&h, &space, policy, options(2));
        let output = solver.solve(1, &mut StdRng::seed_from_u64(17)).unwrap();
        assert!(output.convergence.converged);
        assert!((output.pairs[0].energy.re - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recursive_mode_returns_distinct_sorted_pairs() {
        let h = diagonal(&[1.0, -5.0, -2.0, 1.5, -3.0, 0.5]);
        let space = DenseSpace::new(6);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::GroundState,
            ArnoldiOptions {
                recursive: true,
                ..options(3)
            },
        );
        let output = solver.solve(3, &mut StdRng::seed_from_u64(23)).unwrap();
        let energies: Vec<f64> = output.energies().iter().map(|e| e.re).collect();
        for (e, x) in energies.iter().zip([-5.0, -3.0, -2.0].iter()) {
            assert!((e - x).abs() < 1e-6, "{energies:?}");
        }
        let v = output.vectors();
        assert!(v[0].dot(v[1]).norm() < 1e-6);
        assert!(v[1].dot(v[2]).norm() < 1e-6);
    }

    #[test]
    fn test_exhausted_budget_reports_best_result() {
        let values: Vec<f64> = (0..12).map(|i| (i as f64 * 0.7).sin() * 3.0).collect();
        let h = diagonal(&values);
        let space = DenseSpace::new(12);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::GroundState,
            ArnoldiOptions {
                tolerance: 1e-12,
                max_iterations: 1,
                min_krylov: Some(1),
                max_krylov: Some(1),
                ..Default::default()
            },
        );
        let output = solver.solve(1, &mut StdRng::seed_from_u64(2)).unwrap();
        assert!(!output.convergence.converged);
        assert_eq!(output.convergence.iterations, 1);
        let err = output.require_converged(1e-12).unwrap_err();
        assert!(matches!(
            err.kind(),
            SpectralErrorKind::NonConvergence { iterations: 1, .. }
        ));
    }

    #[test]
    fn test_single_vector_subspace_uses_power_method() {
        let h = diagonal(&[-4.0, 0.5, 1.0]);
        let space = DenseSpace::new(3);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::LargestMagnitude,
            ArnoldiOptions {
                min_krylov: Some(0),
                power: PowerMethodOptions {
                    max_iterations: 200,
                    tolerance: 1e-14,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let output = solver.solve(1, &mut StdRng::seed_from_u64(6)).unwrap();
        assert_eq!(output.pairs[0].coefficients, vec![c64::new(1.0, 0.0)]);
        assert!((output.pairs[0].energy.re + 4.0).abs() < 1e-8);
    }

    #[test]
    fn test_warm_start_reaches_ground_state_of_positive_dominated_spectrum() {
        // The largest magnitude is the top level, yet the single-vector solve must
        // return the bottom one.
        let h = diagonal(&[0.2, 5.0, -1.0, 3.0, 0.5]);
        let space = DenseSpace::new(5);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::GroundState,
            ArnoldiOptions {
                min_krylov: Some(0),
                power: PowerMethodOptions {
                    max_iterations: 200,
                    tolerance: 1e-14,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let output = solver.solve(1, &mut StdRng::seed_from_u64(11)).unwrap();
        assert!((output.pairs[0].energy.re + 1.0).abs() < 1e-8);
        assert!((output.pairs[0].vector.get(2).norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_restart_mixing_still_converges() {
        let h = diagonal(&[2.0, -3.0, 0.0, 1.0, 2.5, -1.0, 3.0, 4.0]);
        let space = DenseSpace::new(8);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::GroundState,
            ArnoldiOptions {
                mix: 0.3,
                max_iterations: 200,
                max_krylov: Some(6),
                ..options(3)
            },
        );
        let output = solver.solve(1, &mut StdRng::seed_from_u64(8)).unwrap();
        assert!(output.convergence.converged);
        assert!((output.pairs[0].energy.re + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_mixing_outside_unit_interval_is_rejected() {
        let h = diagonal(&[1.0, 2.0]);
        let space = DenseSpace::new(2);
        let solver = RestartedArnoldi::new(
            &h,
            &space,
            SelectionPolicy::GroundState,
            ArnoldiOptions {
                mix: 1.0,
                ..Default::default()
            },
        );
        let err = solver.solve(1, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err.kind(), SpectralErrorKind::InputError(_)));
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let h = diagonal(&[1.0, 2.0]);
        let space = DenseSpace::new(2);
        let solver =
            RestartedArnoldi::new(&h, &space, SelectionPolicy::GroundState, Default::default());
        let err = solver.solve(0, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err.kind(), SpectralErrorKind::InputError(_)));
    }
}
