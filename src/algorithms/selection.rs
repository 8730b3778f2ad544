//! Eigenvalue-selection policies and eigenpair extraction.
//!
//! A [`SelectionPolicy`] is a pure function from a list of candidate energies to the
//! index of the candidate that best matches a criterion. Several eigenpairs are
//! extracted by applying the policy repeatedly, removing each chosen candidate from the
//! pool before the next pick, so the outputs are always distinct.

use super::krylov::ProjectedEigen;
use crate::{
    error::{SpectralError, SpectralErrorKind},
    state::StateVector,
};
use faer::c64;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The criterion used to pick eigenpairs out of the projected spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Most negative real part.
    GroundState,
    /// Largest magnitude.
    LargestMagnitude,
    /// Closest to `target`; the Krylov space is built with `(H - (target + i broadening))^-1`.
    ShiftInvert { target: f64, broadening: f64 },
    /// Closest to `target`, with the Krylov space built from `H` itself.
    SmallestMagnitude { target: f64 },
    /// Smallest |imaginary part|.
    SmallestImaginary,
    /// Low real part with a small imaginary part.
    ///
    /// Each candidate is weighted by `1 / (dr^2 + im^2 / broadening + broadening)`, where
    /// `dr` is the real part measured from the lowest real part among the candidates.
    /// The Krylov operator is `H - operator_shift`.
    MostRealGroundState { broadening: f64, operator_shift: f64 },
}

impl SelectionPolicy {
    /// Index of the candidate preferred by this policy. Ties resolve to the first index.
    ///
    /// Returns `None` for an empty slice.
    pub fn select_index(&self, energies: &[c64]) -> Option<usize> {
        match *self {
            Self::GroundState => argmin(energies, |e| e.re),
            Self::LargestMagnitude => argmin(energies, |e| -e.norm()),
            Self::ShiftInvert { target, .. } | Self::SmallestMagnitude { target } => {
                argmin(energies, |e| (e - c64::new(target, 0.0)).norm())
            }
            Self::SmallestImaginary => argmin(energies, |e| e.im.abs()),
            Self::MostRealGroundState { broadening, .. } => {
                let floor = energies
                    .iter()
                    .map(|e| e.re)
                    .fold(f64::INFINITY, f64::min);
                argmin(energies, |e| {
                    let dr = e.re - floor;
                    let weight = 1.0 / (dr * dr + e.im * e.im / broadening + broadening);
                    -weight
                })
            }
        }
    }

    /// Parses a policy from its short or long name, with explicit payload values.
    ///
    /// Recognized names: `GS`/`ground_state`, `LM`/`largest_magnitude`,
    /// `ShiftInv`/`shift_invert`, `SM`/`smallest_magnitude`, `SI`/`smallest_imaginary`,
    /// `MRGS`/`most_real_ground_state`. For `MRGS` the operator shift defaults to zero.
    pub fn parse(name: &str, target: f64, broadening: f64) -> Result<Self, SpectralError> {
        let policy = match name {
            "GS" | "ground_state" => Self::GroundState,
            "LM" | "largest_magnitude" => Self::LargestMagnitude,
            "ShiftInv" | "shift_invert" => Self::ShiftInvert { target, broadening },
            "SM" | "smallest_magnitude" => Self::SmallestMagnitude { target },
            "SI" | "smallest_imaginary" => Self::SmallestImaginary,
            "MRGS" | "most_real_ground_state" => Self::MostRealGroundState {
                broadening,
                operator_shift: 0.0,
            },
            other => {
                return Err(SpectralErrorKind::InvalidSelectionMode(other.to_string()).into());
            }
        };
        Ok(policy)
    }
}

impl FromStr for SelectionPolicy {
    type Err = SpectralError;

    /// Parses a policy name with a zero target and a broadening of `0.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, 0.0, 0.1)
    }
}

/// First index minimizing `key`. NaN keys never win.
fn argmin(energies: &[c64], key: impl Fn(c64) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &e) in energies.iter().enumerate() {
        let k = key(e);
        let k = if k.is_nan() { f64::INFINITY } else { k };
        match best {
            Some((_, best_key)) if best_key <= k => {}
            _ => best = Some((i, k)),
        }
    }
    best.map(|(i, _)| i)
}

/// A selected eigenpair.
#[derive(Clone, Debug)]
pub struct EigenPair<V> {
    pub energy: c64,
    pub vector: V,
    /// Overlaps `<vector|b_i>` with the Krylov basis the pair was extracted from.
    pub coefficients: Vec<c64>,
}

/// Picks `count` eigenpairs of the projected problem according to `policy` and
/// reconstructs them in the full space as `sum_i conj(c_i) b_i`, normalized.
pub fn select<V: StateVector>(
    eigen: &ProjectedEigen,
    basis: &[V],
    policy: &SelectionPolicy,
    count: usize,
) -> Result<Vec<EigenPair<V>>, SpectralError> {
    let available = eigen.energies.len();
    if count > available {
        return Err(SpectralErrorKind::InsufficientCandidates {
            requested: count,
            available,
        }
        .into());
    }
    if basis.is_empty() {
        return Err(SpectralErrorKind::EmptyKrylovBasis.into());
    }

    let mut energies = eigen.energies.clone();
    let mut candidates = eigen.coefficients.clone();
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let index = policy.select_index(&energies).ok_or(
            SpectralErrorKind::InsufficientCandidates {
                requested: count,
                available,
            },
        )?;
        let energy = energies.remove(index);
        let coefficients = candidates.remove(index);
        let vector =
            reconstruct(basis, &coefficients).ok_or(SpectralErrorKind::EmptyKrylovBasis)?;
        pairs.push(EigenPair {
            energy,
            vector,
            coefficients,
        });
    }
    Ok(pairs)
}

/// `sum_i conj(c_i) b_i`, normalized. `None` for an empty basis.
fn reconstruct<V: StateVector>(basis: &[V], coefficients: &[c64]) -> Option<V> {
    let mut terms = basis.iter().zip(coefficients.iter());
    let (b0, c0) = terms.next()?;
    let combined = terms.fold(b0.scale(c0.conj()), |acc, (b, c)| {
        acc.add_scaled(c.conj(), b)
    });
    Some(combined.normalize())
}

/// Reorders eigenpairs by repeated application of `policy`, best first.
pub fn sort_by_policy<V>(pairs: Vec<EigenPair<V>>, policy: &SelectionPolicy) -> Vec<EigenPair<V>> {
    let mut pool = pairs;
    let mut sorted = Vec::with_capacity(pool.len());
    while !pool.is_empty() {
        let energies: Vec<c64> = pool.iter().map(|p| p.energy).collect();
        let index = policy.select_index(&energies).unwrap_or(0);
        sorted.push(pool.remove(index));
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DenseVector;

    fn energies() -> Vec<c64> {
        vec![
            c64::new(0.5, 0.2),
            c64::new(-1.0, 0.3),
            c64::new(2.0, 0.0),
            c64::new(-1.0, 0.01),
            c64::new(0.1, -0.05),
        ]
    }

    #[test]
    fn test_policy_catalogue() {
        let es = energies();
        assert_eq!(SelectionPolicy::GroundState.select_index(&es), Some(1));
        assert_eq!(SelectionPolicy::LargestMagnitude.select_index(&es), Some(2));
        assert_eq!(SelectionPolicy::SmallestImaginary.select_index(&es), Some(2));
        assert_eq!(
            SelectionPolicy::SmallestMagnitude { target: 0.4 }.select_index(&es),
            Some(0)
        );
        assert_eq!(
            SelectionPolicy::ShiftInvert {
                target: 0.0,
                broadening: 0.1
            }
            .select_index(&es),
            Some(4)
        );
        // The two candidates at Re = -1 differ only by their imaginary part.
        assert_eq!(
            SelectionPolicy::MostRealGroundState {
                broadening: 0.1,
                operator_shift: 0.0
            }
            .select_index(&es),
            Some(3)
        );
        assert_eq!(SelectionPolicy::GroundState.select_index(&[]), None);
    }

    #[test]
    fn test_ties_resolve_to_first_index_and_nan_never_wins() {
        let es = vec![c64::new(f64::NAN, 0.0), c64::new(1.0, 0.0), c64::new(1.0, 0.0)];
        assert_eq!(SelectionPolicy::GroundState.select_index(&es), Some(1));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "GS".parse::<SelectionPolicy>().unwrap(),
            SelectionPolicy::GroundState
        );
        assert_eq!(
            SelectionPolicy::parse("ShiftInv", 1.5, 0.2).unwrap(),
            SelectionPolicy::ShiftInvert {
                target: 1.5,
                broadening: 0.2
            }
        );
        let err = "lowest".parse::<SelectionPolicy>().unwrap_err();
        assert_eq!(
            err.kind(),
            &SpectralErrorKind::InvalidSelectionMode("lowest".to_string())
        );
    }

    #[test]
    fn test_select_is_distinct_and_checks_count() {
        let basis: Vec<DenseVector> = (0..3).map(|i| DenseVector::basis(3, i)).collect();
        let eigen = ProjectedEigen {
            energies: vec![c64::new(1.0, 0.0), c64::new(-2.0, 0.0), c64::new(0.0, 0.0)],
            coefficients: (0..3)
                .map(|k| (0..3).map(|i| c64::new((i == k) as u8 as f64, 0.0)).collect())
                .collect(),
        };
        let pairs = select(&eigen, &basis, &SelectionPolicy::GroundState, 3).unwrap();
        let picked: Vec<f64> = pairs.iter().map(|p| p.energy.re).collect();
        assert_eq!(picked, vec![-2.0, 0.0, 1.0]);
        assert_eq!(pairs[0].vector, basis[1]);
        assert!(pairs[0].vector.dot(&pairs[1].vector).norm() < 1e-14);

        let err = select(&eigen, &basis, &SelectionPolicy::GroundState, 4).unwrap_err();
        assert_eq!(
            err.kind(),
            &SpectralErrorKind::InsufficientCandidates {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_reconstruction_conjugates_coefficients() {
        let basis: Vec<DenseVector> = (0..2).map(|i| DenseVector::basis(2, i)).collect();
        let eigen = ProjectedEigen {
            energies: vec![c64::new(0.0, 0.0)],
            coefficients: vec![vec![c64::new(0.0, 1.0), c64::new(0.0, 0.0)]],
        };
        let pair = select(&eigen, &basis, &SelectionPolicy::GroundState, 1)
            .unwrap()
            .remove(0);
        assert!((pair.vector.get(0) - c64::new(0.0, -1.0)).norm() < 1e-14);
    }

    #[test]
    fn test_sort_by_policy() {
        let pairs: Vec<EigenPair<()>> = [3.0, -1.0, 2.0]
            .iter()
            .map(|&e| EigenPair {
                energy: c64::new(e, 0.0),
                vector: (),
                coefficients: Vec::new(),
            })
            .collect();
        let sorted = sort_by_policy(pairs, &SelectionPolicy::GroundState);
        let order: Vec<f64> = sorted.iter().map(|p| p.energy.re).collect();
        assert_eq!(order, vec![-1.0, 2.0, 3.0]);
    }
}
