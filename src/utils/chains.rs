//! This module assembles spin-1/2 chain operators used as test problems.
//!
//! States of an `n`-site chain are indexed by an integer `s` in `0..2^n`, where bit `i`
//! of `s` is the spin on site `i` (`1` for up, `0` for down). Every operator is built as
//! a list of triplets and stored as a [`SparseOperator`]. Chains have open boundaries.

use crate::matrix::SparseOperator;
use faer::{
    c64,
    sparse::{SparseColMat, Triplet},
};
use thiserror::Error;

/// Largest chain the builders accept (`2^24` states).
pub const MAX_SITES: usize = 24;

/// Represents all possible errors that can occur while building a chain operator.
#[derive(Error, Debug, PartialEq)]
pub enum ChainError {
    /// The chain length is outside `min..=MAX_SITES`.
    #[error("Invalid chain length {sites}: expected between {min} and {MAX_SITES} sites.")]
    InvalidLength { sites: usize, min: usize },
    /// A local operator was requested on a site that does not exist.
    #[error("Site {site} is out of range for a chain of {sites} sites.")]
    SiteOutOfRange { site: usize, sites: usize },
    /// Occurs if the sparse matrix construction fails internally.
    #[error("Internal error: Failed to construct the sparse matrix from triplets.")]
    SparseMatrixConstructionError,
}

/// A single-site spin operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinComponent {
    X,
    Y,
    Z,
    /// Raising operator `S+`.
    Plus,
    /// Lowering operator `S-`.
    Minus,
}

fn check_length(sites: usize, min: usize) -> Result<usize, ChainError> {
    if (min..=MAX_SITES).contains(&sites) {
        Ok(1 << sites)
    } else {
        Err(ChainError::InvalidLength { sites, min })
    }
}

fn assemble(
    dim: usize,
    triplets: &[Triplet<usize, usize, c64>],
) -> Result<SparseOperator, ChainError> {
    let matrix = SparseColMat::try_new_from_triplets(dim, dim, triplets)
        .map_err(|_| ChainError::SparseMatrixConstructionError)?;
    Ok(SparseOperator::new(matrix))
}

/// `+1/2` for an up spin on `site`, `-1/2` otherwise.
fn sz(state: usize, site: usize) -> f64 {
    if (state >> site) & 1 == 1 { 0.5 } else { -0.5 }
}

/// Heisenberg chain `H = J sum_i S_i . S_{i+1}`.
///
/// `J > 0` is antiferromagnetic. Two sites give a singlet at `-3J/4` and a triplet at
/// `J/4`.
pub fn heisenberg_chain(sites: usize, coupling: f64) -> Result<SparseOperator, ChainError> {
    let dim = check_length(sites, 2)?;
    let mut triplets = Vec::new();
    for state in 0..dim {
        let mut diagonal = 0.0;
        for i in 0..sites - 1 {
            diagonal += coupling * sz(state, i) * sz(state, i + 1);
            // S+S- + S-S+ flips an antiparallel pair.
            if sz(state, i) != sz(state, i + 1) {
                let flipped = state ^ (0b11 << i);
                triplets.push(Triplet {
                    row: flipped,
                    col: state,
                    val: c64::new(0.5 * coupling, 0.0),
                });
            }
        }
        triplets.push(Triplet {
            row: state,
            col: state,
            val: c64::new(diagonal, 0.0),
        });
    }
    assemble(dim, &triplets)
}

/// Transverse-field Ising chain `H = -J sum_i Sz_i Sz_{i+1} - h sum_i Sx_i`.
pub fn transverse_ising_chain(
    sites: usize,
    coupling: f64,
    field: f64,
) -> Result<SparseOperator, ChainError> {
    let dim = check_length(sites, 1)?;
    let mut triplets = Vec::new();
    for state in 0..dim {
        let diagonal: f64 = (0..sites.saturating_sub(1))
            .map(|i| -coupling * sz(state, i) * sz(state, i + 1))
            .sum();
        triplets.push(Triplet {
            row: state,
            col: state,
            val: c64::new(diagonal, 0.0),
        });
        for i in 0..sites {
            triplets.push(Triplet {
                row: state ^ (1 << i),
                col: state,
                val: c64::new(-0.5 * field, 0.0),
            });
        }
    }
    assemble(dim, &triplets)
}

/// A spin operator acting on one site of an `sites`-site chain.
pub fn local_spin_operator(
    sites: usize,
    site: usize,
    component: SpinComponent,
) -> Result<SparseOperator, ChainError> {
    let dim = check_length(sites, 1)?;
    if site >= sites {
        return Err(ChainError::SiteOutOfRange { site, sites });
    }
    let bit = 1 << site;
    let mut triplets = Vec::with_capacity(dim);
    for state in 0..dim {
        let up = state & bit != 0;
        let entry = match component {
            SpinComponent::Z => Some((state, c64::new(sz(state, site), 0.0))),
            SpinComponent::X => Some((state ^ bit, c64::new(0.5, 0.0))),
            // Sy = (S+ - S-) / 2i
            SpinComponent::Y => Some((
                state ^ bit,
                c64::new(0.0, if up { 0.5 } else { -0.5 }),
            )),
            SpinComponent::Plus => (!up).then(|| (state | bit, c64::new(1.0, 0.0))),
            SpinComponent::Minus => up.then(|| (state & !bit, c64::new(1.0, 0.0))),
        };
        if let Some((row, val)) = entry {
            triplets.push(Triplet {
                row,
                col: state,
                val,
            });
        }
    }
    assemble(dim, &triplets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matrix::{Composed, LinearOperator},
        state::{DenseVector, StateVector},
    };

    #[test]
    fn test_two_site_heisenberg_spectrum() {
        let h = heisenberg_chain(2, 1.0).unwrap().to_dense().unwrap();
        // |01> and |10> mix into the singlet and the m = 0 triplet.
        assert_eq!(h[(0, 0)], c64::new(0.25, 0.0));
        assert_eq!(h[(1, 1)], c64::new(-0.25, 0.0));
        assert_eq!(h[(1, 2)], c64::new(0.5, 0.0));
        assert_eq!(h[(2, 1)], c64::new(0.5, 0.0));
        assert_eq!(h[(3, 3)], c64::new(0.25, 0.0));
    }

    #[test]
    fn test_spin_algebra() {
        // [S+, S-] = 2 Sz on a single site.
        let plus = local_spin_operator(2, 1, SpinComponent::Plus).unwrap();
        let minus = local_spin_operator(2, 1, SpinComponent::Minus).unwrap();
        let z = local_spin_operator(2, 1, SpinComponent::Z).unwrap();
        let v = DenseVector::from_fn(4, |i| c64::new(1.0 + i as f64, 0.5 * i as f64));
        let commutator = Composed::new(&plus, &minus)
            .apply(&v)
            .add_scaled(c64::new(-1.0, 0.0), &Composed::new(&minus, &plus).apply(&v));
        let expected = z.apply(&v).scale(c64::new(2.0, 0.0));
        assert!(commutator.add_scaled(c64::new(-1.0, 0.0), &expected).norm() < 1e-14);

        // Sy is Hermitian and squares to 1/4.
        let y = local_spin_operator(3, 0, SpinComponent::Y).unwrap();
        let yy = Composed::new(&y, &y).apply(&v_of(8));
        assert!(yy.add_scaled(c64::new(-0.25, 0.0), &v_of(8)).norm() < 1e-14);
        let dense = y.to_dense().unwrap();
        assert_eq!(dense[(1, 0)], dense[(0, 1)].conj());
    }

    fn v_of(n: usize) -> DenseVector {
        DenseVector::from_fn(n, |i| c64::new(i as f64, 1.0))
    }

    #[test]
    fn test_transverse_field_only() {
        // J = 0: the ground energy is -h/2 per site.
        let h = transverse_ising_chain(3, 0.0, 1.0).unwrap();
        let plus_x = DenseVector::from_fn(8, |_| c64::new(1.0, 0.0)).normalize();
        let energy = h.expectation(&plus_x, &plus_x);
        assert!((energy.re + 1.5).abs() < 1e-14);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            heisenberg_chain(1, 1.0).unwrap_err(),
            ChainError::InvalidLength { sites: 1, min: 2 }
        );
        assert_eq!(
            local_spin_operator(2, 2, SpinComponent::X).unwrap_err(),
            ChainError::SiteOutOfRange { site: 2, sites: 2 }
        );
        assert_eq!(
            ChainError::SiteOutOfRange { site: 2, sites: 2 }.to_string(),
            "Site 2 is out of range for a chain of 2 sites."
        );
    }
}
