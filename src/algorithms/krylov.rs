//! Krylov basis growth and the projected eigenproblem.
//!
//! The basis is grown one vector at a time by applying the Krylov operator to the last
//! accepted vector and orthogonalizing the result against the basis and against an
//! optional set of excluded vectors (`skip`, typically eigenstates that were already
//! found and must not be found again). Whenever the new direction is numerically zero,
//! the Krylov space has become invariant and a random direction is used instead, so that
//! the basis keeps growing until either the target size is reached or the whole space
//! has been spanned.
//!
//! The Hamiltonian is then projected on the basis, `M_ij = <b_i|H|b_j>`, and the small
//! dense matrix is diagonalized with `faer`'s general complex eigensolver. `M` is not
//! assumed Hermitian, because the operator might not be.

use super::orthogonalize::orthogonalize_one;
use crate::{
    error::{SpectralError, SpectralErrorKind},
    matrix::LinearOperator,
    state::{StateVector, VectorSpace},
};
use faer::{Mat, c64};
use rand::Rng;

/// Eigendecomposition of a projected matrix.
///
/// `coefficients[k][i]` is the overlap `<psi_k|b_i>` of the `k`-th Ritz vector with the
/// `i`-th basis vector, so that `psi_k = sum_i conj(coefficients[k][i]) * b_i`.
#[derive(Clone, Debug)]
pub struct ProjectedEigen {
    pub energies: Vec<c64>,
    pub coefficients: Vec<Vec<c64>>,
}

/// Grows a Krylov basis up to `target_size` vectors.
///
/// With an empty `basis`, `seed` (orthogonalized against `skip`) becomes the first
/// vector. Otherwise `seed` is only used as the starting point of the first
/// application. The returned basis is orthonormal and orthogonal to `skip`, except for
/// vectors carried in through `basis` which are kept as given.
pub fn grow<O, S, R>(
    op: &O,
    space: &S,
    seed: &O::Vector,
    mut basis: Vec<O::Vector>,
    skip: &[O::Vector],
    target_size: usize,
    rng: &mut R,
) -> Vec<O::Vector>
where
    O: LinearOperator,
    S: VectorSpace<O::Vector>,
    R: Rng + ?Sized,
{
    let mut current = if basis.is_empty() {
        let first = orthogonalize_one(seed, skip.iter()).or_else(|| {
            log::trace!("Seed lies in the excluded span, drawing a random start");
            let excluded: Vec<&O::Vector> = skip.iter().collect();
            space.random_vector(&excluded, &mut *rng)
        });
        match first {
            Some(v) => {
                let v = v.normalize();
                basis.push(v.clone());
                v
            }
            None => return basis,
        }
    } else {
        seed.clone()
    };

    while basis.len() < target_size {
        let candidate = op.apply(&current);
        let next = orthogonalize_one(&candidate, basis.iter().chain(skip.iter())).or_else(|| {
            log::trace!(
                "Zero vector found at Krylov index {}, using a random one",
                basis.len()
            );
            let excluded: Vec<&O::Vector> = basis.iter().chain(skip.iter()).collect();
            space.random_vector(&excluded, &mut *rng)
        });
        match next {
            Some(v) => {
                current = v.normalize();
                basis.push(current.clone());
            }
            None => {
                log::debug!(
                    "Vector space exhausted after {} Krylov vectors (target {target_size})",
                    basis.len()
                );
                break;
            }
        }
    }
    basis
}

/// The projected matrix `M_ij = <b_i|H|b_j>`.
///
/// Each basis vector is multiplied by the operator once.
pub fn projected_matrix<H: LinearOperator>(hamiltonian: &H, basis: &[H::Vector]) -> Mat<c64> {
    let n = basis.len();
    let images: Vec<H::Vector> = basis.iter().map(|b| hamiltonian.apply(b)).collect();
    Mat::from_fn(n, n, |i, j| basis[i].dot(&images[j]))
}

/// Diagonalizes a (possibly non-Hermitian) projected matrix.
///
/// Eigenvalues are recomputed as Rayleigh quotients of the returned eigenvectors, which
/// is exact for exact eigenvectors and keeps the values consistent with the vectors.
pub fn diagonalize(matrix: &Mat<c64>) -> Result<ProjectedEigen, SpectralError> {
    let n = matrix.nrows();
    if n == 0 {
        return Err(SpectralErrorKind::EmptyKrylovBasis.into());
    }
    let evd = matrix
        .as_ref()
        .eigen()
        .map_err(|e| SpectralError::from(SpectralErrorKind::EvdError(e)))?;
    let u = evd.U();

    let mut energies = Vec::with_capacity(n);
    let mut coefficients = Vec::with_capacity(n);
    for k in 0..n {
        let column: Vec<c64> = (0..n).map(|i| u[(i, k)]).collect();
        let mut numerator = c64::new(0.0, 0.0);
        let mut denominator = 0.0;
        for i in 0..n {
            let mut row = c64::new(0.0, 0.0);
            for j in 0..n {
                row += matrix[(i, j)] * column[j];
            }
            numerator += column[i].conj() * row;
            denominator += column[i].norm_sqr();
        }
        energies.push(numerator / denominator);
        coefficients.push(column.iter().map(|c| c.conj()).collect());
    }

    Ok(ProjectedEigen {
        energies,
        coefficients,
    })
}

/// Energy uncertainty `sqrt(|<psi|H H psi> - <psi|H|psi>^2|)` of a normalized vector.
pub fn energy_error<H: LinearOperator>(hamiltonian: &H, psi: &H::Vector) -> f64 {
    let h_psi = hamiltonian.apply(psi);
    let energy = psi.dot(&h_psi);
    let energy_squared = psi.dot(&hamiltonian.apply(&h_psi));
    (energy_squared - energy * energy).norm().sqrt()
}

/// Index of the basis vector with the largest energy uncertainty, the natural place
/// to restart the Krylov recursion from.
pub fn most_mixed<H: LinearOperator>(hamiltonian: &H, basis: &[H::Vector]) -> Option<usize> {
    basis
        .iter()
        .map(|b| energy_error(hamiltonian, b))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
            Some((_, best_error)) if best_error >= e => best,
            _ => Some((i, e)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matrix::DenseOperator,
        state::{DenseSpace, DenseVector},
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn re(x: f64) -> c64 {
        c64::new(x, 0.0)
    }

    /// Hermitian test matrix with a complex off-diagonal.
    fn hermitian(n: usize) -> DenseOperator {
        DenseOperator::new(Mat::from_fn(n, n, |i, j| {
            if i == j {
                re(i as f64 - 1.5)
            } else if j == i + 1 {
                c64::new(0.3, 0.4)
            } else if i == j + 1 {
                c64::new(0.3, -0.4)
            } else {
                re(0.0)
            }
        }))
    }

    fn assert_orthonormal(basis: &[DenseVector]) {
        for (i, u) in basis.iter().enumerate() {
            for (j, w) in basis.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (u.dot(w) - re(expected)).norm() < 1e-10,
                    "Gram matrix entry ({i}, {j}) = {}",
                    u.dot(w)
                );
            }
        }
    }

    #[test]
    fn test_grow_yields_orthonormal_basis() {
        let h = hermitian(6);
        let mut rng = StdRng::seed_from_u64(21);
        let seed = DenseVector::from_fn(6, |i| re(1.0 / (i + 1) as f64));
        let basis = grow(&h, &DenseSpace::new(6), &seed, Vec::new(), &[], 4, &mut rng);
        assert_eq!(basis.len(), 4);
        assert_orthonormal(&basis);
    }

    #[test]
    fn test_grow_respects_skip_and_fills_invariant_space() {
        // An identity operator makes the Krylov space invariant after one vector.
        let identity = DenseOperator::new(Mat::from_fn(5, 5, |i, j| re((i == j) as u8 as f64)));
        let skip = vec![DenseVector::basis(5, 4)];
        let mut rng = StdRng::seed_from_u64(2);
        let seed = DenseVector::from_fn(5, |_| re(1.0));
        let basis = grow(&identity, &DenseSpace::new(5), &seed, Vec::new(), &skip, 10, &mut rng);
        // Only four directions are orthogonal to the skipped vector.
        assert_eq!(basis.len(), 4);
        assert_orthonormal(&basis);
        for b in &basis {
            assert!(b.dot(&skip[0]).norm() < 1e-10);
        }
    }

    #[test]
    fn test_full_projection_reproduces_spectrum() {
        let n = 4;
        let h = hermitian(n);
        let mut rng = StdRng::seed_from_u64(8);
        let seed = DenseVector::from_fn(n, |i| c64::new(1.0, 0.1 * i as f64));
        let basis = grow(&h, &DenseSpace::new(n), &seed, Vec::new(), &[], n, &mut rng);
        let m = projected_matrix(&h, &basis);
        let eig = diagonalize(&m).unwrap();

        let mut projected: Vec<f64> = eig.energies.iter().map(|e| e.re).collect();
        projected.sort_by(f64::total_cmp);

        let basis_e: Vec<DenseVector> = (0..n).map(|i| DenseVector::basis(n, i)).collect();
        let reference = diagonalize(&projected_matrix(&h, &basis_e)).unwrap();
        let mut exact: Vec<f64> = reference.energies.iter().map(|e| e.re).collect();
        exact.sort_by(f64::total_cmp);

        for (a, b) in projected.iter().zip(exact.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
        for e in &eig.energies {
            assert!(e.im.abs() < 1e-10);
        }
    }

    #[test]
    fn test_energy_error_vanishes_on_eigenvectors() {
        let h = DenseOperator::new(Mat::from_fn(2, 2, |i, j| re(if i == j { 1.0 } else { 0.0 })));
        assert!(energy_error(&h, &DenseVector::basis(2, 0)) < 1e-14);

        let mixed = DenseOperator::new(Mat::from_fn(2, 2, |i, j| {
            re(if i == j { i as f64 } else { 0.0 })
        }));
        let v = DenseVector::from_fn(2, |_| re(1.0)).normalize();
        // Equal superposition of energies 0 and 1: variance 1/4.
        assert!((energy_error(&mixed, &v) - 0.5).abs() < 1e-12);
        assert_eq!(most_mixed(&mixed, &[DenseVector::basis(2, 1), v]), Some(1));
    }
}
