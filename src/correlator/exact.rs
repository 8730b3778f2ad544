//! Exact-diagonalization backend.
//!
//! The explicit Hamiltonian is diagonalized once, `H = sum_j E_j |j><j|`, and the
//! correlator is the Lehmann sum
//!
//! ```text
//! G(z) = sum_j <ref|A|j> <j|B|ref> / (z + E_ref - E_j)
//! C(w) = (G(w - i eta) - G(w + i eta)) / (2 pi i)
//! ```
//!
//! which is a sum of unit-area Lorentzians centered at the excitation energies
//! `E_j - E_ref`. The operators and the reference state must expose a dense matrix.

use super::{Spectrum, check_broadening};
use crate::{
    error::{SpectralError, SpectralErrorKind},
    matrix::LinearOperator,
    state::StateVector,
};
use faer::{Mat, Side, c64};
use std::f64::consts::PI;

/// Eigenvalues and eigenvectors of a dense Hermitian matrix.
///
/// Energies are recomputed as Rayleigh quotients `<u_j|H|u_j>` of the returned vectors.
pub fn hermitian_eigen(matrix: &Mat<c64>) -> Result<(Vec<f64>, Mat<c64>), SpectralError> {
    let evd = matrix
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| SpectralError::from(SpectralErrorKind::EvdError(e)))?;
    let u = evd.U().to_owned();
    let hu = matrix * &u;
    let n = matrix.nrows();
    let energies = (0..n)
        .map(|j| {
            (0..n)
                .fold(c64::new(0.0, 0.0), |acc, i| acc + u[(i, j)].conj() * hu[(i, j)])
                .re
        })
        .collect();
    Ok((energies, u))
}

/// Dense forms of the Hamiltonian, both operators and the reference state.
pub(crate) struct DenseProblem {
    pub hamiltonian: Mat<c64>,
    pub left: Mat<c64>,
    pub right: Mat<c64>,
    pub reference: Mat<c64>,
}

impl DenseProblem {
    pub(crate) fn new<H, A, B>(
        hamiltonian: &H,
        a: &A,
        b: &B,
        reference: &H::Vector,
    ) -> Result<Self, SpectralError>
    where
        H: LinearOperator,
        A: LinearOperator<Vector = H::Vector>,
        B: LinearOperator<Vector = H::Vector>,
    {
        let problem = Self {
            hamiltonian: hamiltonian
                .to_dense()
                .ok_or(SpectralErrorKind::NotExplicit("hamiltonian"))?,
            left: a
                .to_dense()
                .ok_or(SpectralErrorKind::NotExplicit("left operator"))?,
            right: b
                .to_dense()
                .ok_or(SpectralErrorKind::NotExplicit("right operator"))?,
            reference: reference
                .to_dense()
                .ok_or(SpectralErrorKind::NotExplicit("reference state"))?,
        };
        let n = problem.dim();
        if problem.reference.nrows() != n
            || problem.left.nrows() != n
            || problem.right.nrows() != n
        {
            return Err(SpectralErrorKind::InputError(format!(
                "dimension mismatch: hamiltonian {n}, reference {}, operators {} and {}",
                problem.reference.nrows(),
                problem.left.nrows(),
                problem.right.nrows()
            ))
            .into());
        }
        Ok(problem)
    }

    pub(crate) fn dim(&self) -> usize {
        self.hamiltonian.nrows()
    }
}

/// Correlator by an explicit Lehmann sum.
pub fn exact_correlator<H, A, B>(
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
    let DenseProblem {
        hamiltonian: h,
        left: a_matrix,
        right: b_matrix,
        reference,
    } = DenseProblem::new(hamiltonian, a, b, reference)?;
    let n = h.nrows();

    let (energies, u) = hermitian_eigen(&h)?;
    log::debug!("Lehmann sum over {n} eigenstates");

    // <ref|A|j> and <j|B|ref> for every eigenstate j.
    let a_u = &a_matrix * &u;
    let b_ref = &b_matrix * &reference;
    let weights: Vec<c64> = (0..n)
        .map(|j| {
            let left = (0..n).fold(c64::new(0.0, 0.0), |acc, i| {
                acc + reference[(i, 0)].conj() * a_u[(i, j)]
            });
            let right = (0..n).fold(c64::new(0.0, 0.0), |acc, i| {
                acc + u[(i, j)].conj() * b_ref[(i, 0)]
            });
            left * right
        })
        .collect();

    let values = frequencies
        .iter()
        .map(|&w| {
            let green = |sign: f64| {
                let z = c64::new(w + reference_energy, sign * broadening);
                energies
                    .iter()
                    .zip(weights.iter())
                    .fold(c64::new(0.0, 0.0), |acc, (&e, &m)| {
                        acc + m / (z - c64::new(e, 0.0))
                    })
            };
            (green(-1.0) - green(1.0)) / c64::new(0.0, 2.0 * PI)
        })
        .collect();

    Ok(Spectrum {
        frequencies: frequencies.to_vec(),
        values,
        unconverged: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix::DenseOperator, state::DenseVector};

    fn re(x: f64) -> c64 {
        c64::new(x, 0.0)
    }

    /// A state-vector type with no dense form.
    #[derive(Clone)]
    struct Opaque;

    impl StateVector for Opaque {
        fn dot(&self, _: &Self) -> c64 {
            re(1.0)
        }
        fn scale(&self, _: c64) -> Self {
            Opaque
        }
        fn add_scaled(&self, _: c64, _: &Self) -> Self {
            Opaque
        }
    }

    struct OpaqueOperator;

    impl LinearOperator for OpaqueOperator {
        type Vector = Opaque;

        fn apply(&self, v: &Opaque) -> Opaque {
            v.clone()
        }
    }

    #[test]
    fn test_two_level_lorentzian() {
        // Ground state |0> at -1, excited |1> at 1, A = B = sigma_x.
        let h = DenseOperator::new(Mat::from_fn(2, 2, |i, j| {
            re(if i == j { [-1.0, 1.0][i] } else { 0.0 })
        }));
        let sx = DenseOperator::new(Mat::from_fn(2, 2, |i, j| re((i != j) as u8 as f64)));
        let reference = DenseVector::basis(2, 0);
        let eta = 0.1;
        let frequencies = [0.0, 2.0, 2.5];
        let spectrum =
            exact_correlator(&h, &sx, &sx, &reference, -1.0, &frequencies, eta).unwrap();
        for (&w, value) in frequencies.iter().zip(spectrum.values.iter()) {
            let d = w - 2.0;
            let expected = eta / (PI * (d * d + eta * eta));
            assert!((value.re - expected).abs() < 1e-12, "w = {w}");
            assert!(value.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_matrix_free_operator_is_rejected() {
        let err = exact_correlator(
            &OpaqueOperator,
            &OpaqueOperator,
            &OpaqueOperator,
            &Opaque,
            0.0,
            &[0.0],
            0.1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), &SpectralErrorKind::NotExplicit("hamiltonian"));
    }
}
