//! Matrix-free linear solves.
//!
//! Both consumers of this module need the action of a resolvent `(H - z)^-1` for a
//! complex `z = a + ib` and a Hermitian `H`: the shift-and-invert Krylov operator and
//! the correction-vector correlator backend. `H - z` is not Hermitian, but for
//! Hermitian `H` it commutes with its adjoint, so
//!
//! ```text
//! (H - z)^-1 = (H - conj(z)) [(H - a)^2 + b^2]^-1
//! ```
//!
//! and the bracket is Hermitian positive definite whenever `b != 0`. It is inverted with
//! the conjugate gradient method, which only needs operator applications.

use crate::{
    matrix::{Composed, LinearOperator, Shifted},
    state::StateVector,
};
use faer::c64;
use serde::{Deserialize, Serialize};

/// Configuration of the conjugate gradient solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConjugateGradientOptions {
    /// Target relative residual `||b - Ax|| / ||b||`.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ConjugateGradientOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 10_000,
        }
    }
}

/// The result of a conjugate gradient solve.
#[derive(Clone, Debug)]
pub struct CgSolution<V> {
    pub x: V,
    pub iterations: usize,
    /// Final relative residual.
    pub residual: f64,
    pub converged: bool,
}

/// `(H - shift)^2 + broadening^2`, the Hermitian positive definite operator of the
/// normal equations.
pub type ShiftedSquare<'a, O> = Shifted<Composed<Shifted<&'a O>, Shifted<&'a O>>>;

/// Builds `(op - shift)^2 + broadening^2` without materializing it.
pub fn shifted_square<O: LinearOperator>(
    op: &O,
    shift: f64,
    broadening: f64,
) -> ShiftedSquare<'_, O> {
    let centered = || Shifted::new(op, c64::new(-shift, 0.0));
    Shifted::new(
        Composed::new(centered(), centered()),
        c64::new(broadening * broadening, 0.0),
    )
}

/// Solves `op x = rhs` for a Hermitian positive definite `op`, starting from `x = 0`.
///
/// Never fails: when the iteration budget runs out the last iterate is returned with
/// `converged == false`. A zero right-hand side returns the zero vector immediately.
pub fn conjugate_gradient<O: LinearOperator>(
    op: &O,
    rhs: &O::Vector,
    options: &ConjugateGradientOptions,
) -> CgSolution<O::Vector> {
    let rhs_norm = rhs.norm();
    let mut x = rhs.scale(c64::new(0.0, 0.0));
    if rhs_norm == 0.0 {
        return CgSolution {
            x,
            iterations: 0,
            residual: 0.0,
            converged: true,
        };
    }

    let mut r = rhs.clone();
    let mut p = r.clone();
    let mut rs = r.dot(&r).re;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if rs.sqrt() <= options.tolerance * rhs_norm {
            break;
        }
        let ap = op.apply(&p);
        let curvature = p.dot(&ap);
        if curvature.norm() == 0.0 {
            break;
        }
        let alpha = c64::new(rs, 0.0) / curvature;
        x = x.add_scaled(alpha, &p);
        r = r.add_scaled(-alpha, &ap);
        iterations += 1;

        let rs_next = r.dot(&r).re;
        let beta = rs_next / rs;
        rs = rs_next;
        p = r.add_scaled(c64::new(beta, 0.0), &p);
    }

    let residual = rs.max(0.0).sqrt() / rhs_norm;
    CgSolution {
        x,
        iterations,
        residual,
        converged: residual <= options.tolerance,
    }
}

/// The resolvent `(H - z)^-1` of a Hermitian `H`, applied by conjugate gradient.
///
/// `Im z` must be non-zero, otherwise the normal equations are singular on the
/// eigenvalues of `H` closest to `Re z`.
#[derive(Clone, Debug)]
pub struct ShiftedInverse<O> {
    pub hamiltonian: O,
    pub shift: c64,
    pub options: ConjugateGradientOptions,
}

impl<O> ShiftedInverse<O> {
    pub fn new(hamiltonian: O, shift: c64, options: ConjugateGradientOptions) -> Self {
        Self {
            hamiltonian,
            shift,
            options,
        }
    }
}

impl<O: LinearOperator> LinearOperator for ShiftedInverse<O> {
    type Vector = O::Vector;

    fn apply(&self, v: &O::Vector) -> O::Vector {
        let normal = shifted_square(&self.hamiltonian, self.shift.re, self.shift.im);
        let solution = conjugate_gradient(&normal, v, &self.options);
        if !solution.converged {
            log::warn!(
                "Shift-invert solve at {} stopped after {} iterations (residual {:e})",
                self.shift,
                solution.iterations,
                solution.residual
            );
        }
        Shifted::new(&self.hamiltonian, -self.shift.conj()).apply(&solution.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix::DenseOperator, state::DenseVector};
    use faer::Mat;

    fn re(x: f64) -> c64 {
        c64::new(x, 0.0)
    }

    /// Hermitian tridiagonal matrix with eigenvalues spread over [-1, 3].
    fn hermitian(n: usize) -> DenseOperator {
        DenseOperator::new(Mat::from_fn(n, n, |i, j| {
            if i == j {
                re(1.0)
            } else if j == i + 1 {
                c64::new(0.0, 1.0)
            } else if i == j + 1 {
                c64::new(0.0, -1.0)
            } else {
                re(0.0)
            }
        }))
    }

    #[test]
    fn test_conjugate_gradient_solves_positive_definite_system() {
        let n = 8;
        let h = hermitian(n);
        let op = shifted_square(&h, 0.3, 0.5);
        let b = DenseVector::from_fn(n, |i| c64::new(1.0, i as f64 * 0.1));
        let solution = conjugate_gradient(&op, &b, &ConjugateGradientOptions::default());
        assert!(solution.converged);
        let residual = op.apply(&solution.x).add_scaled(re(-1.0), &b);
        assert!(residual.norm() < 1e-8 * b.norm());
    }

    #[test]
    fn test_zero_rhs_returns_zero() {
        let h = hermitian(3);
        let zero = DenseVector::from_fn(3, |_| re(0.0));
        let solution = conjugate_gradient(&h, &zero, &ConjugateGradientOptions::default());
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.x.norm(), 0.0);
    }

    #[test]
    fn test_iteration_budget_is_reported() {
        let h = hermitian(10);
        let op = shifted_square(&h, 0.0, 0.1);
        let b = DenseVector::from_fn(10, |i| re(1.0 + i as f64));
        let options = ConjugateGradientOptions {
            tolerance: 1e-14,
            max_iterations: 1,
        };
        let solution = conjugate_gradient(&op, &b, &options);
        assert_eq!(solution.iterations, 1);
        assert!(!solution.converged);
    }

    #[test]
    fn test_shifted_inverse_inverts_resolvent() {
        let n = 6;
        let h = hermitian(n);
        let z = c64::new(0.7, 0.2);
        let inverse = ShiftedInverse::new(&h, z, ConjugateGradientOptions::default());
        let v = DenseVector::from_fn(n, |i| c64::new((i as f64).sin(), 1.0));
        let x = inverse.apply(&v);
        let back = Shifted::new(&h, -z).apply(&x);
        assert!(back.add_scaled(re(-1.0), &v).norm() < 1e-7);
    }
}
