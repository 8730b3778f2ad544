//! This module defines the core abstraction for linear operators.
//!
//! Krylov methods never need the individual entries of a matrix: their fundamental
//! operation is the operator-vector product. The [`LinearOperator`] trait formalizes this
//! "matrix-free" contract, so the eigensolver and the correlator backends can be written
//! once and used with dense matrices, sparse matrices, or externally defined operators
//! (a matrix-product operator acting on a matrix-product state, for example).
//!
//! Operators compose. Shifted, scaled, summed and composed operators are built with the
//! small combinators at the bottom of this module ([`Shifted`], [`Scaled`], [`Sum`],
//! [`Composed`]) and are themselves linear operators. This is how the solvers form
//! `H + s`, `1 + dt (H - s) / s` or `(H - w)^2 + delta^2` without ever materializing them.

use crate::state::{DenseVector, StateVector};
use faer::{
    Mat, MatRef, Par, c64,
    dyn_stack::{MemBuffer, MemStack},
    matrix_free::LinOp,
    sparse::SparseColMat,
};

/// A linear map acting on state vectors of type [`LinearOperator::Vector`].
///
/// # Example
///
/// A generic routine only needs to know how to apply the operator.
///
/// ```rust
/// use arnoldi_spectra::matrix::{DenseOperator, LinearOperator};
/// use arnoldi_spectra::state::{DenseVector, StateVector};
/// use faer::{Mat, c64};
///
/// fn rayleigh_quotient<V: StateVector>(op: &impl LinearOperator<Vector = V>, v: &V) -> c64 {
///     op.expectation(v, v) / v.dot(v)
/// }
///
/// let h = DenseOperator::new(Mat::from_fn(2, 2, |i, j| {
///     c64::new(if i == j { 1.0 } else { 0.5 }, 0.0)
/// }));
/// let v = DenseVector::basis(2, 0);
/// assert!((rayleigh_quotient(&h, &v) - c64::new(1.0, 0.0)).norm() < 1e-14);
/// ```
pub trait LinearOperator {
    /// The state type the operator acts on.
    type Vector: StateVector;

    /// Applies the operator, returning a new vector.
    fn apply(&self, v: &Self::Vector) -> Self::Vector;

    /// The bilinear form ⟨bra|self|ket⟩.
    fn expectation(&self, bra: &Self::Vector, ket: &Self::Vector) -> c64 {
        bra.dot(&self.apply(ket))
    }

    /// The explicit matrix, when the operator has one.
    fn to_dense(&self) -> Option<Mat<c64>> {
        None
    }
}

impl<O: LinearOperator + ?Sized> LinearOperator for &O {
    type Vector = O::Vector;

    #[inline]
    fn apply(&self, v: &O::Vector) -> O::Vector {
        (**self).apply(v)
    }

    #[inline]
    fn expectation(&self, bra: &O::Vector, ket: &O::Vector) -> c64 {
        (**self).expectation(bra, ket)
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        (**self).to_dense()
    }
}

/// An explicit dense complex matrix.
#[derive(Clone, Debug)]
pub struct DenseOperator {
    matrix: Mat<c64>,
}

impl DenseOperator {
    /// Wraps a square matrix. Panics if the matrix is not square.
    pub fn new(matrix: Mat<c64>) -> Self {
        assert_eq!(
            matrix.nrows(),
            matrix.ncols(),
            "Operator must be square, got {}x{}.",
            matrix.nrows(),
            matrix.ncols()
        );
        Self { matrix }
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn as_mat(&self) -> MatRef<'_, c64> {
        self.matrix.as_ref()
    }
}

impl LinearOperator for DenseOperator {
    type Vector = DenseVector;

    #[inline]
    fn apply(&self, v: &DenseVector) -> DenseVector {
        // Ensure dimensional compatibility for the matrix product.
        assert_eq!(
            self.matrix.ncols(),
            v.len(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.matrix.ncols(),
            v.len(),
        );
        DenseVector::from_column(self.matrix.as_ref() * v.as_mat())
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        Some(self.matrix.clone())
    }
}

/// A sparse complex matrix in compressed-column storage, applied through `faer`'s
/// matrix-free [`LinOp`] interface.
#[derive(Clone, Debug)]
pub struct SparseOperator {
    matrix: SparseColMat<usize, c64>,
}

impl SparseOperator {
    pub fn new(matrix: SparseColMat<usize, c64>) -> Self {
        assert_eq!(
            matrix.nrows(),
            matrix.ncols(),
            "Operator must be square, got {}x{}.",
            matrix.nrows(),
            matrix.ncols()
        );
        Self { matrix }
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn as_sparse(&self) -> &SparseColMat<usize, c64> {
        &self.matrix
    }
}

impl LinearOperator for SparseOperator {
    type Vector = DenseVector;

    fn apply(&self, v: &DenseVector) -> DenseVector {
        assert_eq!(
            self.matrix.ncols(),
            v.len(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.matrix.ncols(),
            v.len(),
        );
        let op = self.matrix.as_ref();
        let mut out = Mat::<c64>::zeros(op.nrows(), 1);
        let mut mem = MemBuffer::new(op.apply_scratch(1, Par::Seq));
        let stack = MemStack::new(&mut mem);
        LinOp::apply(&op, out.as_mut(), v.as_mat(), Par::Seq, stack);
        DenseVector::from_column(out)
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        // Duplicate entries are accumulated, matching the sparse product.
        let mut dense = Mat::<c64>::zeros(self.matrix.nrows(), self.matrix.ncols());
        for triplet in self.matrix.triplet_iter() {
            dense[(triplet.row, triplet.col)] += *triplet.val;
        }
        Some(dense)
    }
}

/// `inner + shift * I`.
#[derive(Clone, Debug)]
pub struct Shifted<O> {
    pub inner: O,
    pub shift: c64,
}

impl<O> Shifted<O> {
    pub fn new(inner: O, shift: c64) -> Self {
        Self { inner, shift }
    }
}

impl<O: LinearOperator> LinearOperator for Shifted<O> {
    type Vector = O::Vector;

    fn apply(&self, v: &O::Vector) -> O::Vector {
        self.inner.apply(v).add_scaled(self.shift, v)
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        let mut dense = self.inner.to_dense()?;
        for i in 0..dense.nrows().min(dense.ncols()) {
            dense[(i, i)] += self.shift;
        }
        Some(dense)
    }
}

/// `factor * inner`.
#[derive(Clone, Debug)]
pub struct Scaled<O> {
    pub inner: O,
    pub factor: c64,
}

impl<O> Scaled<O> {
    pub fn new(inner: O, factor: c64) -> Self {
        Self { inner, factor }
    }
}

impl<O: LinearOperator> LinearOperator for Scaled<O> {
    type Vector = O::Vector;

    fn apply(&self, v: &O::Vector) -> O::Vector {
        self.inner.apply(v).scale(self.factor)
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        let dense = self.inner.to_dense()?;
        Some(Mat::from_fn(dense.nrows(), dense.ncols(), |i, j| {
            dense[(i, j)] * self.factor
        }))
    }
}

/// `left + right`.
#[derive(Clone, Debug)]
pub struct Sum<A, B> {
    pub left: A,
    pub right: B,
}

impl<A, B> Sum<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: LinearOperator, B: LinearOperator<Vector = A::Vector>> LinearOperator for Sum<A, B> {
    type Vector = A::Vector;

    fn apply(&self, v: &A::Vector) -> A::Vector {
        self.left
            .apply(v)
            .add_scaled(c64::new(1.0, 0.0), &self.right.apply(v))
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        let left = self.left.to_dense()?;
        let right = self.right.to_dense()?;
        Some(Mat::from_fn(left.nrows(), left.ncols(), |i, j| {
            left[(i, j)] + right[(i, j)]
        }))
    }
}

/// `outer * inner`: `inner` is applied first.
#[derive(Clone, Debug)]
pub struct Composed<A, B> {
    pub outer: A,
    pub inner: B,
}

impl<A, B> Composed<A, B> {
    pub fn new(outer: A, inner: B) -> Self {
        Self { outer, inner }
    }
}

impl<A: LinearOperator, B: LinearOperator<Vector = A::Vector>> LinearOperator for Composed<A, B> {
    type Vector = A::Vector;

    fn apply(&self, v: &A::Vector) -> A::Vector {
        self.outer.apply(&self.inner.apply(v))
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        let outer = self.outer.to_dense()?;
        let inner = self.inner.to_dense()?;
        Some(&outer * &inner)
    }
}
