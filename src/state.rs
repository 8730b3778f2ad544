//! The state-vector side of the capability interface consumed by the solvers.
//!
//! Krylov methods never look inside a state. They only need an inner product,
//! scalar combinations, normalization and a way to draw random directions. The
//! [`StateVector`] and [`VectorSpace`] traits capture exactly that, so the same
//! algorithms run on dense columns, on sparse-operator test problems, or on any
//! external representation (matrix-product states, for instance) that implements them.
//!
//! [`DenseVector`] and [`DenseSpace`] are the reference implementation on top of
//! `faer` column matrices.

use crate::algorithms::orthogonalize::orthogonalize_one;
use faer::{Mat, MatRef, c64};
use rand::Rng;

/// An element of a complex inner-product space.
///
/// Implementations are value-like: every operation returns a new vector and never
/// mutates `self`. Solvers clone a vector whenever they keep it across iterations.
pub trait StateVector: Clone {
    /// The inner product ⟨self|other⟩, antilinear in `self`.
    fn dot(&self, other: &Self) -> c64;

    /// Returns `alpha * self`.
    fn scale(&self, alpha: c64) -> Self;

    /// Returns `self + alpha * other`.
    fn add_scaled(&self, alpha: c64, other: &Self) -> Self;

    /// The Euclidean norm induced by [`StateVector::dot`].
    fn norm(&self) -> f64 {
        self.dot(self).re.max(0.0).sqrt()
    }

    /// Returns the vector scaled to unit norm. A zero vector is returned unchanged.
    fn normalize(&self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            self.scale(c64::new(1.0 / norm, 0.0))
        } else {
            self.clone()
        }
    }

    /// The explicit column of coefficients, when the representation has one.
    fn to_dense(&self) -> Option<Mat<c64>> {
        None
    }
}

/// A factory for random vectors of a given space.
pub trait VectorSpace<V: StateVector> {
    /// Draws a random normalized vector orthogonal to every vector in `orthogonal_to`.
    ///
    /// Returns `None` when the excluded vectors already span the whole space.
    fn random_vector<R: Rng + ?Sized>(&self, orthogonal_to: &[&V], rng: &mut R) -> Option<V>;
}

/// A dense state stored as an `n x 1` `faer` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseVector(Mat<c64>);

impl DenseVector {
    /// Wraps a column matrix. Panics if `column` has more than one column.
    pub fn from_column(column: Mat<c64>) -> Self {
        assert_eq!(
            column.ncols(),
            1,
            "A dense state must be a single column, got {} columns.",
            column.ncols()
        );
        Self(column)
    }

    /// Builds a vector of dimension `n` from a function of the index.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize) -> c64) -> Self {
        Self(Mat::from_fn(n, 1, |i, _| f(i)))
    }

    /// The canonical basis vector `e_index` of dimension `n`.
    pub fn basis(n: usize, index: usize) -> Self {
        Self::from_fn(n, |i| {
            if i == index {
                c64::new(1.0, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        })
    }

    /// Dimension of the vector.
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    /// Coefficient at position `i`.
    pub fn get(&self, i: usize) -> c64 {
        self.0[(i, 0)]
    }

    /// A view of the underlying column.
    pub fn as_mat(&self) -> MatRef<'_, c64> {
        self.0.as_ref()
    }

    pub fn into_mat(self) -> Mat<c64> {
        self.0
    }
}

impl StateVector for DenseVector {
    fn dot(&self, other: &Self) -> c64 {
        assert_eq!(
            self.len(),
            other.len(),
            "Dimension mismatch in inner product: {} vs {}.",
            self.len(),
            other.len()
        );
        (0..self.len()).fold(c64::new(0.0, 0.0), |acc, i| {
            acc + self.0[(i, 0)].conj() * other.0[(i, 0)]
        })
    }

    fn scale(&self, alpha: c64) -> Self {
        Self(Mat::from_fn(self.len(), 1, |i, _| self.0[(i, 0)] * alpha))
    }

    fn add_scaled(&self, alpha: c64, other: &Self) -> Self {
        assert_eq!(
            self.len(),
            other.len(),
            "Dimension mismatch in linear combination: {} vs {}.",
            self.len(),
            other.len()
        );
        Self(Mat::from_fn(self.len(), 1, |i, _| {
            self.0[(i, 0)] + alpha * other.0[(i, 0)]
        }))
    }

    fn to_dense(&self) -> Option<Mat<c64>> {
        Some(self.0.clone())
    }
}

/// The space `C^dim` of dense vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DenseSpace {
    pub dim: usize,
}

/// Random candidates drawn before giving up on finding an orthogonal direction.
const RANDOM_ATTEMPTS: usize = 4;

impl DenseSpace {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl VectorSpace<DenseVector> for DenseSpace {
    fn random_vector<R: Rng + ?Sized>(
        &self,
        orthogonal_to: &[&DenseVector],
        rng: &mut R,
    ) -> Option<DenseVector> {
        if orthogonal_to.len() >= self.dim {
            return None;
        }
        for _ in 0..RANDOM_ATTEMPTS {
            let candidate = DenseVector::from_fn(self.dim, |_| {
                c64::new(rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5)
            });
            if let Some(v) = orthogonalize_one(&candidate, orthogonal_to.iter().copied()) {
                return Some(v.normalize());
            }
        }
        None
    }
}
