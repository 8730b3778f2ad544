//! Gram–Schmidt orthogonalization against an existing basis.
//!
//! Both routines are pure: they return new vectors and leave their inputs untouched.
//! The projection loop is run twice ("twice is enough"), which keeps the Krylov basis
//! orthonormal to working precision even after many restarts.

use super::RESIDUAL_TOLERANCE;
use crate::state::StateVector;

/// Orthogonalizes `v` against every vector of `basis`, in order.
///
/// The basis vectors are assumed to be normalized. Returns `None` when the residual is
/// numerically zero relative to the norm of `v`; the caller then has to substitute a
/// random direction orthogonal to the basis.
pub fn orthogonalize_one<'a, V, I>(v: &V, basis: I) -> Option<V>
where
    V: StateVector + 'a,
    I: IntoIterator<Item = &'a V>,
    I::IntoIter: Clone,
{
    let input_norm = v.norm();
    if input_norm == 0.0 {
        return None;
    }

    let basis = basis.into_iter();
    let mut residual = v.clone();
    for _ in 0..2 {
        for b in basis.clone() {
            let projection = b.dot(&residual);
            residual = residual.add_scaled(-projection, b);
        }
    }

    if residual.norm() < RESIDUAL_TOLERANCE * input_norm {
        None
    } else {
        Some(residual)
    }
}

/// Builds an orthonormal basis from `vectors`, left to right.
///
/// Vectors that reduce to zero against the ones already accepted are dropped.
pub fn orthogonalize_all<V: StateVector>(vectors: &[V]) -> Vec<V> {
    let mut basis: Vec<V> = Vec::with_capacity(vectors.len());
    for v in vectors {
        if let Some(w) = orthogonalize_one(v, basis.iter()) {
            basis.push(w.normalize());
        }
    }
    basis
}
