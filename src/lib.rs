//! Restarted Arnoldi eigensolver and dynamical correlators for matrix-free operators.
//!
//! This crate computes selected eigenpairs of large linear operators (typically
//! quantum Hamiltonians) and derives frequency-resolved response functions from them.
//! The algorithms only apply operators to vectors and take inner products, so the same
//! code runs on explicit dense or sparse matrices and on any external representation
//! that implements the [`state::StateVector`], [`state::VectorSpace`] and
//! [`matrix::LinearOperator`] traits.
//!
//! Dense and sparse reference implementations are built on the [`faer`] linear algebra
//! framework.
//!
//! ## Eigensolver
//!
//! **Restarted Arnoldi** ([`solve_extremal`]): a power-method warm start seeds a Krylov
//! basis, the Hamiltonian is projected on it and the projected problem is diagonalized
//! with a general (non-Hermitian) eigensolver. Eigenpairs are picked by a
//! [`SelectionPolicy`]: ground state, largest magnitude, shift-and-invert around a
//! target, smallest magnitude, smallest imaginary part or most-real ground state. The
//! selected vectors seed the next restart, and the size of the next Krylov space grows
//! with the remaining energy uncertainty `sqrt(<H^2> - <H>^2)`.
//!
//! Convenience wrappers cover the common cases: [`lowest_energy`],
//! [`lowest_energy_non_hermitian`], [`most_positive_energy`] and
//! [`most_negative_energy`].
//!
//! ## Dynamical correlators
//!
//! [`solve_dynamical_correlator`] evaluates `<ref| A delta(w - (H - E_ref)) B |ref>`
//! with a Lorentzian broadening, using one of three backends: the kernel polynomial
//! method, an exact Lehmann sum, or the correction-vector method.
//!
//! ## Example Usage
//!
//! The ground state of a two-site antiferromagnetic Heisenberg chain is a singlet at
//! energy `-3/4`. Its spin structure factor has a single peak at the singlet-triplet
//! gap `w = 1`.
//!
//! ```rust
//! use arnoldi_spectra::{
//!     ArnoldiOptions, CorrelatorBackend, CorrelatorOptions, lowest_energy,
//!     solve_dynamical_correlator,
//!     state::DenseSpace,
//!     utils::chains::{SpinComponent, heisenberg_chain, local_spin_operator},
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let h = heisenberg_chain(2, 1.0).unwrap();
//! let sz = local_spin_operator(2, 0, SpinComponent::Z).unwrap();
//! let space = DenseSpace::new(4);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let options = ArnoldiOptions {
//!     min_krylov: Some(3),
//!     ..Default::default()
//! };
//! let ground = lowest_energy(&h, &space, 1, &options, &mut rng).unwrap();
//! let e0 = ground.pairs[0].energy.re;
//! assert!((e0 + 0.75).abs() < 1e-8);
//!
//! let correlator = CorrelatorOptions {
//!     backend: CorrelatorBackend::ExactDiagonalization,
//!     broadening: 0.1,
//!     ..Default::default()
//! };
//! let frequencies = [0.0, 1.0, 2.0];
//! let spectrum = solve_dynamical_correlator(
//!     &h, &sz, &sz, &ground.pairs[0].vector, e0, &frequencies, &correlator, &space, &mut rng,
//! )
//! .unwrap();
//! assert!(spectrum.values[1].re > spectrum.values[0].re);
//! assert!(spectrum.values[1].re > spectrum.values[2].re);
//! ```

// Declare the modules that form the crate's API structure.
pub mod algorithms;
pub mod correlator;
pub mod error;
pub mod matrix;
pub mod solvers;
pub mod state;
pub mod utils;

// Re-export the main API for convenient access.
pub use algorithms::{
    arnoldi::{ArnoldiOptions, ArnoldiOutput, Convergence},
    selection::{EigenPair, SelectionPolicy},
};
pub use correlator::{CorrelatorBackend, CorrelatorOptions, FrequencyGrid, Spectrum};
pub use error::{SpectralError, SpectralErrorKind};
pub use solvers::{
    RescaledOptions, lowest_energy, lowest_energy_non_hermitian, most_negative_energy,
    most_positive_energy, solve_dynamical_correlator, solve_extremal,
};
