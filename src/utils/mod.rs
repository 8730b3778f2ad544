//! Common utilities shared by the experiment binary and the integration tests.
//!
//! - **`chains`**: assembles spin-1/2 chain Hamiltonians (Heisenberg, transverse-field
//!   Ising) and local spin operators as sparse matrices. These are the test problems on
//!   which the eigensolver and the correlator backends are validated.

pub mod chains;
