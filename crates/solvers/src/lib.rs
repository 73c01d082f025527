//! Solvers for trust-region natural gradient steps.
//!
//! - [`linear`] solves matrix-free linear systems `A x = b`
//! - [`trust_region`] builds parameter updates constrained by a divergence
//!   radius

pub mod linear;
pub mod trust_region;
