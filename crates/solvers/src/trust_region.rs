//! Trust-region parameter updates.
//!
//! A trust-region step minimizes a local model of the loss subject to a bound
//! on how far the update may move the parameterized distribution, measured by
//! a divergence.
//!
//! # Solvers
//!
//! - [`natural_gradient`]: conjugate-gradient natural gradient step with an
//!   exact divergence-radius rescaling

pub mod natural_gradient;
