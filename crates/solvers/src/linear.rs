//! Solvers for linear systems given only the action of the operator.
//!
//! A [`LinearOperator`] maps a [`Direction`] to a same-shaped direction. Solvers
//! in this module never form the operator as a matrix; they only call it on
//! vectors.
//!
//! # Solvers
//!
//! - [`conjugate_gradient`]: Krylov iteration for symmetric positive-definite
//!   operators, with optional Tikhonov damping
//!
//! [`LinearOperator`]: natgrad_core::LinearOperator
//! [`Direction`]: natgrad_core::Direction

pub mod conjugate_gradient;
