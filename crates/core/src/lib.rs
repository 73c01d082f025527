//! Core traits and types for trust-region natural gradient steps.
//!
//! This crate defines the shared abstractions that the solvers, observers,
//! and gradient backends build on:
//!
//! - [`ParameterVector`]: ordered, named parameter tensors being optimized
//! - [`Direction`]: a candidate or final update shaped like a [`ParameterVector`]
//! - [`EvaluationInputs`] / [`FrozenInputs`]: named inputs and their
//!   non-differentiable snapshot
//! - [`GradientOracle`]: reverse-mode differentiation that can differentiate
//!   its own output a second time
//! - [`Objective`]: a loss or divergence evaluated on frozen inputs
//! - [`LinearOperator`] / [`LinearSolver`]: matrix-free linear systems
//! - [`ParameterSchedule`]: the scalar trust-region radius
//! - [`StepApplier`]: commits an update to parameter storage
//! - [`Observer`]: receives solver events and optionally returns control actions

mod apply;
mod direction;
mod inputs;
mod linear;
mod objective;
mod observer;
mod oracle;
mod parameters;
mod schedule;
mod shape;

pub use apply::{AddDelta, Commit, StepApplier};
pub use direction::Direction;
pub use inputs::{EvaluationInputs, FrozenInputs};
pub use linear::{LinearOperator, LinearSolver, SolveError};
pub use objective::Objective;
pub use observer::Observer;
pub use oracle::GradientOracle;
pub use parameters::{Parameter, ParameterError, ParameterVector};
pub use schedule::ParameterSchedule;
pub use shape::ShapeError;

/// Plain numeric tensor used for parameters, directions, and inputs.
pub type Tensor = ndarray::ArrayD<f64>;
