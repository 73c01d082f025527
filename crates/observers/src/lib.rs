//! Reusable observers for natgrad solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across solvers.
//!
//! # Modules
//!
//! - [`traits`]: capability traits for cross-solver observers
//!   ([`HasResidual`], [`HasIteration`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`ResidualTolerance`]: stops a solver once the residual is small enough
//! - [`History`]: records `(iteration, residual)` pairs
//! - [`TracingObserver`]: emits each event as a `tracing` event
//!
//! [`Observer`]: natgrad_core::Observer
//! [`HasResidual`]: traits::HasResidual
//! [`HasIteration`]: traits::HasIteration
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod history;
mod log;
mod tolerance;

pub use history::History;
pub use log::TracingObserver;
pub use tolerance::ResidualTolerance;
