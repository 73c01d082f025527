//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, so an
//! observer can be written once and used with any solver whose types
//! implement them.
//!
//! # Example
//!
//! ```rust
//! use natgrad_core::Observer;
//! use natgrad_observers::traits::{CanStopEarly, HasIteration};
//!
//! /// Stops after a fixed number of iterations.
//! struct Budget(usize);
//!
//! impl<E: HasIteration, A: CanStopEarly> Observer<E, A> for Budget {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.iteration() >= self.0).then(A::stop_early)
//!     }
//! }
//! ```

use natgrad_solvers::linear::conjugate_gradient;

/// An event that carries a residual norm.
pub trait HasResidual {
    /// Returns the residual norm for this event.
    fn residual(&self) -> f64;
}

/// An event that knows which iteration produced it.
pub trait HasIteration {
    /// Returns the iteration number, starting at 1.
    fn iteration(&self) -> usize;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl HasResidual for conjugate_gradient::Event<'_> {
    fn residual(&self) -> f64 {
        self.residual_sq.sqrt()
    }
}

impl HasIteration for conjugate_gradient::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

impl CanStopEarly for conjugate_gradient::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
