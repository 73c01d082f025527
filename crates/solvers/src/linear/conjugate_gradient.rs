//! Conjugate gradient for matrix-free linear systems.
//!
//! # Algorithm
//!
//! Solves `(A + d·I) x = b` for a symmetric operator `A` and damping `d`,
//! starting from `x_init` or zero. Each iteration applies the operator once
//! and moves `x` along a search direction conjugate to all previous ones.
//! In exact arithmetic an `n`-dimensional positive-definite system is solved
//! in at most `n` iterations.
//!
//! # Stopping
//!
//! The solver stops with
//!
//! - [`Status::Converged`] once `‖r‖²` drops below the residual tolerance,
//! - [`Status::Breakdown`] when the curvature `pᵀ(A + d·I)p` along the search
//!   direction is zero or not finite,
//! - [`Status::StoppedByObserver`] when an observer returns [`Action::StopEarly`],
//! - [`Status::MaxIters`] otherwise.
//!
//! Negative curvature is not treated as a breakdown. On an indefinite operator
//! the iteration keeps going and the returned `x` may have `xᵀAx < 0`; callers
//! that need positive curvature check for it themselves.
//!
//! Running out of iterations is not an error. The best `x` so far is returned
//! in the [`Solution`].
//!
//! # Unrolling
//!
//! With [`Config::unroll`] set, the loop always makes `max_iters` trips and
//! trips after a stop do nothing. Without it the loop exits at the stop. The
//! two modes produce identical results.
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] after each completed iteration. No event is
//! emitted for an iteration that breaks down.

mod action;
mod config;
mod error;
mod event;
mod iterate;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use natgrad_core::{Direction, LinearOperator, LinearSolver, Observer, SolveError};

use iterate::iterate;

/// Solves `(A + d·I) x = b` with conjugate gradient.
///
/// The observer receives an [`Event`] after each completed iteration.
///
/// # Errors
///
/// Returns an error if `b` and `x_init` differ in shape, if the operator
/// returns a differently shaped direction, or if the operator fails.
pub fn solve<A, Obs>(
    operator: &A,
    b: &Direction,
    x_init: Option<&Direction>,
    config: &Config,
    observer: Obs,
) -> Result<Solution, Error>
where
    A: LinearOperator,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    iterate(operator, b, x_init, config, observer).map_err(|error| match error {
        SolveError::Operator(e) => Error::Operator(Box::new(e)),
        SolveError::Solver(e) => e,
    })
}

/// Solves `(A + d·I) x = b` without observer support.
///
/// # Errors
///
/// Returns an error if `b` and `x_init` differ in shape, if the operator
/// returns a differently shaped direction, or if the operator fails.
pub fn solve_unobserved<A>(
    operator: &A,
    b: &Direction,
    x_init: Option<&Direction>,
    config: &Config,
) -> Result<Solution, Error>
where
    A: LinearOperator,
{
    solve(operator, b, x_init, config, ())
}

/// A [`LinearSolver`] that runs conjugate gradient with a fixed [`Config`].
///
/// Operator failures are passed back to the caller unchanged as
/// [`SolveError::Operator`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConjugateGradient {
    config: Config,
}

impl ConjugateGradient {
    /// Creates a solver with the given config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the solver config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl LinearSolver for ConjugateGradient {
    type Error = Error;

    fn solve<A>(
        &self,
        operator: &A,
        b: &Direction,
        x_init: Option<&Direction>,
    ) -> Result<Direction, SolveError<A::Error, Self::Error>>
    where
        A: LinearOperator,
    {
        iterate(operator, b, x_init, &self.config, ()).map(|solution| solution.x)
    }
}
