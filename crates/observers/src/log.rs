use natgrad_core::Observer;
use tracing::debug;

use crate::traits::{HasIteration, HasResidual};

/// Emits each solver event as a `tracing` debug event.
///
/// The `solver` label is attached to every event so output from nested
/// solvers can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingObserver {
    solver: &'static str,
}

impl TracingObserver {
    /// Creates an observer that labels its events with `solver`.
    #[must_use]
    pub fn new(solver: &'static str) -> Self {
        Self { solver }
    }

    /// Returns the label.
    #[must_use]
    pub fn solver(&self) -> &'static str {
        self.solver
    }
}

impl<E, A> Observer<E, A> for TracingObserver
where
    E: HasResidual + HasIteration,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        debug!(
            solver = self.solver,
            iter = event.iteration(),
            residual = event.residual(),
            "solver iteration"
        );
        None
    }
}
