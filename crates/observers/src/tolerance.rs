use natgrad_core::Observer;

use crate::traits::{CanStopEarly, HasIteration, HasResidual};

/// Stops a solver once the residual falls below a tolerance.
///
/// The check is skipped until `min_iters` iterations have completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualTolerance {
    tolerance: f64,
    min_iters: usize,
}

impl ResidualTolerance {
    /// Creates an observer that stops once `residual < tolerance`.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            min_iters: 0,
        }
    }

    /// Requires at least `min_iters` iterations before stopping.
    #[must_use]
    pub fn min_iters(mut self, min_iters: usize) -> Self {
        self.min_iters = min_iters;
        self
    }
}

impl<E, A> Observer<E, A> for ResidualTolerance
where
    E: HasResidual + HasIteration,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.iteration() >= self.min_iters && event.residual() < self.tolerance)
            .then(A::stop_early)
    }
}
