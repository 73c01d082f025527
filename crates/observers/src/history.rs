use natgrad_core::Observer;

use crate::traits::{HasIteration, HasResidual};

/// Records the residual after each iteration.
///
/// Never acts. Pass `&mut history` to a solver to keep the record afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    points: Vec<(usize, f64)>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded `(iteration, residual)` pairs in order.
    #[must_use]
    pub fn points(&self) -> &[(usize, f64)] {
        &self.points
    }

    /// Returns the last recorded residual.
    #[must_use]
    pub fn last_residual(&self) -> Option<f64> {
        self.points.last().map(|&(_, residual)| residual)
    }

    /// Returns true if every recorded residual is no larger than the one before.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.points.windows(2).all(|pair| pair[1].1 <= pair[0].1)
    }
}

impl<E, A> Observer<E, A> for History
where
    E: HasResidual + HasIteration,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self.points.push((event.iteration(), event.residual()));
        None
    }
}

impl<E, A> Observer<E, A> for &mut History
where
    E: HasResidual + HasIteration,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        Observer::<E, A>::observe(&mut **self, event)
    }
}
