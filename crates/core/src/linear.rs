use thiserror::Error;

use crate::Direction;

/// A linear map known only through its action on a [`Direction`].
pub trait LinearOperator {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies the operator to `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be computed.
    fn apply(&self, x: &Direction) -> Result<Direction, Self::Error>;
}

/// Errors returned by a [`LinearSolver`].
///
/// Operator failures keep their own type so a caller that built the operator
/// can recover its errors unchanged.
#[derive(Debug, Error)]
pub enum SolveError<OE, SE> {
    /// The operator failed while being applied.
    #[error("operator failed")]
    Operator(#[source] OE),

    /// The solver itself failed.
    #[error("solver failed")]
    Solver(#[source] SE),
}

/// Solves `A x = b` for an implicit operator `A`.
///
/// Solver settings are fixed when the solver is constructed.
pub trait LinearSolver {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns an approximate solution of `operator(x) = b`.
    ///
    /// Starts from `x_init`, or from zeros when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Operator`] if the operator fails, or
    /// [`SolveError::Solver`] if the solver cannot proceed.
    fn solve<A>(
        &self,
        operator: &A,
        b: &Direction,
        x_init: Option<&Direction>,
    ) -> Result<Direction, SolveError<A::Error, Self::Error>>
    where
        A: LinearOperator;
}

/// Closures act as linear operators.
impl<E, F> LinearOperator for F
where
    F: Fn(&Direction) -> Result<Direction, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn apply(&self, x: &Direction) -> Result<Direction, Self::Error> {
        self(x)
    }
}
