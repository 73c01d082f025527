use crate::FrozenInputs;

/// A scalar function of frozen inputs, such as a loss or a divergence.
///
/// `S` is the differentiable scalar type of the
/// [`GradientOracle`](crate::GradientOracle) in use. Parameters enter the
/// result through whatever the implementation captured from the oracle.
///
/// Closures of the form `Fn(&FrozenInputs) -> Result<S, E>` implement this trait.
pub trait Objective<S> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the objective.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be evaluated.
    fn evaluate(&self, inputs: &FrozenInputs) -> Result<S, Self::Error>;
}

/// Blanket implementation for objective closures.
impl<S, E, F> Objective<S> for F
where
    F: Fn(&FrozenInputs) -> Result<S, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn evaluate(&self, inputs: &FrozenInputs) -> Result<S, Self::Error> {
        self(inputs)
    }
}
