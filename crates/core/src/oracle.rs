use crate::{ParameterVector, Tensor};

/// Reverse-mode differentiation of scalars with respect to a [`ParameterVector`].
///
/// A backend exposes two differentiable types: [`Scalar`](Self::Scalar), the
/// output of a loss or divergence, and [`Tensor`](Self::Tensor), a gradient
/// component. Gradient components stay differentiable, so a scalar built from
/// them with [`inner`](Self::inner) and [`sum`](Self::sum) can be passed back
/// to [`gradient`](Self::gradient) for a second pass. This is what lets a
/// curvature-vector product be computed without forming the curvature matrix.
pub trait GradientOracle {
    type Scalar;
    type Tensor;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Differentiates `output` with respect to each parameter, in order.
    ///
    /// Returns one entry per parameter. `None` means `output` has no
    /// structural dependency on that parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if differentiation fails.
    fn gradient(
        &self,
        output: &Self::Scalar,
        params: &ParameterVector,
    ) -> Result<Vec<Option<Self::Tensor>>, Self::Error>;

    /// Returns `Σ direction ⊙ tensor` as a differentiable scalar.
    ///
    /// `direction` is a constant; no derivative flows through it.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the shapes disagree.
    fn inner(&self, direction: &Tensor, tensor: &Self::Tensor) -> Result<Self::Scalar, Self::Error>;

    /// Sums differentiable scalars.
    fn sum(&self, terms: Vec<Self::Scalar>) -> Self::Scalar;

    /// Evaluates a differentiable tensor at the current parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the tensor cannot be evaluated.
    fn value(&self, tensor: &Self::Tensor, params: &ParameterVector) -> Result<Tensor, Self::Error>;

    /// Evaluates a differentiable scalar at the current parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the scalar cannot be evaluated.
    fn scalar_value(
        &self,
        scalar: &Self::Scalar,
        params: &ParameterVector,
    ) -> Result<f64, Self::Error>;
}
