use natgrad_core::{Direction, GradientOracle, LinearOperator, ParameterVector};
use tracing::trace;

use super::{
    Error, ObjectiveKind,
    pass::{differentiate, disconnected, evaluate, oracle_error},
};

/// The action of the divergence's curvature on a direction, computed by two
/// nested differentiation passes.
///
/// The first pass, `g = ∂D/∂θ`, does not depend on the direction. It runs once
/// in [`new`](Self::new), so a divergence that depends on no parameter is
/// rejected before any product is taken. Each call to
/// [`apply`](LinearOperator::apply) then differentiates `Σ vᵢ · gᵢ` a second
/// time.
///
/// The operator borrows the parameters, so they cannot change while it exists.
pub struct FisherVectorProduct<'a, O: GradientOracle> {
    oracle: &'a O,
    params: &'a ParameterVector,
    gradient: Vec<Option<O::Tensor>>,
    disconnected: Vec<bool>,
}

impl<'a, O: GradientOracle> FisherVectorProduct<'a, O> {
    /// Runs the first differentiation pass of `divergence`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateGradient`] if the divergence depends on none
    /// of the parameters, or an oracle or shape error from the pass.
    pub fn new(
        oracle: &'a O,
        params: &'a ParameterVector,
        divergence: &O::Scalar,
    ) -> Result<Self, Error> {
        let gradient = differentiate(oracle, divergence, params)?;
        let disconnected = disconnected(&gradient);

        if disconnected.iter().all(|&d| d) {
            return Err(Error::DegenerateGradient {
                objective: ObjectiveKind::Divergence,
                parameters: params.len(),
            });
        }

        Ok(Self {
            oracle,
            params,
            gradient,
            disconnected,
        })
    }

    /// Returns which parameters the divergence does not depend on.
    #[must_use]
    pub fn disconnected(&self) -> &[bool] {
        &self.disconnected
    }

    fn product(&self, direction: &Direction) -> Result<Direction, Error> {
        direction.check_matches(self.params)?;

        let terms = self
            .gradient
            .iter()
            .zip(direction.iter())
            .filter_map(|(component, d)| component.as_ref().map(|g| (d, g)))
            .map(|(d, g)| self.oracle.inner(d, g).map_err(oracle_error))
            .collect::<Result<Vec<_>, _>>()?;
        let contraction = self.oracle.sum(terms);

        let second = differentiate(self.oracle, &contraction, self.params)?;
        let second_disconnected = disconnected(&second);
        if second_disconnected != self.disconnected {
            let count = |mask: &[bool]| mask.iter().filter(|&&d| d).count();
            return Err(Error::GradientInconsistency {
                first_pass: count(&self.disconnected),
                second_pass: count(&second_disconnected),
            });
        }

        let product = evaluate(self.oracle, &second, self.params)?;
        trace!(norm_squared = product.norm_squared(), "fisher-vector product");
        Ok(product)
    }
}

impl<O: GradientOracle> LinearOperator for FisherVectorProduct<'_, O> {
    type Error = Error;

    fn apply(&self, x: &Direction) -> Result<Direction, Error> {
        self.product(x)
    }
}
