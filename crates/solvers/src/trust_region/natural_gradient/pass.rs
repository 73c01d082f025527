use natgrad_core::{Direction, GradientOracle, ParameterVector, ShapeError, Tensor};

use super::Error;

/// Runs one differentiation pass, keeping disconnected components as `None`.
pub(super) fn differentiate<O: GradientOracle>(
    oracle: &O,
    output: &O::Scalar,
    params: &ParameterVector,
) -> Result<Vec<Option<O::Tensor>>, Error> {
    let gradient = oracle.gradient(output, params).map_err(oracle_error)?;
    if gradient.len() != params.len() {
        return Err(ShapeError::Length {
            expected: params.len(),
            found: gradient.len(),
        }
        .into());
    }
    Ok(gradient)
}

/// Evaluates a pass to plain values, with zeros for disconnected components.
pub(super) fn evaluate<O: GradientOracle>(
    oracle: &O,
    gradient: &[Option<O::Tensor>],
    params: &ParameterVector,
) -> Result<Direction, Error> {
    let tensors = gradient
        .iter()
        .zip(params.iter())
        .map(|(component, param)| match component {
            Some(tensor) => oracle.value(tensor, params).map_err(oracle_error),
            None => Ok(Tensor::zeros(param.shape())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let direction = Direction::new(tensors);
    direction.check_matches(params)?;
    Ok(direction)
}

/// Marks the components a pass reported as disconnected.
pub(super) fn disconnected<T>(gradient: &[Option<T>]) -> Vec<bool> {
    gradient.iter().map(Option::is_none).collect()
}

pub(super) fn oracle_error<E>(error: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::Oracle(Box::new(error))
}
