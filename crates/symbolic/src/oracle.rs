use ndarray::{ArrayD, Dimension, IxDyn};

use natgrad_core::{GradientOracle, ParameterVector, Tensor};

use crate::{
    SymbolicError, backward,
    expr::{Evaluator, Expr, Var},
};

/// A tensor of symbolic expressions.
pub type ExprTensor = ArrayD<Expr>;

/// Gradient oracle backed by symbolic reverse-mode differentiation.
///
/// Objectives are written against the tensors returned by
/// [`variables`](Self::variables). A parameter whose elements never appear in
/// an output gets a `None` gradient; a parameter with at least one reachable
/// element gets a full tensor with zeros for the unreached elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicOracle;

impl SymbolicOracle {
    /// Creates a new oracle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns one symbolic tensor per parameter, shaped like the parameter.
    #[must_use]
    pub fn variables(&self, params: &ParameterVector) -> Vec<ExprTensor> {
        params
            .iter()
            .enumerate()
            .map(|(param, p)| {
                let shape = p.shape();
                ArrayD::from_shape_fn(IxDyn(shape), |idx| {
                    Expr::var(Var {
                        param,
                        index: flat_index(&idx, shape),
                    })
                })
            })
            .collect()
    }

    /// Lifts a plain tensor into constant expressions.
    #[must_use]
    pub fn constants(&self, tensor: &Tensor) -> ExprTensor {
        tensor.map(|&x| Expr::constant(x))
    }
}

impl GradientOracle for SymbolicOracle {
    type Scalar = Expr;
    type Tensor = ExprTensor;
    type Error = SymbolicError;

    fn gradient(
        &self,
        output: &Expr,
        params: &ParameterVector,
    ) -> Result<Vec<Option<ExprTensor>>, SymbolicError> {
        let adjoints = backward::adjoints(output);

        if let Some(var) = adjoints.keys().find(|var| {
            params
                .value(var.param)
                .is_none_or(|value| var.index >= value.len())
        }) {
            return Err(SymbolicError::UnboundVariable {
                param: var.param,
                index: var.index,
            });
        }

        let gradients = params
            .iter()
            .enumerate()
            .map(|(param, p)| {
                let first = Var { param, index: 0 };
                let last = Var {
                    param,
                    index: usize::MAX,
                };
                if adjoints.range(first..=last).next().is_none() {
                    return None;
                }

                let shape = p.shape();
                Some(ArrayD::from_shape_fn(IxDyn(shape), |idx| {
                    let var = Var {
                        param,
                        index: flat_index(&idx, shape),
                    };
                    adjoints
                        .get(&var)
                        .cloned()
                        .unwrap_or_else(|| Expr::constant(0.0))
                }))
            })
            .collect();

        Ok(gradients)
    }

    fn inner(&self, direction: &Tensor, tensor: &ExprTensor) -> Result<Expr, SymbolicError> {
        if direction.shape() != tensor.shape() {
            return Err(SymbolicError::Shape {
                expected: tensor.shape().to_vec(),
                found: direction.shape().to_vec(),
            });
        }

        Ok(Expr::sum(
            direction
                .iter()
                .zip(tensor.iter())
                .map(|(&d, t)| Expr::times(&Expr::constant(d), t)),
        ))
    }

    fn sum(&self, terms: Vec<Expr>) -> Expr {
        Expr::sum(terms)
    }

    fn value(&self, tensor: &ExprTensor, params: &ParameterVector) -> Result<Tensor, SymbolicError> {
        let mut evaluator = Evaluator::new(params);
        let values = tensor
            .iter()
            .map(|expr| evaluator.eval(expr))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Tensor::from_shape_vec(tensor.raw_dim(), values)?)
    }

    fn scalar_value(&self, scalar: &Expr, params: &ParameterVector) -> Result<f64, SymbolicError> {
        scalar.eval(params)
    }
}

/// Row-major position of a multi-index within `shape`.
fn flat_index(idx: &IxDyn, shape: &[usize]) -> usize {
    idx.slice()
        .iter()
        .zip(shape)
        .fold(0, |acc, (&i, &n)| acc * n + i)
}
