//! A state-independent diagonal Gaussian policy over symbolic parameters.
//!
//! The policy has two parameters, `mean` and `log_std`, each of shape `[dim]`.
//! Its objectives read these inputs:
//!
//! | name           | shape       | meaning                                   |
//! |----------------|-------------|-------------------------------------------|
//! | `actions`      | `[n, dim]`  | sampled actions                           |
//! | `advantages`   | `[n]`       | advantage estimate per sample             |
//! | `old_log_prob` | `[n]`       | log-probability under the sampling policy |
//! | `old_mean`     | `[dim]`     | sampling policy mean                      |
//! | `old_log_std`  | `[dim]`     | sampling policy log standard deviation    |

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

use natgrad_core::{EvaluationInputs, FrozenInputs, ParameterError, ParameterVector, Tensor};
use natgrad_symbolic::{Expr, SymbolicOracle};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("input {name} has shape {found:?}")]
    InputShape {
        name: &'static str,
        found: Vec<usize>,
    },
}

/// Symbolic handles to a diagonal Gaussian policy's parameters.
#[derive(Debug, Clone)]
pub struct GaussianPolicy {
    mean: Vec<Expr>,
    log_std: Vec<Expr>,
}

impl GaussianPolicy {
    /// Builds the parameter vector `[mean, log_std]`.
    ///
    /// # Errors
    ///
    /// Never fails for these two names; the result type follows
    /// [`ParameterVector::new`].
    pub fn parameters(mean: &[f64], log_std: &[f64]) -> Result<ParameterVector, ParameterError> {
        ParameterVector::new([
            ("mean", Array1::from(mean.to_vec()).into_dyn()),
            ("log_std", Array1::from(log_std.to_vec()).into_dyn()),
        ])
    }

    /// Creates symbolic handles for parameters built by [`parameters`](Self::parameters).
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingInput`] if `params` has no `mean` or
    /// `log_std` entry.
    pub fn new(params: &ParameterVector) -> Result<Self, PolicyError> {
        let vars = SymbolicOracle::new().variables(params);
        let handles = |name: &'static str| {
            params
                .iter()
                .position(|p| p.name() == name)
                .map(|index| vars[index].iter().cloned().collect::<Vec<_>>())
                .ok_or(PolicyError::MissingInput(name))
        };
        Ok(Self {
            mean: handles("mean")?,
            log_std: handles("log_std")?,
        })
    }

    /// Returns the action dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Symbolic log-density of `action`.
    #[must_use]
    pub fn log_prob(&self, action: ArrayView1<'_, f64>) -> Expr {
        Expr::sum(
            self.mean
                .iter()
                .zip(&self.log_std)
                .zip(action)
                .map(|((mean, log_std), &a)| {
                    let precision = (-2.0 * log_std).exp();
                    -0.5 * (a - mean).square() * precision - log_std - 0.5 * (2.0 * PI).ln()
                }),
        )
    }

    /// Surrogate loss `−mean_i[exp(log π(a_i) − old_log_prob_i) · advantage_i]`.
    ///
    /// The ratio is one at the sampling parameters, so the loss gradient there
    /// is the policy gradient.
    pub fn surrogate_loss(&self) -> impl Fn(&FrozenInputs) -> Result<Expr, PolicyError> + use<> {
        let policy = self.clone();
        move |inputs: &FrozenInputs| {
            let actions = matrix(inputs, "actions", policy.dim())?;
            let advantages = input(inputs, "advantages")?;
            let old_log_prob = input(inputs, "old_log_prob")?;
            let n = actions.nrows();
            check_len("advantages", advantages, n)?;
            check_len("old_log_prob", old_log_prob, n)?;

            let terms = actions
                .axis_iter(Axis(0))
                .zip(advantages.iter().zip(old_log_prob))
                .map(|(action, (&advantage, &old))| {
                    let ratio = (policy.log_prob(action) - old).exp();
                    ratio * advantage
                });

            Ok(Expr::sum(terms) * (-1.0 / n as f64))
        }
    }

    /// `KL(old ‖ current)` between diagonal Gaussians. Zero at the sampling
    /// parameters.
    pub fn kl_divergence(&self) -> impl Fn(&FrozenInputs) -> Result<Expr, PolicyError> + use<> {
        let policy = self.clone();
        move |inputs: &FrozenInputs| {
            let old_mean = input(inputs, "old_mean")?;
            let old_log_std = input(inputs, "old_log_std")?;
            check_len("old_mean", old_mean, policy.dim())?;
            check_len("old_log_std", old_log_std, policy.dim())?;

            let terms = policy
                .mean
                .iter()
                .zip(&policy.log_std)
                .zip(old_mean.iter().zip(old_log_std))
                .map(|((mean, log_std), (&old_mean, &old_log_std))| {
                    let spread = (2.0 * old_log_std).exp() + (old_mean - mean).square();
                    log_std - old_log_std + 0.5 * spread * (-2.0 * log_std).exp() - 0.5
                });

            Ok(Expr::sum(terms))
        }
    }
}

/// Builds the inputs for one update from sampled actions and advantages,
/// recording the sampling policy from `params`.
///
/// # Errors
///
/// Returns [`PolicyError::MissingInput`] if `params` has no `mean` or
/// `log_std`.
pub fn rollout_inputs(
    params: &ParameterVector,
    actions: &Array2<f64>,
    advantages: &Array1<f64>,
) -> Result<EvaluationInputs, PolicyError> {
    let mean = params.get("mean").ok_or(PolicyError::MissingInput("mean"))?.clone();
    let log_std = params
        .get("log_std")
        .ok_or(PolicyError::MissingInput("log_std"))?
        .clone();

    let old_log_prob: Array1<f64> = actions
        .axis_iter(Axis(0))
        .map(|action| {
            action
                .iter()
                .zip(mean.iter().zip(log_std.iter()))
                .map(|(&a, (&m, &s))| {
                    -0.5 * (a - m).powi(2) * (-2.0 * s).exp() - s - 0.5 * (2.0 * PI).ln()
                })
                .sum()
        })
        .collect();

    let mut inputs = EvaluationInputs::new();
    inputs
        .insert("actions", actions.clone().into_dyn())
        .insert("advantages", advantages.clone().into_dyn())
        .insert("old_log_prob", old_log_prob.into_dyn())
        .insert("old_mean", mean)
        .insert("old_log_std", log_std);
    Ok(inputs)
}

fn input<'a>(inputs: &'a FrozenInputs, name: &'static str) -> Result<&'a Tensor, PolicyError> {
    inputs.get(name).ok_or(PolicyError::MissingInput(name))
}

fn matrix<'a>(
    inputs: &'a FrozenInputs,
    name: &'static str,
    dim: usize,
) -> Result<ndarray::ArrayView2<'a, f64>, PolicyError> {
    let tensor = input(inputs, name)?;
    let shape_error = || PolicyError::InputShape {
        name,
        found: tensor.shape().to_vec(),
    };
    let view = tensor
        .view()
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(|_| shape_error())?;
    if view.ncols() == dim { Ok(view) } else { Err(shape_error()) }
}

fn check_len(name: &'static str, tensor: &Tensor, len: usize) -> Result<(), PolicyError> {
    if tensor.ndim() == 1 && tensor.len() == len {
        Ok(())
    } else {
        Err(PolicyError::InputShape {
            name,
            found: tensor.shape().to_vec(),
        })
    }
}
