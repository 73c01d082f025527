use serde::{Deserialize, Serialize};

use crate::linear::conjugate_gradient;

use super::{Config, ConfigError};

/// Natural gradient settings as they appear in configuration files.
///
/// Convert to a validated [`Config`] with `Config::try_from`.
///
/// ```toml
/// trust_region_radius = 0.01
/// cg_max_iterations = 20
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub trust_region_radius: f64,

    #[serde(default = "default_max_iterations")]
    pub cg_max_iterations: i64,

    #[serde(default = "default_damping")]
    pub cg_damping: f64,

    #[serde(default)]
    pub cg_unroll: bool,

    #[serde(default = "default_residual_tol")]
    pub cg_residual_tol: f64,
}

fn default_max_iterations() -> i64 {
    10
}

fn default_damping() -> f64 {
    conjugate_gradient::Config::default().damping()
}

fn default_residual_tol() -> f64 {
    conjugate_gradient::Config::default().residual_tol()
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let max_iters = usize::try_from(settings.cg_max_iterations).map_err(|_| {
            ConfigError::MaxIterations {
                value: settings.cg_max_iterations,
            }
        })?;

        let solver = conjugate_gradient::Config::new(
            max_iters,
            settings.cg_damping,
            settings.cg_unroll,
            settings.cg_residual_tol,
        )?;

        Config::new(settings.trust_region_radius, solver)
    }
}

impl From<Config> for Settings {
    fn from(config: Config) -> Self {
        let solver = config.solver();
        Self {
            trust_region_radius: config.radius(),
            cg_max_iterations: i64::try_from(solver.max_iters()).unwrap_or(i64::MAX),
            cg_damping: solver.damping(),
            cg_unroll: solver.unroll(),
            cg_residual_tol: solver.residual_tol(),
        }
    }
}
