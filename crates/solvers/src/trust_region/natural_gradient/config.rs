use thiserror::Error;

use crate::linear::conjugate_gradient;

/// Configuration for a natural gradient step with a constant radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    radius: f64,
    solver: conjugate_gradient::Config,
}

/// Errors that can occur when validating a natural gradient config.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("trust-region radius must be finite and positive, got {value}")]
    Radius { value: f64 },

    #[error("conjugate gradient iterations must be non-negative, got {value}")]
    MaxIterations { value: i64 },

    #[error("invalid conjugate gradient config: {0}")]
    Solver(#[from] conjugate_gradient::ConfigError),
}

impl Config {
    /// Creates a new config with a validated radius.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Radius`] if `radius` is not finite and positive.
    pub fn new(radius: f64, solver: conjugate_gradient::Config) -> Result<Self, ConfigError> {
        check_radius(radius)?;
        Ok(Self { radius, solver })
    }

    /// Returns the trust-region radius `ε`.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the conjugate gradient config.
    #[must_use]
    pub fn solver(&self) -> &conjugate_gradient::Config {
        &self.solver
    }
}

pub(super) fn check_radius(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Radius { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn accepts_positive_radius() {
        let config = Config::new(0.01, conjugate_gradient::Config::default()).unwrap();
        assert_eq!(config.radius(), 0.01);
        assert_eq!(config.solver().max_iters(), 10);
    }

    #[test]
    fn rejects_bad_radius() {
        for value in [0.0, -1.0, f64::INFINITY] {
            assert_eq!(
                Config::new(value, conjugate_gradient::Config::default()),
                Err(ConfigError::Radius { value })
            );
        }
        assert!(matches!(
            Config::new(f64::NAN, conjugate_gradient::Config::default()),
            Err(ConfigError::Radius { .. })
        ));
    }
}
