use thiserror::Error;

/// Configuration for the conjugate gradient solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    damping: f64,
    unroll: bool,
    residual_tol: f64,
}

/// Errors that can occur when validating a conjugate gradient config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("damping must be in [0, 1]")]
    Damping,

    #[error("residual_tol must be finite and non-negative")]
    ResidualTol,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 10,
            damping: 1e-3,
            unroll: false,
            residual_tol: 1e-6,
        }
    }
}

impl Config {
    /// Creates a new config with validated damping and tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `damping` is outside `[0, 1]` (or NaN), or if
    /// `residual_tol` is negative or non-finite.
    pub fn new(
        max_iters: usize,
        damping: f64,
        unroll: bool,
        residual_tol: f64,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&damping) {
            return Err(ConfigError::Damping);
        }
        if !residual_tol.is_finite() || residual_tol < 0.0 {
            return Err(ConfigError::ResidualTol);
        }

        Ok(Self {
            max_iters,
            damping,
            unroll,
            residual_tol,
        })
    }

    /// Returns the maximum number of iterations.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the damping added to the operator's diagonal.
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Returns true if the loop always makes `max_iters` trips.
    #[must_use]
    pub fn unroll(&self) -> bool {
        self.unroll
    }

    /// Returns the squared-residual threshold for convergence.
    #[must_use]
    pub fn residual_tol(&self) -> f64 {
        self.residual_tol
    }
}
