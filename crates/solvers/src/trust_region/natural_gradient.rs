//! Trust-region natural gradient step.
//!
//! # Algorithm
//!
//! One step takes a loss `L(θ)` and a divergence `D(θ)` between the current
//! distribution and the one at `θ` (zero at the current parameters), and:
//!
//! 1. freezes the evaluation inputs and evaluates the loss gradient `g`,
//! 2. solves `F x = −g` with conjugate gradient, where `F` is the curvature
//!    of `D` applied through [`FisherVectorProduct`] and never formed,
//! 3. computes the quadratic form `c = ½ xᵀ F x`,
//! 4. if `c > 0`, rescales by `λ = √(c / ε)` and commits `δ = x / λ`, so that
//!    `½ δᵀ F δ = ε` up to rounding; otherwise commits nothing.
//!
//! The second branch is a defined outcome, not an error. [`Outcome`] records
//! which branch was taken.
//!
//! # Fisher-vector products
//!
//! The product `F v` is the gradient of `Σ vᵢ · ∂D/∂θᵢ`, so it costs two
//! nested differentiation passes and requires a [`GradientOracle`] that can
//! differentiate its own output. Components the divergence does not depend on
//! contribute zeros. They must be the same components in both passes,
//! otherwise the product fails with [`Error::GradientInconsistency`].
//!
//! [`GradientOracle`]: natgrad_core::GradientOracle

mod config;
mod decision;
mod error;
mod fisher;
mod outcome;
mod pass;
#[cfg(feature = "serde-derive")]
mod settings;
mod step;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use decision::Decision;
pub use error::{Error, ObjectiveKind};
pub use fisher::FisherVectorProduct;
pub use outcome::Outcome;
#[cfg(feature = "serde-derive")]
pub use settings::Settings;

use natgrad_core::{GradientOracle, LinearSolver, ParameterSchedule, StepApplier};

use crate::linear::conjugate_gradient::ConjugateGradient;

/// A natural gradient stepper with its collaborators fixed at construction.
///
/// - `O`: the [`GradientOracle`] used for every differentiation pass
/// - `S`: the [`LinearSolver`] for `F x = −g`
/// - `P`: the [`ParameterSchedule`] supplying the radius `ε`
/// - `A`: the [`StepApplier`] that commits the update
#[derive(Debug, Clone)]
pub struct NaturalGradient<O, S, P, A> {
    oracle: O,
    solver: S,
    schedule: P,
    applier: A,
}

impl<O, S, P, A> NaturalGradient<O, S, P, A>
where
    O: GradientOracle,
    S: LinearSolver,
    P: ParameterSchedule,
    A: StepApplier,
{
    /// Creates a stepper from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Radius`] if the schedule's current value is not
    /// finite and positive.
    pub fn new(oracle: O, solver: S, schedule: P, applier: A) -> Result<Self, ConfigError> {
        config::check_radius(schedule.value())?;
        Ok(Self {
            oracle,
            solver,
            schedule,
            applier,
        })
    }

    /// Returns the gradient oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Returns the linear solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Returns the radius schedule.
    pub fn schedule(&self) -> &P {
        &self.schedule
    }
}

impl<O, A> NaturalGradient<O, ConjugateGradient, f64, A>
where
    O: GradientOracle,
    A: StepApplier,
{
    /// Creates a stepper with a conjugate gradient solver and a constant radius.
    #[must_use]
    pub fn from_config(oracle: O, applier: A, config: &Config) -> Self {
        Self {
            oracle,
            solver: ConjugateGradient::new(*config.solver()),
            schedule: config.radius(),
            applier,
        }
    }
}
