use std::fmt;

use natgrad_core::ShapeError;

/// Names the objective a gradient was taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    Loss,
    Divergence,
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loss => f.write_str("loss"),
            Self::Divergence => f.write_str("divergence"),
        }
    }
}

/// Errors that can occur during a natural gradient step.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The two differentiation passes of a Fisher-vector product disagree on
    /// which parameters are disconnected.
    #[error(
        "gradient passes disagree on disconnected parameters \
         ({first_pass} in the first pass, {second_pass} in the second)"
    )]
    GradientInconsistency {
        first_pass: usize,
        second_pass: usize,
    },

    /// The objective depends on none of the parameters.
    #[error("{objective} does not depend on any of the {parameters} parameters")]
    DegenerateGradient {
        objective: ObjectiveKind,
        parameters: usize,
    },

    /// The schedule returned a radius that is not finite and positive.
    #[error("trust-region radius must be finite and positive, got {value}")]
    Radius { value: f64 },

    #[error("shape mismatch: {0}")]
    Shape(#[from] ShapeError),

    #[error("gradient oracle error: {0}")]
    Oracle(Box<dyn std::error::Error + Send + Sync>),

    #[error("loss error: {0}")]
    Loss(Box<dyn std::error::Error + Send + Sync>),

    #[error("divergence error: {0}")]
    Divergence(Box<dyn std::error::Error + Send + Sync>),

    #[error("solver error: {0}")]
    Solver(Box<dyn std::error::Error + Send + Sync>),

    #[error("step applier error: {0}")]
    Apply(Box<dyn std::error::Error + Send + Sync>),
}
