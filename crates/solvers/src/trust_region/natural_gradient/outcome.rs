use natgrad_core::{Commit, Direction};

/// The result of a natural gradient step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The quadratic form was not positive, so nothing was committed.
    Skipped {
        /// A zero update shaped like the parameters.
        delta: Direction,

        /// The quadratic form `½ xᵀ F x` of the solver's direction.
        quadratic_form: f64,
    },

    /// The rescaled update was committed.
    Applied {
        /// The committed update.
        delta: Direction,

        /// Predicted first-order change in loss, `Σ gᵢ · δᵢ`.
        improvement: f64,

        /// The multiplier `λ = √(c / ε)` the solver's direction was divided by.
        multiplier: f64,

        /// The quadratic form `c = ½ xᵀ F x` of the solver's direction.
        quadratic_form: f64,

        /// Receipt from the step applier.
        commit: Commit,
    },
}

impl Outcome {
    /// Returns the update, zero when skipped.
    #[must_use]
    pub fn delta(&self) -> &Direction {
        match self {
            Self::Skipped { delta, .. } | Self::Applied { delta, .. } => delta,
        }
    }

    /// Consumes the outcome and returns the update.
    #[must_use]
    pub fn into_delta(self) -> Direction {
        match self {
            Self::Skipped { delta, .. } | Self::Applied { delta, .. } => delta,
        }
    }

    /// Returns the predicted change in loss, zero when skipped.
    #[must_use]
    pub fn improvement(&self) -> f64 {
        match self {
            Self::Skipped { .. } => 0.0,
            Self::Applied { improvement, .. } => *improvement,
        }
    }

    /// Returns the quadratic form the decision was made on.
    #[must_use]
    pub fn quadratic_form(&self) -> f64 {
        match self {
            Self::Skipped { quadratic_form, .. } | Self::Applied { quadratic_form, .. } => {
                *quadratic_form
            }
        }
    }

    /// Returns the commit receipt if the update was applied.
    #[must_use]
    pub fn commit(&self) -> Option<Commit> {
        match self {
            Self::Skipped { .. } => None,
            Self::Applied { commit, .. } => Some(*commit),
        }
    }

    /// Returns true if the update was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
