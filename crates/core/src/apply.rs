use crate::{Direction, ParameterVector, ShapeError};

/// Receipt for a committed update.
///
/// Holds the [`ParameterVector::version`] produced by the commit. Because the
/// commit takes `&mut ParameterVector`, any later read through the same vector
/// observes the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    version: u64,
}

impl Commit {
    /// Creates a receipt for the given version.
    #[must_use]
    pub fn new(version: u64) -> Self {
        Self { version }
    }

    /// Returns the parameter version produced by this commit.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Commits an update to parameter storage.
pub trait StepApplier {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies `delta` to `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the update cannot be committed. On error the
    /// parameters must be left unchanged.
    fn apply(&self, params: &mut ParameterVector, delta: &Direction) -> Result<Commit, Self::Error>;
}

/// Adds the delta to the parameters in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddDelta;

impl StepApplier for AddDelta {
    type Error = ShapeError;

    fn apply(&self, params: &mut ParameterVector, delta: &Direction) -> Result<Commit, Self::Error> {
        params.commit(delta)
    }
}
