use natgrad_core::ShapeError;

/// Errors that can occur during a conjugate gradient solve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The right-hand side, initial guess, or operator output disagree in shape.
    #[error("shape mismatch: {0}")]
    Shape(#[from] ShapeError),

    #[error("operator error: {0}")]
    Operator(Box<dyn std::error::Error + Send + Sync>),
}
