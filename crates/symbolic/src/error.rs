use thiserror::Error;

/// Errors raised by the symbolic gradient oracle.
#[derive(Debug, Error)]
pub enum SymbolicError {
    /// An expression refers to a parameter element that does not exist.
    #[error("expression refers to element {index} of parameter {param}, which does not exist")]
    UnboundVariable { param: usize, index: usize },

    /// A direction and a gradient tensor have different shapes.
    #[error("direction has shape {found:?}, gradient has shape {expected:?}")]
    Shape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Evaluated values could not be arranged into the tensor's shape.
    #[error("tensor layout error")]
    Layout(#[from] ndarray::ShapeError),
}
