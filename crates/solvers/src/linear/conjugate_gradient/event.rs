use natgrad_core::Direction;

/// Emitted after each completed conjugate gradient iteration.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// Squared residual norm `‖r‖²` after the update.
    pub residual_sq: f64,

    /// Step length taken along the search direction.
    pub alpha: f64,

    /// Weight of the previous search direction in the next one.
    pub beta: f64,

    /// The updated iterate.
    pub x: &'a Direction,
}
