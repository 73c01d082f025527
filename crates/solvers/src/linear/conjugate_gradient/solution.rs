use natgrad_core::Direction;

/// Indicates why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The squared residual fell below the configured tolerance.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// The curvature along the search direction was zero or not finite.
    Breakdown,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a conjugate gradient solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// The final iterate.
    pub x: Direction,

    /// Squared residual norm at `x`.
    pub residual_sq: f64,

    /// Number of completed iterations.
    pub iters: usize,
}
