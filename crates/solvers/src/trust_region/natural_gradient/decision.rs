/// Which branch a step takes, chosen once from the quadratic form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The quadratic form is not positive. Nothing is committed.
    Skip,

    /// The quadratic form is positive. The rescaled update is committed.
    Apply,
}

impl Decision {
    /// Selects the branch for the quadratic form `c = ½ xᵀ F x`.
    ///
    /// `c ≤ 0` and NaN select [`Decision::Skip`].
    #[must_use]
    pub fn from_quadratic_form(c: f64) -> Self {
        if c > 0.0 { Self::Apply } else { Self::Skip }
    }
}
