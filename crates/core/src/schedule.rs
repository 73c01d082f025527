/// Supplies the trust-region radius for a step.
///
/// Implementations must return a finite, strictly positive value. The value is
/// read once per step.
pub trait ParameterSchedule {
    /// Returns the current value.
    fn value(&self) -> f64;
}

/// A plain `f64` is a constant schedule.
impl ParameterSchedule for f64 {
    fn value(&self) -> f64 {
        *self
    }
}

impl<S: ParameterSchedule + ?Sized> ParameterSchedule for &S {
    fn value(&self) -> f64 {
        (**self).value()
    }
}
