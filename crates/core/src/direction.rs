use ndarray::Zip;

use crate::{ParameterVector, ShapeError, Tensor};

/// An update direction shaped like a [`ParameterVector`].
///
/// Holds plain values only, so a direction is never part of a
/// differentiation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    tensors: Vec<Tensor>,
}

impl Direction {
    /// Wraps a sequence of tensors.
    #[must_use]
    pub fn new(tensors: Vec<Tensor>) -> Self {
        Self { tensors }
    }

    /// Returns a zero direction matching the parameter shapes.
    #[must_use]
    pub fn zeros_like(params: &ParameterVector) -> Self {
        Self::new(params.shapes().map(Tensor::zeros).collect())
    }

    /// Returns a zero direction with the same shapes as `self`.
    #[must_use]
    pub fn to_zeros(&self) -> Self {
        Self::new(self.shapes().map(Tensor::zeros).collect())
    }

    /// Returns the number of tensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns true if the direction holds no tensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Iterates over the tensors in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Tensor> {
        self.tensors.iter()
    }

    /// Iterates over the tensor shapes in order.
    pub fn shapes(&self) -> impl ExactSizeIterator<Item = &[usize]> {
        self.tensors.iter().map(Tensor::shape)
    }

    /// Checks that `self` matches the shapes of `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] on the first disagreement.
    pub fn check_matches(&self, params: &ParameterVector) -> Result<(), ShapeError> {
        ShapeError::check(params.shapes(), self.shapes())
    }

    /// Checks that `self` and `other` have the same shapes.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] on the first disagreement.
    pub fn check_same_shape(&self, other: &Self) -> Result<(), ShapeError> {
        ShapeError::check(self.shapes(), other.shapes())
    }

    /// Returns `Σ self_i · other_i` over every element.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the shapes differ.
    pub fn dot(&self, other: &Self) -> Result<f64, ShapeError> {
        self.check_same_shape(other)?;
        Ok(self
            .tensors
            .iter()
            .zip(&other.tensors)
            .map(|(a, b)| Zip::from(a).and(b).fold(0.0, |acc, x, y| acc + x * y))
            .sum())
    }

    /// Returns `Σ self_i²` over every element.
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.tensors
            .iter()
            .map(|t| t.iter().map(|x| x * x).sum::<f64>())
            .sum()
    }

    /// Returns a copy scaled by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.tensors.iter().map(|t| t * factor).collect())
    }

    /// Updates `self ← self + alpha · x`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the shapes differ; `self` is left unchanged.
    pub fn axpy(&mut self, alpha: f64, x: &Self) -> Result<(), ShapeError> {
        self.check_same_shape(x)?;
        for (a, b) in self.tensors.iter_mut().zip(&x.tensors) {
            a.scaled_add(alpha, b);
        }
        Ok(())
    }
}

impl std::ops::Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.tensors.into_iter().map(|t| -t).collect())
    }
}

impl From<Vec<Tensor>> for Direction {
    fn from(tensors: Vec<Tensor>) -> Self {
        Self::new(tensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn direction(a: &[f64], b: [[f64; 2]; 2]) -> Direction {
        Direction::new(vec![arr1(a).into_dyn(), arr2(&b).into_dyn()])
    }

    #[test]
    fn dot_sums_over_all_tensors() {
        let x = direction(&[1.0, 2.0], [[1.0, 0.0], [0.0, 1.0]]);
        let y = direction(&[3.0, -1.0], [[2.0, 5.0], [7.0, 4.0]]);

        assert_relative_eq!(x.dot(&y).unwrap(), 3.0 - 2.0 + 2.0 + 4.0);
        assert_relative_eq!(x.norm_squared(), 1.0 + 4.0 + 1.0 + 1.0);
    }

    #[test]
    fn dot_rejects_mismatched_shapes() {
        let x = direction(&[1.0, 2.0], [[1.0, 0.0], [0.0, 1.0]]);
        let y = Direction::new(vec![arr1(&[1.0, 2.0, 3.0]).into_dyn()]);

        assert!(matches!(x.dot(&y), Err(ShapeError::Length { .. })));
    }

    #[test]
    fn axpy_and_scaling() {
        let mut x = direction(&[1.0, 2.0], [[1.0, 0.0], [0.0, 1.0]]);
        let y = direction(&[1.0, 1.0], [[1.0, 1.0], [1.0, 1.0]]);

        x.axpy(-2.0, &y).unwrap();
        assert_eq!(x, direction(&[-1.0, 0.0], [[-1.0, -2.0], [-2.0, -1.0]]));

        let half = x.scaled(0.5);
        assert_eq!(half, direction(&[-0.5, 0.0], [[-0.5, -1.0], [-1.0, -0.5]]));

        let negated = -half;
        assert_eq!(negated, direction(&[0.5, 0.0], [[0.5, 1.0], [1.0, 0.5]]));
    }

    #[test]
    fn zeros_match_shapes() {
        let x = direction(&[1.0, 2.0], [[1.0, 0.0], [0.0, 1.0]]);
        let zeros = x.to_zeros();

        assert_eq!(zeros.shapes().collect::<Vec<_>>(), x.shapes().collect::<Vec<_>>());
        assert_relative_eq!(zeros.norm_squared(), 0.0);
    }
}
