use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};

use crate::Tensor;

/// Named numeric inputs consumed by loss and divergence functions.
///
/// Objectives never see these directly; a step first takes a
/// [`snapshot`](Self::snapshot) and hands out the resulting [`FrozenInputs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationInputs {
    values: BTreeMap<String, Tensor>,
}

impl EvaluationInputs {
    /// Creates an empty set of inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tensor input, replacing any previous value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Tensor) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Inserts a scalar input as a zero-dimensional tensor.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.insert(name, ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Returns the input with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    /// Takes a plain-value snapshot for use in a differentiation pass.
    #[must_use]
    pub fn snapshot(&self) -> FrozenInputs {
        FrozenInputs {
            values: self.values.clone(),
        }
    }
}

impl<N: Into<String>> FromIterator<(N, Tensor)> for EvaluationInputs {
    fn from_iter<T: IntoIterator<Item = (N, Tensor)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }
}

/// An immutable snapshot of [`EvaluationInputs`].
///
/// Values are constants with respect to every gradient computed while the
/// snapshot is in use.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenInputs {
    values: BTreeMap<String, Tensor>,
}

impl FrozenInputs {
    /// Returns the input with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    /// Returns a zero-dimensional (or single-element) input as a scalar.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.values
            .get(name)
            .filter(|t| t.len() == 1)
            .and_then(|t| t.iter().next().copied())
    }

    /// Iterates over input names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
