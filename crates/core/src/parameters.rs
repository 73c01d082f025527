use thiserror::Error;

use crate::{Commit, Direction, ShapeError, Tensor};

/// A named parameter tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: Tensor,
}

impl Parameter {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> &Tensor {
        &self.value
    }

    /// Returns the tensor shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }
}

/// Errors that can occur when building a [`ParameterVector`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("duplicate parameter name: {name}")]
    DuplicateName { name: String },
}

/// The ordered set of named tensors being optimized.
///
/// Shapes are fixed at construction. Values change only through
/// [`ParameterVector::commit`], which a [`StepApplier`](crate::StepApplier)
/// calls; each commit bumps [`version`](Self::version).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVector {
    parameters: Vec<Parameter>,
    version: u64,
}

impl ParameterVector {
    /// Creates a parameter vector from `(name, value)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::DuplicateName`] if two parameters share a name.
    pub fn new<N>(parameters: impl IntoIterator<Item = (N, Tensor)>) -> Result<Self, ParameterError>
    where
        N: Into<String>,
    {
        let mut out: Vec<Parameter> = Vec::new();
        for (name, value) in parameters {
            let name = name.into();
            if out.iter().any(|p| p.name == name) {
                return Err(ParameterError::DuplicateName { name });
            }
            out.push(Parameter { name, value });
        }

        Ok(Self {
            parameters: out,
            version: 0,
        })
    }

    /// Returns the number of parameter tensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if there are no parameter tensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Iterates over the parameter shapes in order.
    pub fn shapes(&self) -> impl ExactSizeIterator<Item = &[usize]> {
        self.parameters.iter().map(Parameter::shape)
    }

    /// Looks up a parameter value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Returns the parameter value at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Tensor> {
        self.parameters.get(index).map(|p| &p.value)
    }

    /// Returns the number of commits applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Adds `delta` to every parameter and returns the commit receipt.
    ///
    /// Either every tensor is updated or, on a shape mismatch, none is.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if `delta` does not match the parameter shapes.
    pub fn commit(&mut self, delta: &Direction) -> Result<Commit, ShapeError> {
        ShapeError::check(self.shapes(), delta.shapes())?;

        for (param, d) in self.parameters.iter_mut().zip(delta.iter()) {
            param.value += d;
        }
        self.version += 1;

        Ok(Commit::new(self.version))
    }
}
