use thiserror::Error;

/// Errors raised when two tensor sequences do not line up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The sequences hold a different number of tensors.
    #[error("expected {expected} tensors, found {found}")]
    Length { expected: usize, found: usize },

    /// A tensor's shape differs from the reference shape at the same position.
    #[error("tensor {index} has shape {found:?}, expected {expected:?}")]
    Shape {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

impl ShapeError {
    /// Checks that two shape sequences agree in count, order, and shape.
    ///
    /// # Errors
    ///
    /// Returns the first disagreement found.
    pub fn check<'a, 'b>(
        expected: impl ExactSizeIterator<Item = &'a [usize]>,
        found: impl ExactSizeIterator<Item = &'b [usize]>,
    ) -> Result<(), Self> {
        if expected.len() != found.len() {
            return Err(Self::Length {
                expected: expected.len(),
                found: found.len(),
            });
        }

        for (index, (expected, found)) in expected.zip(found).enumerate() {
            if expected != found {
                return Err(Self::Shape {
                    index,
                    expected: expected.to_vec(),
                    found: found.to_vec(),
                });
            }
        }

        Ok(())
    }
}
