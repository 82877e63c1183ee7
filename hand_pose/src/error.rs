//! Errors raised when a landmark frame cannot be built.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    /// Wrong number of points (or flat components) supplied.
    #[error("invalid input: expected {expected} values, found {found}")]
    InvalidInput { expected: usize, found: usize },

    /// A coordinate was NaN or infinite.
    #[error("non-finite coordinate at landmark {index}")]
    NonFinite { index: usize },
}
