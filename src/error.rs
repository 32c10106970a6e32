//! Error types shared by the solver components.

use thiserror::Error;

/// Errors surfaced by instance loading, parameter validation and
/// solution verification.
#[derive(Debug, Error)]
pub enum TspError {
    /// An algorithm parameter is outside its documented domain.
    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// The instance is too small to define a tour.
    #[error("instance must contain at least {min} points, got {got}")]
    TooFewPoints { min: usize, got: usize },

    /// Two points in the instance share the same identifier.
    #[error("duplicate point id {id} in instance")]
    DuplicatePointId { id: usize },

    /// A proposed tour does not visit every point exactly once.
    #[error("tour does not visit every point of the instance exactly once")]
    IncompleteTour,

    /// The length reported alongside a tour disagrees with the
    /// recomputed length beyond the accepted tolerance.
    #[error("reported length {reported:.4} does not match recomputed length {recomputed:.4}")]
    LengthMismatch { reported: f64, recomputed: f64 },

    #[error("cannot read instance file: {0}")]
    Io(#[from] std::io::Error),

    /// The instance file is not in the expected coordinate format.
    #[error("malformed instance file: {0}")]
    Parse(String),
}

impl TspError {
    pub(crate) fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        TspError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
