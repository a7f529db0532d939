use thiserror::Error;

/// Errors from parsing or validating shared types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown violation type: {0}")]
    UnknownViolationType(String),

    #[error("unknown gaze direction: {0}")]
    UnknownGazeDirection(String),
}

/// Convenience alias for results carrying a [`TypeError`].
pub type TypeResult<T> = Result<T, TypeError>;
