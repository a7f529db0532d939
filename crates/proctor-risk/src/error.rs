use thiserror::Error;

/// Errors from configuring the fusion engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("window size must be greater than zero")]
    InvalidWindowSize,
}

/// Convenience type alias for risk results.
pub type RiskResult<T> = Result<T, RiskError>;
