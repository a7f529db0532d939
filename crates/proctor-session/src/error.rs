use thiserror::Error;

/// Errors from the session runtime.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("signal acquisition failed: {0}")]
    SignalAcquisition(String),

    #[error("violation recorder error: {0}")]
    Recorder(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("event log error: {0}")]
    EventLog(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for SessionError {
    fn from(err: config::ConfigError) -> Self {
        SessionError::Config(err.to_string())
    }
}

/// Convenience type alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SessionError::SignalAcquisition("camera unplugged".into());
        assert_eq!(err.to_string(), "signal acquisition failed: camera unplugged");
    }

    #[test]
    fn json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SessionError = json_err.into();
        assert!(matches!(err, SessionError::Json(_)));
    }
}
