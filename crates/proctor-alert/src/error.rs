use thiserror::Error;

/// Errors from the alert subsystem.
///
/// None of these ever reach the frame loop from a dispatched alert; they are
/// logged inside the detached task.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("audio output unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("audio alerts disabled by configuration")]
    Disabled,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio playback failed: {0}")]
    Playback(String),

    #[error("alert cooldown must be a positive number of seconds, got {0}")]
    InvalidCooldown(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for alert results.
pub type AlertResult<T> = Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AlertError::DeviceUnavailable("aplay not found on PATH".into());
        assert!(err.to_string().contains("aplay"));

        let err = AlertError::InvalidCooldown(-1.0);
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "tmp not writable");
        let err: AlertError = io_err.into();
        assert!(err.to_string().contains("tmp not writable"));
    }
}
