use thiserror::Error;

/// Errors from report production.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document conversion failed: {0}")]
    Conversion(String),

    #[error("chart generation failed: {0}")]
    Chart(String),
}

/// Convenience type alias for report results.
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ReportError::Conversion("wkhtmltopdf exited with 1".into());
        assert!(err.to_string().contains("wkhtmltopdf"));
    }
}
