//! Unified error types for Correlator.
//!
//! Defines [`CorrelatorError`] (the main crate error enum) and
//! [`ValidationError`] for settings validation failures. Both use
//! `thiserror` for `Display` and `Error` derives. Error messages
//! include contextual hints to guide the user toward a fix.
//!
//! The interceptor itself never produces these at request time: a bad
//! inbound ID is corrected, not rejected. They surface while building a
//! layer, loading settings, or running a CLI subcommand.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CorrelatorError {
    #[error("Invalid header name '{name}': {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("Settings file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Settings parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Settings validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported settings format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(http::StatusCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_includes_suggestion() {
        let err = ValidationError {
            field: "header_name".into(),
            message: "'X Request' is not a valid header name".into(),
            suggestion: Some("did you mean 'X-Request'?".into()),
        };
        assert_eq!(
            err.to_string(),
            "  header_name: 'X Request' is not a valid header name (did you mean 'X-Request'?)"
        );
    }

    #[test]
    fn config_validation_lists_every_error() {
        let err = CorrelatorError::ConfigValidation {
            errors: vec![
                ValidationError {
                    field: "a".into(),
                    message: "first".into(),
                    suggestion: None,
                },
                ValidationError {
                    field: "b".into(),
                    message: "second".into(),
                    suggestion: None,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Settings validation failed:\n  a: first\n  b: second"
        );
    }
}
