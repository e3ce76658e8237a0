//! Settings validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for values the
//! interceptor cannot use: header names that are not valid HTTP tokens,
//! a zero-length log truncation, and empty task header keys. Returns a
//! list of [`ValidationError`] values with per-field suggestions.

use http::HeaderName;

use super::model::{Config, ValidatorKind};
use crate::error::ValidationError;

/// Validate an HTTP header name. Returns `Ok(())` or a human-readable error.
pub fn validate_header_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("header name cannot be empty".into());
    }
    HeaderName::try_from(name)
        .map(|_| ())
        .map_err(|_| format!("'{name}' is not a valid header name"))
}

fn header_suggestion(name: &str) -> Option<String> {
    let candidate = name.trim().replace([' ', '_'], "-");
    (candidate != name && validate_header_name(&candidate).is_ok())
        .then(|| format!("did you mean '{candidate}'?"))
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_header_name(&config.header_name) {
        errors.push(ValidationError {
            field: "header_name".into(),
            message: msg,
            suggestion: header_suggestion(&config.header_name),
        });
    }

    if config.log_id_length == Some(0) {
        errors.push(ValidationError {
            field: "log_id_length".into(),
            message: "must be at least 1".into(),
            suggestion: Some("remove the field to log full IDs".into()),
        });
    }

    for (field, key) in [
        ("tasks.correlation_key", &config.tasks.correlation_key),
        ("tasks.parent_key", &config.tasks.parent_key),
    ] {
        if key.trim().is_empty() {
            errors.push(ValidationError {
                field: field.into(),
                message: "task header key cannot be empty".into(),
                suggestion: None,
            });
        }
    }

    if config.tasks.correlation_key == config.tasks.parent_key {
        errors.push(ValidationError {
            field: "tasks.parent_key".into(),
            message: "must differ from tasks.correlation_key".into(),
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let validator = match config.validator {
        ValidatorKind::Uuid => "uuid",
        ValidatorKind::None => "none (accept all)",
    };
    let log_length = config
        .log_id_length
        .map_or_else(|| "full".to_string(), |n| format!("{n} chars"));

    [
        format!("{path} is valid\n"),
        format!("  header:          {}", config.header_name),
        format!("  rewrite request: {}", config.update_request_header),
        format!("  validator:       {validator}"),
        format!("  generator:       {:?}", config.generator).to_lowercase(),
        format!("  lowercase:       {}", config.lowercase),
        format!("  log id length:   {log_length}"),
        format!(
            "  task keys:       {} / {}",
            config.tasks.correlation_key, config.tasks.parent_key
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::TaskConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn header_with_space_fails_with_suggestion() {
        let config = Config {
            header_name: "X Request ID".into(),
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "header_name");
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'X-Request-ID'?")
        );
    }

    #[test]
    fn empty_header_fails() {
        let config = Config {
            header_name: String::new(),
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("cannot be empty")));
    }

    #[test]
    fn zero_log_length_fails() {
        let config = Config {
            log_id_length: Some(0),
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "log_id_length"));
    }

    #[test]
    fn clashing_task_keys_fail() {
        let config = Config {
            tasks: TaskConfig {
                correlation_key: "ID".into(),
                parent_key: "ID".into(),
            },
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("must differ")));
    }

    #[test]
    fn report_mentions_header() {
        let report = format_validation_report("correlator.yaml", &Config::default());
        assert!(report.starts_with("correlator.yaml is valid"));
        assert!(report.contains("X-Request-ID"));
        assert!(report.contains("hex"));
    }
}
