//! `correlator validate` -- check a settings file for errors.
//!
//! The JSON report describes the interceptor the file would build: the
//! header in both directions, how inbound IDs are judged, a sample
//! generated ID, and the keys used for task propagation.

use std::path::Path;

use serde_json::{json, Value};

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::{Config, GeneratorKind, ValidatorKind};
use crate::config::{parse_config_str, validation};
use crate::error::{CorrelatorError, ValidationError};

pub fn execute(args: &ValidateArgs) -> Result<(), CorrelatorError> {
    let path = args.config.as_path();
    let config = read(path)?;
    let display = path.display().to_string();

    match (validation::validate(&config), &args.format) {
        (Ok(()), ValidateFormat::Text) => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&display, &config)
            );
            Ok(())
        }
        (Ok(()), ValidateFormat::Json) => {
            println!("{}", interceptor_report(&display, &config));
            Ok(())
        }
        (Err(errors), format) => {
            match format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {display} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => println!("{}", error_report(&display, &errors)),
            }
            Err(CorrelatorError::ConfigValidation { errors })
        }
    }
}

fn read(path: &Path) -> Result<Config, CorrelatorError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CorrelatorError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CorrelatorError::Io(e)
        }
    })?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

fn interceptor_report(path: &str, config: &Config) -> Value {
    let sample = config.generator.generator()();
    let sample = if config.lowercase {
        sample.to_lowercase()
    } else {
        sample
    };

    json!({
        "valid": true,
        "path": path,
        "header": {
            "name": config.header_name,
            "rewrite_request": config.update_request_header,
            "exposed_as": config.header_name,
        },
        "inbound": {
            "validator": match config.validator {
                ValidatorKind::Uuid => "uuid",
                ValidatorKind::None => "none",
            },
            "accepts_any_value": config.validator == ValidatorKind::None,
        },
        "generated": {
            "format": match config.generator {
                GeneratorKind::Hex => "hex",
                GeneratorKind::Hyphenated => "hyphenated",
            },
            "lowercase": config.lowercase,
            "sample": sample,
        },
        "logging": {
            "id_length": config.log_id_length,
        },
        "tasks": {
            "correlation_key": config.tasks.correlation_key,
            "parent_key": config.tasks.parent_key,
        },
    })
}

fn error_report(path: &str, errors: &[ValidationError]) -> Value {
    json!({
        "valid": false,
        "path": path,
        "errors": errors
            .iter()
            .map(|e| json!({
                "field": e.field,
                "message": e.message,
                "suggestion": e.suggestion,
            }))
            .collect::<Vec<_>>(),
    })
}
