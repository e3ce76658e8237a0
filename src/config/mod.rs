//! Settings loading and validation.
//!
//! Settings come from an optional file whose format is chosen by
//! extension (YAML by default, JSON and TOML behind features). Without a
//! file the [`Config::default`](model::Config) settings apply.
//! Submodules provide the data model and validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::CorrelatorError;
use model::Config;

/// File names checked in the working directory when no path is given.
pub const CANDIDATES: &[&str] = &[
    "correlator.yaml",
    "correlator.yml",
    "correlator.json",
    "correlator.toml",
];

/// Parse a settings string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, CorrelatorError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| CorrelatorError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| CorrelatorError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| CorrelatorError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => {
            let _ = (content, path_display);
            Err(CorrelatorError::UnsupportedFormat(other.to_string()))
        }
    }
}

/// Read, parse and validate a settings file.
pub async fn load_file(path: &Path) -> Result<Config, CorrelatorError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CorrelatorError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CorrelatorError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        return Err(CorrelatorError::ConfigValidation { errors });
    }
    Ok(config)
}

/// Load settings from `explicit`, or from the first candidate file found
/// in the working directory, or fall back to defaults.
pub async fn resolve(explicit: Option<&Path>) -> Result<(Config, String), CorrelatorError> {
    if let Some(path) = explicit {
        let config = load_file(path).await?;
        return Ok((config, path.display().to_string()));
    }

    for name in CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected settings file");
            let config = load_file(&path).await?;
            return Ok((config, path.display().to_string()));
        }
    }

    Ok((Config::default(), "defaults".to_string()))
}
