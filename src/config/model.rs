//! Serde data structures for the Correlator settings file.
//!
//! Contains [`Config`] (the root) and [`TaskConfig`]. All types derive
//! `Serialize` and `Deserialize` with `deny_unknown_fields` for strict
//! parsing. Every field is optional; an empty file yields the same
//! interceptor as [`CorrelationIdLayer::builder`] with no calls.

use serde::{Deserialize, Serialize};

use crate::error::CorrelatorError;
use crate::id;
use crate::middleware::{CorrelationIdLayer, Hook, DEFAULT_HEADER_NAME};
use crate::tasks::{TaskPropagator, DEFAULT_CORRELATION_KEY, DEFAULT_PARENT_KEY};

fn default_header_name() -> String {
    DEFAULT_HEADER_NAME.to_string()
}

const fn default_true() -> bool {
    true
}

fn default_correlation_key() -> String {
    DEFAULT_CORRELATION_KEY.to_string()
}

fn default_parent_key() -> String {
    DEFAULT_PARENT_KEY.to_string()
}

fn is_default_header_name(v: &str) -> bool {
    v == DEFAULT_HEADER_NAME
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// Accept values that parse as a UUID.
    #[default]
    Uuid,
    /// Accept every value.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// 32 lowercase hex characters.
    #[default]
    Hex,
    /// 36-character hyphenated UUID.
    Hyphenated,
}

impl GeneratorKind {
    #[must_use]
    pub fn generator(self) -> fn() -> String {
        match self {
            Self::Hex => id::uuid_hex,
            Self::Hyphenated => id::uuid_hyphenated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(
        default = "default_header_name",
        skip_serializing_if = "is_default_header_name"
    )]
    pub header_name: String,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub update_request_header: bool,

    #[serde(default)]
    pub validator: ValidatorKind,

    #[serde(default)]
    pub generator: GeneratorKind,

    /// Lowercase every resolved ID.
    #[serde(default, skip_serializing_if = "is_false")]
    pub lowercase: bool,

    /// Truncate IDs recorded on log spans to this many characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id_length: Option<usize>,

    #[serde(default, skip_serializing_if = "TaskConfig::is_default")]
    pub tasks: TaskConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
            update_request_header: true,
            validator: ValidatorKind::default(),
            generator: GeneratorKind::default(),
            lowercase: false,
            log_id_length: None,
            tasks: TaskConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    #[serde(default = "default_correlation_key")]
    pub correlation_key: String,

    #[serde(default = "default_parent_key")]
    pub parent_key: String,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            correlation_key: default_correlation_key(),
            parent_key: default_parent_key(),
        }
    }
}

impl TaskConfig {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Config {
    /// Build the interceptor these settings describe, with `hooks`
    /// registered in order.
    pub fn layer(&self, hooks: Vec<Hook>) -> Result<CorrelationIdLayer, CorrelatorError> {
        let mut builder = CorrelationIdLayer::builder()
            .header_name(self.header_name.clone())
            .update_request_header(self.update_request_header)
            .generator(self.generator.generator())
            .log_id_length(self.log_id_length)
            .hooks(hooks);

        if self.validator == ValidatorKind::None {
            builder = builder.no_validator();
        }
        if self.lowercase {
            builder = builder.transformer(|id| id.to_lowercase());
        }

        builder.build()
    }

    #[must_use]
    pub fn task_propagator(&self, hooks: Vec<Hook>) -> TaskPropagator {
        TaskPropagator::new()
            .correlation_key(self.tasks.correlation_key.clone())
            .parent_key(self.tasks.parent_key.clone())
            .generator(self.generator.generator())
            .log_id_length(self.log_id_length)
            .hooks(hooks)
    }
}
