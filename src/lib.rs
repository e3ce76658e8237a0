//! Correlator attaches a correlation ID to every HTTP request.
//!
//! The [`CorrelationIdLayer`](middleware::CorrelationIdLayer) reads the
//! ID from an inbound header (`X-Request-ID` by default), replaces it
//! when missing or invalid, publishes it in a task-local
//! [`context`] for handlers and log records, and echoes it back in the
//! response where browser clients are allowed to read it.
//!
//! # Architecture
//!
//! - [`middleware`] -- The tower layer: ID resolution, header
//!   reconciliation, hook dispatch, and response decoration.
//! - [`context`] -- Task-local storage for the current request's ID.
//! - [`id`] -- Default generators and validators.
//! - [`tasks`] -- Propagation of IDs into background tasks.
//! - [`config`] -- Settings file loading and validation.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`server`] -- Demo Axum server, shared application state, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML settings file support _(enabled by default)_ |
//! | `json` | JSON settings file support |
//! | `toml` | TOML settings file support |
//! | `sentry-integration` | Tag Sentry events with the correlation ID |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod context;
pub mod error;
pub mod health;
pub mod id;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod tasks;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;

pub use context::correlation_id;
pub use middleware::{CorrelationIdLayer, CorrelationIdService};
