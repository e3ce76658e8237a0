//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent for
//! container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "correlator",
    version,
    about = "Correlation ID middleware demo server and tooling",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        correlator run                       Serve with default settings\n  \
        correlator run -c correlator.yaml    Serve with a settings file\n  \
        correlator health                    Query a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the demo server with the correlation layer applied
    Run(Box<RunArgs>),

    /// Validate a settings file without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        correlator run                                   Auto-detect settings\n  \
        correlator run -c correlator.yaml                Specific settings file\n  \
        correlator run --header-name X-Correlation-ID    Override the header\n  \
        correlator run -p 8080 --pretty                  Local dev mode")]
pub struct RunArgs {
    /// Settings file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Correlation --
    /// Header carrying the correlation ID (overrides the settings file)
    #[arg(long, env = "CORRELATION_HEADER", help_heading = "Correlation")]
    pub header_name: Option<String>,

    /// Accept any inbound ID instead of requiring a UUID
    #[arg(long, env = "CORRELATION_NO_VALIDATE", help_heading = "Correlation")]
    pub no_validate: bool,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Settings file to validate
    #[arg(default_value = "correlator.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Correlation ID to send with the request
    #[arg(long)]
    pub request_id: Option<String>,

    /// Header used to send the correlation ID
    #[arg(long, default_value = "X-Request-ID")]
    pub header_name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_reads_header_override() {
        let cli = Cli::parse_from(["correlator", "run", "--header-name", "X-Trace"]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.header_name.as_deref(), Some("X-Trace"));
    }
}
