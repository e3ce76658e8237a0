//! `correlator run` -- start the demo server.
//!
//! Loads settings from a file (or defaults), applies CLI overrides,
//! wires hooks for the enabled integrations, and serves the demo router
//! with the correlation layer until SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config::model::{Config, ValidatorKind};
use crate::config::{self, validation};
use crate::error::CorrelatorError;
use crate::logging;
use crate::middleware::Hook;
use crate::server::{self, AppState, Stats};

pub async fn execute(args: RunArgs) -> Result<(), CorrelatorError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let (mut config, source) = config::resolve(args.config.as_deref()).await?;
    apply_overrides(&mut config, &args)?;

    let stats = Arc::new(Stats::new());
    let integrations = integration_hooks(&args);

    let mut request_hooks = vec![stats.request_hook()];
    request_hooks.extend(integrations.iter().cloned());
    let layer = config.layer(request_hooks)?;

    let state = Arc::new(AppState {
        start_time: Instant::now(),
        header_name: config.header_name.clone(),
        settings_source: source.clone(),
        stats,
        tasks: config.task_propagator(integrations),
    });

    let router = server::build_router(state, layer, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        settings = %source,
        header = %config.header_name,
        "correlator started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("correlator stopped");
    Ok(())
}

/// Apply CLI flags on top of file settings and re-validate.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<(), CorrelatorError> {
    if let Some(ref name) = args.header_name {
        config.header_name.clone_from(name);
    }
    if args.no_validate {
        config.validator = ValidatorKind::None;
    }

    validation::validate(config).map_err(|errors| CorrelatorError::ConfigValidation { errors })
}

/// Hooks contributed by optional integrations, in registration order.
fn integration_hooks(args: &RunArgs) -> Vec<Hook> {
    #[allow(unused_mut)]
    let mut hooks: Vec<Hook> = Vec::new();

    #[cfg(feature = "sentry-integration")]
    if args.sentry_dsn.is_some() {
        hooks.push(crate::sentry_integration::transaction_hook());
    }
    #[cfg(not(feature = "sentry-integration"))]
    let _ = args;

    hooks
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::parse_from(argv);
        match cli.command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn cli_overrides_win() {
        let args = run_args(&["correlator", "run", "--header-name", "X-Trace-ID", "--no-validate"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.header_name, "X-Trace-ID");
        assert_eq!(config.validator, ValidatorKind::None);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let args = run_args(&["correlator", "run", "--header-name", "X Trace"]);
        let mut config = Config::default();
        let err = apply_overrides(&mut config, &args).unwrap_err();
        assert!(matches!(err, CorrelatorError::ConfigValidation { .. }));
    }
}
