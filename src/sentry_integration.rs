//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN and environment.
//! The returned guard must be held for the lifetime of the application
//! to ensure errors and panics are reported.
//!
//! [`transaction_hook`] is registered on the correlation layer (and the
//! task propagator) by `correlator run`, so events captured while a
//! request is in flight carry its correlation ID as the `transaction_id`
//! tag.

use std::sync::Arc;

use crate::middleware::Hook;

pub const TRANSACTION_TAG: &str = "transaction_id";

pub fn init(dsn: &str, environment: Option<&str>) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: environment.map(|e| e.to_string().into()),
        release: Some(env!("CARGO_PKG_VERSION").into()),
        ..Default::default()
    })
}

/// Tag the current Sentry scope with `id`.
pub fn set_transaction_id(id: &str) {
    sentry::configure_scope(|scope| scope.set_tag(TRANSACTION_TAG, id));
}

#[must_use]
pub fn transaction_hook() -> Hook {
    Arc::new(set_transaction_id)
}

