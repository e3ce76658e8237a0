//! Axum demo server, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding settings
//! metadata, stats, the task propagator and uptime), [`build_router`]
//! for constructing the Axum router with the correlation layer applied,
//! and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.
//!
//! Routes:
//! - `GET /health` reports runtime diagnostics, see [`crate::health`].
//! - `ANY /echo` returns the correlation ID seen by the handler and the
//!   inbound header value after interception.
//! - `POST /tasks` runs a background task through the
//!   [`TaskPropagator`] and reports the IDs it ran with.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::context;
use crate::health::health_handler;
use crate::middleware::{CorrelationIdLayer, Hook};
use crate::tasks::{self, TaskPropagator};

#[derive(Debug)]
pub struct Stats {
    pub requests: AtomicU64,
    pub background_tasks: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            background_tasks: AtomicU64::new(0),
        }
    }

    /// Hook counting every request that received a correlation ID.
    #[must_use]
    pub fn request_hook(self: &Arc<Self>) -> Hook {
        let stats = Arc::clone(self);
        Arc::new(move |_id: &str| {
            stats.requests.fetch_add(1, Ordering::Relaxed);
        })
    }
}

#[derive(Debug)]
pub struct AppState {
    pub start_time: Instant,
    pub header_name: String,
    pub settings_source: String,
    pub stats: Arc<Stats>,
    pub tasks: TaskPropagator,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub correlation_id: Option<String>,
    pub request_header: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub correlation_id: Option<String>,
    pub task_id: String,
    pub parent_task_id: Option<String>,
}

/// The correlation layer wraps tracing so HTTP trace records carry
/// the request's `correlation_id`.
pub fn build_router(state: Arc<AppState>, layer: CorrelationIdLayer, max_body: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/echo", any(echo_handler))
        .route("/tasks", post(task_handler))
        .layer(
            ServiceBuilder::new()
                .layer(layer)
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

async fn echo_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<EchoResponse> {
    let request_header = headers
        .get(state.header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let correlation_id = context::correlation_id();

    tracing::info!(header = ?request_header, "echo");

    Json(EchoResponse {
        correlation_id,
        request_header,
    })
}

async fn task_handler(State(state): State<Arc<AppState>>) -> Response {
    let stats = Arc::clone(&state.stats);
    let handle = state.tasks.spawn(async move {
        stats.background_tasks.fetch_add(1, Ordering::Relaxed);
        tracing::info!("background task running");
        (context::correlation_id(), tasks::current_task_ids())
    });

    match handle.await {
        Ok((correlation_id, Some(ids))) => Json(TaskResponse {
            correlation_id,
            task_id: ids.current,
            parent_task_id: ids.parent,
        })
        .into_response(),
        Ok((_, None)) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "background task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
