//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, settings metadata, the correlation ID assigned to
//! this very request, and cumulative request statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::context;
use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub correlation_id: Option<String>,
    pub settings: SettingsHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct SettingsHealth {
    pub source: String,
    pub header_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests: u64,
    pub background_tasks: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        correlation_id: context::correlation_id(),
        settings: SettingsHealth {
            source: state.settings_source.clone(),
            header_name: state.header_name.clone(),
        },
        stats: StatsResponse {
            requests: state.stats.requests.load(Ordering::Relaxed),
            background_tasks: state.stats.background_tasks.load(Ordering::Relaxed),
        },
    })
}
