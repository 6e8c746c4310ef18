use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

/// State shared by the web endpoint's handlers.
#[derive(Clone)]
pub struct WebState {
    pub name: Arc<str>,
    pub started_at: Instant,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct EndpointStatus {
    pub name: String,
    pub version: &'static str,
    pub uptime_secs: u64,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn status(State(state): State<WebState>) -> Json<EndpointStatus> {
    Json(EndpointStatus {
        name: state.name.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
