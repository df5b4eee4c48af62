//! HTTP handlers

pub mod health;
pub mod metrics;
pub mod quotes;

pub use health::health;

use crate::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Records request count and latency once the inner handler has produced
/// its response, whatever the outcome (200, 400, 404 or 500).
pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    state
        .metrics
        .record_request(&method, &route, response.status().as_u16(), start);

    response
}
