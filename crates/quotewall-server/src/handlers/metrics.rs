//! Metrics scrape endpoint

use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// Content type expected by Prometheus scrapers for the text exposition
/// format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub async fn scrape(State(state): State<AppState>) -> Response {
    let body = state.metrics.render();

    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response()
}
