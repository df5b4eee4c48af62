//! Quote handlers
//!
//! Both endpoints speak plain text. Persistence errors are logged with full
//! detail server-side and surface to the client as a generic 500 body.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

/// GET / — the most recently submitted quote.
pub async fn latest(State(state): State<AppState>) -> (StatusCode, String) {
    match state.quotes.latest_quote().await {
        Ok(Some(latest)) => (
            StatusCode::OK,
            format!(
                "Latest quote=> Author: {}, content: {}",
                latest.author_name, latest.content
            ),
        ),
        Ok(None) => (StatusCode::NOT_FOUND, "No quotes found".to_string()),
        Err(e) => {
            tracing::error!("Failed to fetch latest quote: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

/// POST / — submit a quote/author pair as JSON.
///
/// Both fields must be JSON strings; anything else is a 400 and the request
/// goes no further.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, String) {
    let Ok(Json(body)) = body else {
        tracing::warn!("Rejected quote submission: body is not valid JSON");
        return (StatusCode::BAD_REQUEST, "Bad request".to_string());
    };

    let (Some(author), Some(quote)) = (
        body.get("author").and_then(Value::as_str),
        body.get("quote").and_then(Value::as_str),
    ) else {
        tracing::warn!("Rejected quote submission: author and quote must be strings");
        return (StatusCode::BAD_REQUEST, "Bad request".to_string());
    };

    match state.quotes.submit_quote(author, quote).await {
        Ok(outcome) if outcome.author_created => (
            StatusCode::OK,
            format!("Quote: \"{quote}\" has been saved and author {author} has been created."),
        ),
        Ok(_) => (
            StatusCode::OK,
            format!("Quote: \"{quote}\" by {author} has been saved."),
        ),
        Err(e) => {
            tracing::error!("Failed to save quote: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}
