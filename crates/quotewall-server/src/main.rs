//! QuoteWall Server
//!
//! A small HTTP service that stores and retrieves quotes attributed to
//! authors, backed by an embedded SQLite database, with request counts and
//! latency exposed for Prometheus scraping.

mod handlers;
mod models;
mod services;
mod storage;
mod telemetry;

use anyhow::{Context, Result};
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use services::QuoteService;
use storage::Database;
use telemetry::AppMetrics;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<QuoteService>,
    pub metrics: AppMetrics,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting QuoteWall Server v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    // Load configuration
    let config = load_config()
        .await
        .context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.database_path
    );

    // Initialize SQLite database
    let db = Arc::new(
        Database::new(&config.database_path)
            .await
            .context("Failed to initialize database")?,
    );
    info!("SQLite database initialized at: {}", config.database_path);

    // Initialize services
    let quotes = Arc::new(QuoteService::new(db));

    // Install the process-wide metrics recorder
    let metrics = AppMetrics::install().context("Failed to initialize metrics")?;
    info!("Prometheus recorder installed");

    // Create app state
    let state = AppState { quotes, metrics };

    // Build router
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server ready to accept connections");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    // Only the quote routes are instrumented; /metrics and /health are not.
    let quote_routes = Router::new()
        .route("/", get(handlers::quotes::latest).post(handlers::quotes::submit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::track_metrics,
        ));

    Router::new()
        .route("/metrics", get(handlers::metrics::scrape))
        .route("/health", get(handlers::health))
        .merge(quote_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
}

async fn load_config() -> Result<Config> {
    // Get data directory
    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        let path = data_dir.join("quotewall.db");
        path.to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    Ok(Config {
        bind_address,
        database_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.db");
        let db = Arc::new(
            Database::new(path.to_str().expect("utf-8 path"))
                .await
                .expect("database"),
        );
        let state = AppState {
            quotes: Arc::new(QuoteService::new(db)),
            metrics: AppMetrics::install().expect("metrics recorder"),
        };
        (build_router(state), dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
    }

    fn get_latest() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    fn post_quote(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_latest_on_empty_store_returns_404() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, get_latest()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "No quotes found");
    }

    #[tokio::test]
    async fn test_submit_then_fetch_latest() {
        let (app, _dir) = test_app().await;

        let (status, body) =
            send(&app, post_quote(r#"{"author":"Alice","quote":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello"));
        assert!(body.contains("Alice"));
        assert!(body.contains("created"));

        let (status, body) = send(&app, get_latest()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Latest quote=> Author: Alice, content: Hello");
    }

    #[tokio::test]
    async fn test_second_submission_for_same_author() {
        let (app, _dir) = test_app().await;

        send(&app, post_quote(r#"{"author":"Alice","quote":"Hello"}"#)).await;

        let (status, body) =
            send(&app, post_quote(r#"{"author":"Alice","quote":"World"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("World"));
        assert!(body.contains("Alice"));
        assert!(body.contains("saved"));
        assert!(!body.contains("created"));

        let (_, body) = send(&app, get_latest()).await;
        assert_eq!(body, "Latest quote=> Author: Alice, content: World");
    }

    #[tokio::test]
    async fn test_submit_with_non_string_author_is_rejected() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, post_quote(r#"{"author":42,"quote":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad request");

        // Rejected submissions must not reach the store
        let (status, _) = send(&app, get_latest()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_with_invalid_json_is_rejected() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, post_quote("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad request");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_exposes_request_counters() {
        let (app, _dir) = test_app().await;

        send(&app, get_latest()).await;

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = String::from_utf8(bytes.to_vec()).expect("utf-8 body");
        assert!(!body.is_empty());
        assert!(body.contains("http_requests_total"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _dir) = test_app().await;

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\":\"ok\""));
    }
}
