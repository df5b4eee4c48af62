//! Request metrics
//!
//! A process-wide Prometheus recorder behind an injectable handle. The
//! recorder itself can only be installed once per process, so installation
//! goes through a `OnceLock`; the handle stored in `AppState` is what
//! renders the scrape body.

use anyhow::{anyhow, Result};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

/// Latency buckets in milliseconds.
const LATENCY_BUCKETS_MS: &[f64] = &[
    0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0,
];

static RECORDER: OnceLock<std::result::Result<PrometheusHandle, String>> = OnceLock::new();

#[derive(Clone)]
pub struct AppMetrics {
    handle: PrometheusHandle,
}

impl AppMetrics {
    /// Install the process-wide recorder (once) and return a handle to it.
    pub fn install() -> Result<Self> {
        let result = RECORDER.get_or_init(|| {
            PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full("http_response_time_ms".to_string()),
                    LATENCY_BUCKETS_MS,
                )
                .map_err(|e| e.to_string())
                .and_then(|builder| builder.install_recorder().map_err(|e| e.to_string()))
        });

        match result {
            Ok(handle) => Ok(Self {
                handle: handle.clone(),
            }),
            Err(e) => Err(anyhow!("Failed to install Prometheus recorder: {}", e)),
        }
    }

    /// Render the current metrics snapshot in Prometheus text exposition
    /// format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Record one completed request: count by method, latency by
    /// method/route/status.
    pub fn record_request(&self, method: &str, route: &str, status: u16, start: Instant) {
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        counter!("http_requests_total", "method" => method.to_string()).increment(1);
        histogram!(
            "http_response_time_ms",
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status.to_string()
        )
        .record(elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_requests_show_up_in_exposition() {
        let metrics = AppMetrics::install().expect("recorder");

        metrics.record_request("GET", "/", 200, Instant::now());

        let body = metrics.render();
        assert!(body.contains("http_requests_total"));
        assert!(body.contains("method=\"GET\""));
        assert!(body.contains("http_response_time_ms"));
    }
}
