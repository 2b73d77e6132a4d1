//! Prometheus Metrics Registry - Listener Gauges and Exposition
//!
//! Owns the `icecast_listeners{name,id}` gauge vector and serves it in
//! the Prometheus text format. Each exporter builds its own registry
//! (no process-global default registry) so tests get isolated state.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::health::{health_routes, HealthState};
use crate::domain::status::{StatusSnapshot, StreamLabels};

/// Exported gauge name.
pub const LISTENERS_METRIC: &str = "icecast_listeners";

/// Concurrency-safe store of listener gauges.
///
/// Series are keyed by their `{name, id}` label set: writing the same
/// set again overwrites the value. Series are never removed, so a mount
/// that disappears upstream keeps exporting its last value.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Current listeners per stream.
    listeners: GaugeVec,
}

impl MetricsRegistry {
    /// Create a registry with the listener gauge registered.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let listeners = GaugeVec::new(
            Opts::new(
                LISTENERS_METRIC,
                "Gauge representing current Icecast stream listeners",
            ),
            &["name", "id"],
        )?;

        registry.register(Box::new(listeners.clone()))?;

        Ok(Self {
            registry,
            listeners,
        })
    }

    /// Set the gauge for exactly this label set, creating it if needed.
    pub fn upsert(&self, labels: &StreamLabels, value: f64) {
        self.listeners.with_label_values(&labels.values()).set(value);
    }

    /// Fold a snapshot into the gauges. Returns how many series were written.
    pub fn record(&self, snapshot: &StatusSnapshot) -> usize {
        let mut written = 0;
        for (labels, stream) in snapshot.labeled() {
            #[allow(clippy::cast_precision_loss)]
            let value = stream.listener_count as f64;
            self.upsert(&labels, value);
            written += 1;
        }
        written
    }

    /// Render every tracked series in the text exposition format.
    ///
    /// Each series is read atomically; no cross-series atomicity.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Router serving the exposition at `path` plus `/live` and `/ready`.
    pub fn router(self: Arc<Self>, path: &str, health: Arc<HealthState>) -> Router {
        Router::new()
            .route(path, get(metrics_handler))
            .with_state(self)
            .merge(health_routes(health))
    }

    /// Serve metrics and health probes on the configured bind address.
    #[instrument(skip(self, health, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        path: String,
        health: Arc<HealthState>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router(&path, health);

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, path = %path, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Scrape handler. Never surfaces poll errors, only encoding failures.
async fn metrics_handler(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    match registry.export() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Find the value of `icecast_listeners{name=..,id=..}` in an exposition body.
#[cfg(test)]
pub(crate) fn listener_value(exposition: &str, name: &str, id: &str) -> Option<f64> {
    let name_label = format!("name=\"{name}\"");
    let id_label = format!("id=\"{id}\"");
    exposition
        .lines()
        .filter(|line| line.starts_with(&format!("{LISTENERS_METRIC}{{")))
        .find(|line| line.contains(&name_label) && line.contains(&id_label))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StreamStatus;

    fn labels(name: &str, id: &str) -> StreamLabels {
        StreamLabels {
            name: name.to_string(),
            id: id.to_string(),
        }
    }

    fn series_count(exposition: &str) -> usize {
        exposition
            .lines()
            .filter(|l| l.starts_with(&format!("{LISTENERS_METRIC}{{")))
            .count()
    }

    #[test]
    fn test_empty_registry_exports_no_series() {
        let registry = MetricsRegistry::new().unwrap();
        let body = registry.export().unwrap();
        assert_eq!(series_count(&body), 0);
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let registry = MetricsRegistry::new().unwrap();
        registry.upsert(&labels("A", "0"), 5.0);
        registry.upsert(&labels("A", "0"), 9.0);

        let body = registry.export().unwrap();
        assert_eq!(series_count(&body), 1);
        assert_eq!(listener_value(&body, "A", "0"), Some(9.0));
    }

    #[test]
    fn test_record_assigns_positional_ids() {
        let registry = MetricsRegistry::new().unwrap();
        let snapshot = StatusSnapshot::new(vec![
            StreamStatus { listener_count: 3, stream_name: "A".into() },
            StreamStatus { listener_count: 7, stream_name: "B".into() },
        ]);

        assert_eq!(registry.record(&snapshot), 2);

        let body = registry.export().unwrap();
        assert_eq!(series_count(&body), 2);
        assert_eq!(listener_value(&body, "A", "0"), Some(3.0));
        assert_eq!(listener_value(&body, "B", "1"), Some(7.0));
        assert!(body.contains("# TYPE icecast_listeners gauge"));
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = MetricsRegistry::new().unwrap();
        let second = MetricsRegistry::new().unwrap();
        first.upsert(&labels("A", "0"), 1.0);

        assert_eq!(series_count(&second.export().unwrap()), 0);
    }

    #[test]
    fn test_nan_passes_through() {
        let registry = MetricsRegistry::new().unwrap();
        registry.upsert(&labels("A", "0"), f64::NAN);

        let body = registry.export().unwrap();
        assert!(listener_value(&body, "A", "0").is_some_and(f64::is_nan));
    }

    #[test]
    fn test_concurrent_export_during_upserts() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        registry.upsert(&labels("A", "0"), 0.0);

        std::thread::scope(|scope| {
            let writer = Arc::clone(&registry);
            scope.spawn(move || {
                for i in 0..2_000u32 {
                    writer.upsert(&labels("A", "0"), f64::from(i));
                    writer.upsert(&labels("B", &(i % 8).to_string()), f64::from(i));
                }
            });

            for _ in 0..4 {
                let reader = Arc::clone(&registry);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let body = reader.export().unwrap();
                        let value = listener_value(&body, "A", "0").unwrap();
                        assert!((0.0..2_000.0).contains(&value));
                        for line in body.lines().filter(|l| !l.starts_with('#')) {
                            assert!(line.rsplit(' ').next().unwrap().parse::<f64>().is_ok());
                        }
                    }
                });
            }
        });

        let body = registry.export().unwrap();
        assert_eq!(listener_value(&body, "A", "0"), Some(1_999.0));
    }
}
