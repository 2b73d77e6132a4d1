//! Health Check Routes - Liveness and Readiness Probes
//!
//! Exposes /live and /ready next to the metrics path. Readiness
//! flips on once the poll loop has recorded at least one snapshot,
//! and off again if polling halts under the fail-fast policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Shared health state written by the poll loop, read by probes.
#[derive(Debug)]
pub struct HealthState {
    /// Whether at least one poll has succeeded.
    has_polled: AtomicBool,
    /// Whether the poll loop is still scheduling fetches.
    polling_active: AtomicBool,
}

impl HealthState {
    /// Create a new health state (not yet polled, polling active).
    pub fn new() -> Self {
        Self {
            has_polled: AtomicBool::new(false),
            polling_active: AtomicBool::new(true),
        }
    }

    /// Record a successful poll.
    pub fn mark_polled(&self) {
        self.has_polled.store(true, Ordering::Relaxed);
    }

    /// Record that polling stopped for good.
    pub fn mark_halted(&self) {
        self.polling_active.store(false, Ordering::Relaxed);
    }

    /// Whether metrics reflect an upstream that is still being polled.
    pub fn is_ready(&self) -> bool {
        self.has_polled.load(Ordering::Relaxed) && self.is_polling()
    }

    /// Whether the poll loop is still running.
    pub fn is_polling(&self) -> bool {
        self.polling_active.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes for `/live` and `/ready`.
pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 after the first successful poll while polling continues.
async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}
