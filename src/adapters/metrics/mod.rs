//! Metrics and Monitoring Adapters
//!
//! Provides the Prometheus listener gauges, the scrape endpoint and
//! health check endpoints (/live, /ready) via axum 0.7.

pub mod health;
pub mod prometheus;

pub use health::HealthState;
pub use self::prometheus::MetricsRegistry;
