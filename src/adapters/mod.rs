//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, the metrics HTTP server).
//!
//! Adapter categories:
//! - `status`: Icecast status endpoint client
//! - `notify`: Legacy VClock listener forwarding
//! - `metrics`: Prometheus registry, scrape endpoint and health checks

pub mod metrics;
pub mod notify;
pub mod status;
