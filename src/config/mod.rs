//! Configuration Module - Exporter Configuration
//!
//! Settings come from an optional `config.toml`, overridden by CLI
//! flags / environment variables. Everything is validated before any
//! task is spawned or any socket is bound.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::policy::FailurePolicy;

/// Fatal startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// No status URL from file, flag or environment.
  #[error("missing required status URL (set --url or exporter.status_url)")]
  MissingStatusUrl,
  /// Status URL is not an http(s) URL.
  #[error("status URL must start with http:// or https://, got '{0}'")]
  InvalidStatusUrl(String),
  /// Poll interval of zero.
  #[error("poll interval must be at least 1 second")]
  InvalidInterval,
  /// Metrics path unusable as a route.
  #[error("metrics path must start with '/' and not clash with /live or /ready, got '{0}'")]
  InvalidMetricsPath(String),
  /// Notify target is not a bare host or `host:port`.
  #[error("notify target must be host or host:port, got '{0}'")]
  InvalidNotifyTarget(String),
  /// Config file could not be read.
  #[error("failed to read config file {path}: {source}")]
  Read {
    /// File path.
    path: String,
    /// Underlying I/O error.
    source: std::io::Error,
  },
  /// Config file is not valid TOML for this schema.
  #[error("failed to parse config file {path}: {source}")]
  Parse {
    /// File path.
    path: String,
    /// Underlying TOML error.
    source: toml::de::Error,
  },
}

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Upstream polling.
  pub exporter: ExporterConfig,
  /// Scrape endpoint.
  pub metrics: MetricsConfig,
  /// Legacy downstream forwarding.
  pub notify: NotifyConfig,
}

/// Upstream polling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
  /// Icecast status endpoint (normally `.../status-json.xsl`).
  pub status_url: String,
  /// Seconds between polls.
  pub poll_interval_seconds: u64,
  /// Behaviour after a failed poll.
  pub failure_policy: FailurePolicy,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
}

impl ExporterConfig {
  /// Poll interval as a `Duration`.
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_seconds)
  }
}

impl Default for ExporterConfig {
  fn default() -> Self {
    Self {
      status_url: String::new(),
      poll_interval_seconds: default_poll_interval(),
      failure_policy: FailurePolicy::default(),
      log_level: default_log_level(),
    }
  }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Interface to bind.
  pub bind_host: String,
  /// Port to listen on for scrapes.
  pub port: u16,
  /// HTTP path serving the exposition text.
  pub path: String,
}

impl MetricsConfig {
  /// `host:port` to bind.
  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.bind_host, self.port)
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      bind_host: default_bind_host(),
      port: default_metrics_port(),
      path: default_metrics_path(),
    }
  }
}

/// VClock forwarding configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
  /// Receiver host or `host:port` (port 80 when omitted). Absent disables forwarding.
  pub target: Option<String>,
}

/// Values supplied on the command line or via environment.
///
/// `None` leaves the file/default value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  /// Status URL.
  pub status_url: Option<String>,
  /// Metrics port.
  pub port: Option<u16>,
  /// Metrics path.
  pub path: Option<String>,
  /// Poll interval in seconds.
  pub poll_interval_seconds: Option<u64>,
  /// VClock target.
  pub notify_target: Option<String>,
  /// Failure policy.
  pub failure_policy: Option<FailurePolicy>,
  /// Log level.
  pub log_level: Option<String>,
}

// Default value functions

fn default_log_level() -> String {
  "info".to_string()
}

fn default_poll_interval() -> u64 {
  15
}

fn default_bind_host() -> String {
  "0.0.0.0".to_string()
}

fn default_metrics_port() -> u16 {
  2112
}

fn default_metrics_path() -> String {
  "/metrics".to_string()
}
