//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, layering CLI/env overrides on top,
//! validating every parameter, and providing clear error messages
//! for misconfiguration.

use std::path::Path;

use tracing::debug;

use super::{AppConfig, ConfigError, ConfigOverrides};

/// Build the effective configuration.
///
/// # Arguments
/// * `path` - Optional path to a config.toml file
/// * `overrides` - CLI/env values taking precedence over the file
///
/// # Errors
/// Returns a `ConfigError` if:
/// - The file can't be read or parsed
/// - No status URL was supplied anywhere
/// - Validation rules are violated
pub fn load_config(
  path: Option<&str>,
  overrides: ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
  let mut config = match path {
    Some(path) => read_config_file(path)?,
    None => AppConfig::default(),
  };

  apply_overrides(&mut config, overrides);
  validate_config(&config)?;

  debug!(file = ?path, "Configuration resolved");
  Ok(config)
}

/// Read and parse a TOML config file.
pub fn read_config_file(path: &str) -> Result<AppConfig, ConfigError> {
  let display = Path::new(path).display().to_string();

  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: display.clone(),
    source,
  })?;

  toml::from_str(&content).map_err(|source| ConfigError::Parse {
    path: display,
    source,
  })
}

/// Layer overrides onto a config. Empty notify targets disable forwarding.
pub fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
  if let Some(url) = overrides.status_url {
    config.exporter.status_url = url;
  }
  if let Some(port) = overrides.port {
    config.metrics.port = port;
  }
  if let Some(path) = overrides.path {
    config.metrics.path = path;
  }
  if let Some(secs) = overrides.poll_interval_seconds {
    config.exporter.poll_interval_seconds = secs;
  }
  if let Some(target) = overrides.notify_target {
    config.notify.target = Some(target);
  }
  if let Some(policy) = overrides.failure_policy {
    config.exporter.failure_policy = policy;
  }
  if let Some(level) = overrides.log_level {
    config.exporter.log_level = level;
  }

  config.notify.target = config
    .notify
    .target
    .take()
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty());
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A non-empty http(s) status URL
/// - A positive poll interval
/// - A routable metrics path that doesn't shadow the probes
/// - A notify target that is a bare host or `host:port`
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
  let url = config.exporter.status_url.trim();
  if url.is_empty() {
    return Err(ConfigError::MissingStatusUrl);
  }
  if !(url.starts_with("http://") || url.starts_with("https://")) {
    return Err(ConfigError::InvalidStatusUrl(url.to_string()));
  }

  if config.exporter.poll_interval_seconds == 0 {
    return Err(ConfigError::InvalidInterval);
  }

  let path = config.metrics.path.as_str();
  if !path.starts_with('/') || path == "/live" || path == "/ready" {
    return Err(ConfigError::InvalidMetricsPath(path.to_string()));
  }

  if let Some(target) = &config.notify.target {
    if target.contains('/') || target.starts_with(':') {
      return Err(ConfigError::InvalidNotifyTarget(target.clone()));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::policy::FailurePolicy;

  fn with_url(url: &str) -> ConfigOverrides {
    ConfigOverrides {
      status_url: Some(url.to_string()),
      ..ConfigOverrides::default()
    }
  }

  #[test]
  fn test_missing_url_is_fatal() {
    let err = load_config(None, ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingStatusUrl));
  }

  #[test]
  fn test_defaults() {
    let config =
      load_config(None, with_url("http://icecast.example.com/status-json.xsl")).unwrap();

    assert_eq!(config.metrics.port, 2112);
    assert_eq!(config.metrics.path, "/metrics");
    assert_eq!(config.metrics.bind_address(), "0.0.0.0:2112");
    assert_eq!(config.exporter.poll_interval_seconds, 15);
    assert_eq!(config.exporter.failure_policy, FailurePolicy::Resilient);
    assert!(config.notify.target.is_none());
  }

  #[test]
  fn test_load_nonexistent_file() {
    let err = load_config(Some("nonexistent.toml"), with_url("http://x/")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }

  #[test]
  fn test_toml_then_overrides() {
    let mut config: AppConfig = toml::from_str(
      r#"
        [exporter]
        status_url = "http://file/status-json.xsl"
        poll_interval_seconds = 30
        failure_policy = "fail-fast"

        [metrics]
        port = 9100

        [notify]
        target = "clock.local:80"
      "#,
    )
    .unwrap();

    apply_overrides(
      &mut config,
      ConfigOverrides {
        poll_interval_seconds: Some(5),
        ..ConfigOverrides::default()
      },
    );
    validate_config(&config).unwrap();

    assert_eq!(config.exporter.status_url, "http://file/status-json.xsl");
    assert_eq!(config.exporter.poll_interval_seconds, 5);
    assert_eq!(config.exporter.failure_policy, FailurePolicy::FailFast);
    assert_eq!(config.metrics.port, 9100);
    assert_eq!(config.metrics.path, "/metrics");
    assert_eq!(config.notify.target.as_deref(), Some("clock.local:80"));
  }

  #[test]
  fn test_empty_notify_target_disables_forwarding() {
    let mut config = AppConfig::default();
    apply_overrides(
      &mut config,
      ConfigOverrides {
        notify_target: Some("  ".to_string()),
        ..with_url("http://x/")
      },
    );
    assert!(config.notify.target.is_none());
  }

  #[test]
  fn test_validation_rules() {
    let base = || {
      let mut c = AppConfig::default();
      c.exporter.status_url = "http://x/status-json.xsl".to_string();
      c
    };

    let mut c = base();
    c.exporter.status_url = "icecast.local/status".to_string();
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidStatusUrl(_))));

    let mut c = base();
    c.exporter.poll_interval_seconds = 0;
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidInterval)));

    let mut c = base();
    c.metrics.path = "metrics".to_string();
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidMetricsPath(_))));

    let mut c = base();
    c.metrics.path = "/ready".to_string();
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidMetricsPath(_))));

    let mut c = base();
    c.notify.target = Some("http://clock:80".to_string());
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidNotifyTarget(_))));

    let mut c = base();
    c.notify.target = Some(":8080".to_string());
    assert!(matches!(validate_config(&c), Err(ConfigError::InvalidNotifyTarget(_))));

    let mut c = base();
    c.notify.target = Some("clock.local".to_string());
    assert!(validate_config(&c).is_ok());

    assert!(validate_config(&base()).is_ok());
  }
}
