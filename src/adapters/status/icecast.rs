//! Icecast Status Client - `status-json.xsl` Fetcher
//!
//! Wraps reqwest for a single plain GET against the Icecast status
//! endpoint. No custom headers, no timeout override and no retries:
//! the poll loop owns retry cadence.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::domain::status::StatusSnapshot;
use crate::ports::status_source::{FetchError, StatusSource};

/// HTTP adapter for an Icecast status endpoint.
#[derive(Debug, Clone)]
pub struct IcecastStatusClient {
  /// Underlying HTTP client.
  http: Client,
  /// Fully-qualified status URL.
  url: String,
}

impl IcecastStatusClient {
  /// Create a client for the given status URL.
  pub fn new(url: impl Into<String>) -> Result<Self> {
    let http = Client::builder()
      .pool_max_idle_per_host(1)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      url: url.into(),
    })
  }

  /// The status URL being polled.
  pub fn url(&self) -> &str {
    &self.url
  }
}

#[async_trait]
impl StatusSource for IcecastStatusClient {
  #[instrument(skip(self), fields(url = %self.url))]
  async fn fetch(&self) -> Result<StatusSnapshot, FetchError> {
    let response = self.http.get(&self.url).send().await?;

    // Status is not checked: the body is decoded whatever it is.
    let status = response.status();
    if !status.is_success() {
      debug!(status = %status, "Non-success status from Icecast, decoding anyway");
    }

    // Reading the whole body hands the connection back to the pool.
    let body = response.bytes().await?;
    let snapshot = StatusSnapshot::from_json(&body)?;

    debug!(streams = snapshot.streams().len(), "Icecast status decoded");
    Ok(snapshot)
  }

  fn describe(&self) -> String {
    self.url().to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ports::status_source::FetchErrorKind;

  use axum::http::StatusCode;
  use axum::routing::get;
  use axum::Router;

  /// Serve a fixed response on an ephemeral port and return its URL.
  async fn serve_fixed(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
      "/status-json.xsl",
      get(move || async move { (status, body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/status-json.xsl")
  }

  #[tokio::test]
  async fn test_fetch_single_source() {
    let url = serve_fixed(
      StatusCode::OK,
      r#"{"icestats":{"source":{"listeners":5,"server_name":"A"}}}"#,
    )
    .await;
    let client = IcecastStatusClient::new(url).unwrap();

    let snapshot = client.fetch().await.unwrap();
    assert_eq!(snapshot.streams().len(), 1);
    assert_eq!(snapshot.streams()[0].listener_count, 5);
    assert_eq!(snapshot.streams()[0].stream_name, "A");
  }

  #[tokio::test]
  async fn test_non_success_status_still_decoded() {
    let url = serve_fixed(
      StatusCode::SERVICE_UNAVAILABLE,
      r#"{"icestats":{"source":[{"listeners":1,"server_name":"X"}]}}"#,
    )
    .await;
    let client = IcecastStatusClient::new(url).unwrap();

    let snapshot = client.fetch().await.unwrap();
    assert_eq!(snapshot.total_listeners(), 1);
  }

  #[tokio::test]
  async fn test_garbage_body_is_decode_error() {
    let url = serve_fixed(StatusCode::OK, "<html>not json</html>").await;
    let client = IcecastStatusClient::new(url).unwrap();

    let err = client.fetch().await.unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::Decode);
  }

  #[tokio::test]
  async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
      IcecastStatusClient::new(format!("http://{addr}/status-json.xsl")).unwrap();

    let err = client.fetch().await.unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::Network);
    assert_eq!(client.describe(), client.url());
  }
}
