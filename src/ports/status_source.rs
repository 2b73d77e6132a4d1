//! Status Source Port - Upstream Status Interface
//!
//! Defines the trait the poll loop uses to obtain a fresh
//! `StatusSnapshot`. The Icecast HTTP adapter implements it;
//! tests substitute mocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::status::StatusSnapshot;

/// Coarse classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
  /// Transport-level failure.
  Network,
  /// Body could not be decoded into a status document.
  Decode,
}

/// Failure of a single status fetch.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Connection refused, DNS failure, or body read error.
  #[error("status request failed: {0}")]
  Network(#[from] reqwest::Error),
  /// Response body was not a valid status document.
  #[error("status body could not be decoded: {0}")]
  Decode(#[from] serde_json::Error),
}

impl FetchError {
  /// Which kind of failure this is.
  pub fn kind(&self) -> FetchErrorKind {
    match self {
      Self::Network(_) => FetchErrorKind::Network,
      Self::Decode(_) => FetchErrorKind::Decode,
    }
  }
}

/// Trait for upstream status providers.
///
/// One call is one attempt: implementors must not retry internally,
/// retry cadence belongs to the poll loop.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
  /// Fetch and decode the current status document.
  async fn fetch(&self) -> Result<StatusSnapshot, FetchError>;

  /// Human-readable description of the upstream, used in logs.
  fn describe(&self) -> String;
}
