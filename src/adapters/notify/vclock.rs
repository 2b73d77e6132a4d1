//! VClock Notifier - Legacy Listener Count Forwarding
//!
//! Mirrors the aggregate listener count into a VClock receiver by
//! setting its `Listeners` memory slot over a plain GET. The request
//! runs on its own task so a stalled receiver never holds up polling;
//! the answer is never inspected and failures are dropped silently.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::ports::notifier::ListenerNotifier;

/// Upper bound on one request, so unanswered sends don't pile up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fire-and-forget client for a VClock host or `host:port` target.
#[derive(Debug, Clone)]
pub struct VClockNotifier {
    /// Underlying HTTP client.
    http: Client,
    /// Receiver address as host or `host:port`.
    target: String,
}

impl VClockNotifier {
    /// Create a notifier for the given host or `host:port` target.
    pub fn new(target: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build VClock HTTP client")?;

        Ok(Self {
            http,
            target: target.into(),
        })
    }

    /// Request URL carrying the given listener count.
    pub fn command_url(&self, aggregate_count: u64) -> String {
        format!(
            "http://{}/?Command=SetMem=Listeners,{}",
            self.target, aggregate_count
        )
    }
}

#[async_trait]
impl ListenerNotifier for VClockNotifier {
    async fn notify(&self, aggregate_count: u64) {
        let request = self.http.get(self.command_url(aggregate_count));
        tokio::spawn(async move {
            let _ = request.send().await;
        });
    }
}
