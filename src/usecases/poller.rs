//! Poll Loop - Fetch, Publish, Forward, Sleep
//!
//! Drives the exporter: every interval it fetches the Icecast status,
//! folds it into the metrics registry and optionally forwards the
//! aggregate listener count downstream. Failures never reach the
//! scrape path; they are logged and handled per `FailurePolicy`.
//!
//! Each tick:
//! 1. `StatusSource::fetch`
//! 2. On success: `MetricsRegistry::record` + readiness
//! 3. On success with a notifier: `ListenerNotifier::notify(total)`
//! 4. On failure: keep old gauges, retry or halt per policy
//! 5. Sleep the configured interval (shutdown-aware)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::metrics::{HealthState, MetricsRegistry};
use crate::domain::policy::FailurePolicy;
use crate::ports::notifier::ListenerNotifier;
use crate::ports::status_source::{FetchError, StatusSource};

/// Why the poll loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Shutdown was broadcast.
    Shutdown,
    /// A fetch failed under `FailurePolicy::FailFast`.
    Halted,
}

/// Background poller publishing Icecast listener counts.
pub struct Poller {
    /// Upstream status provider.
    source: Arc<dyn StatusSource>,
    /// Gauge store shared with the scrape endpoint.
    registry: Arc<MetricsRegistry>,
    /// Readiness shared with the health probes.
    health: Arc<HealthState>,
    /// Optional legacy downstream receiver.
    notifier: Option<Arc<dyn ListenerNotifier>>,
    /// Sleep between ticks.
    interval: Duration,
    /// Reaction to a failed fetch.
    policy: FailurePolicy,
}

impl Poller {
    /// Create a poller without a downstream notifier.
    pub fn new(
        source: Arc<dyn StatusSource>,
        registry: Arc<MetricsRegistry>,
        health: Arc<HealthState>,
        interval: Duration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            source,
            registry,
            health,
            notifier: None,
            interval,
            policy,
        }
    }

    /// Forward the aggregate listener count after every successful poll.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn ListenerNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run a single tick. Returns the number of series written.
    ///
    /// Gauges are untouched when the fetch fails.
    pub async fn poll_once(&self) -> Result<usize, FetchError> {
        let snapshot = self.source.fetch().await?;

        let written = self.registry.record(&snapshot);
        self.health.mark_polled();

        let total = snapshot.total_listeners();
        debug!(streams = written, listeners = total, "Listener gauges updated");

        if let Some(notifier) = &self.notifier {
            notifier.notify(total).await;
        }

        Ok(written)
    }

    /// Poll until shutdown, or until the first failure under fail-fast.
    ///
    /// Shutdown is honoured both while a tick is in flight and while
    /// sleeping, so a hung upstream never delays process exit.
    #[instrument(skip(self, shutdown_rx), fields(source = %self.source.describe()))]
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> PollExit {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            policy = %self.policy,
            notify = self.notifier.is_some(),
            "Poll loop started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Poll loop received shutdown signal");
                    return PollExit::Shutdown;
                }
                outcome = self.poll_once() => outcome,
            };

            if let Err(e) = outcome {
                if self.policy.halts_on_failure() {
                    error!(
                        error = %e,
                        kind = ?e.kind(),
                        "Error polling Icecast endpoint, polling stopped (fail-fast)"
                    );
                    self.health.mark_halted();
                    return PollExit::Halted;
                }

                warn!(
                    error = %e,
                    kind = ?e.kind(),
                    retry_in_secs = self.interval.as_secs_f64(),
                    "Error polling Icecast endpoint, trying again after interval"
                );
            }

            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Poll loop received shutdown signal");
                    return PollExit::Shutdown;
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
