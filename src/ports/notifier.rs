//! Listener Notifier Port - Downstream Mirroring Interface
//!
//! Best-effort forwarding of the aggregate listener count to a
//! legacy receiver. Infallible from the caller's point of view.

use async_trait::async_trait;

/// Trait for downstream listener-count receivers.
#[async_trait]
pub trait ListenerNotifier: Send + Sync + 'static {
  /// Forward the aggregate listener count.
  ///
  /// Implementations swallow every error and never retry.
  async fn notify(&self, aggregate_count: u64);
}
