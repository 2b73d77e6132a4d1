//! Downstream Notifier Adapters
//!
//! Implementations of the `ListenerNotifier` port.

pub mod vclock;

pub use vclock::VClockNotifier;
