//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the poll loop requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `StatusSource`: Upstream Icecast status fetching
//! - `ListenerNotifier`: Legacy downstream listener mirroring

pub mod notifier;
pub mod status_source;

pub use notifier::ListenerNotifier;
pub use status_source::{FetchError, FetchErrorKind, StatusSource};
