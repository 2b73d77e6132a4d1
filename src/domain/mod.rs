//! Domain layer - Status model and polling policy.
//!
//! Pure types with no I/O (hexagonal architecture inner ring).
//! Adapters decode into these and use cases consume them.

pub mod policy;
pub mod status;

pub use policy::FailurePolicy;
pub use status::{StatusSnapshot, StreamLabels, StreamStatus};
