//! Upstream Status Adapters
//!
//! HTTP implementation of the `StatusSource` port for Icecast.

pub mod icecast;

pub use icecast::IcecastStatusClient;
