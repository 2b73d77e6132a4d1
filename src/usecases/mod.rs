//! Use Cases Layer - Application Orchestration
//!
//! Wires ports and adapters into the exporter's long-running tasks.

pub mod poller;

pub use poller::{PollExit, Poller};
