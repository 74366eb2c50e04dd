//! Forwarding of agent-authored chat messages into the audit channel.
//!
//! [`DedupTracker`] polls the watched channels and forwards each message the
//! agent wrote exactly once per persisted state; [`DedupStateStore`] is the
//! crash-safe record of what has already been forwarded.

pub mod state;
pub mod tracker;

pub use state::DedupStateStore;
pub use tracker::{CycleReport, DedupTracker, TrackerSettings};
