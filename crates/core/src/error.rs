//! Error types for the clawtrail domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the chat platform.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Fetching messages from {channel} failed: {reason}")]
    FetchFailed { channel: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Failures reading or writing the persisted dedup state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read state file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse state file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write state file at {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}
