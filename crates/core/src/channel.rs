//! Transport traits — the abstraction over the chat platform.
//!
//! The audit pipeline needs exactly three things from a chat platform: post
//! text, post a forward-style reference to an existing message, and list the
//! most recent messages of a channel. Implementations handle authentication,
//! HTTP, and platform-specific payloads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Longest text the pipeline will post in one message. Discord allows 2000;
/// the remainder is headroom for platform-side escaping.
pub const MAX_MESSAGE_CHARS: usize = 1950;

/// Clip `text` to [`MAX_MESSAGE_CHARS`] characters (not bytes).
pub fn clip_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// A message returned by [`MessageSource::fetch_recent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedMessage {
    /// Platform message ID
    pub id: String,
    /// Platform user ID of the author
    pub author_id: String,
}

/// Acknowledgement of a successful post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// ID of the message created in the destination, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// A message mirrored from a source channel into the audit destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRecord {
    pub source_channel_id: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_message_id: Option<String>,
    pub forwarded_at: DateTime<Utc>,
}

/// Outbound half of the transport.
///
/// Calls are best-effort: no internal retries, a failure is reported to the
/// caller and the caller decides whether it ever matters.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Human-readable sink name (e.g., "discord", "console").
    fn name(&self) -> &str;

    /// Post plain text to `destination`.
    async fn post(&self, destination: &str, text: &str) -> Result<DeliveryReceipt, ChannelError>;

    /// Post a forward-style reference to `source_message` in `source_channel`.
    async fn post_reference(
        &self,
        destination: &str,
        source_channel: &str,
        source_message: &str,
    ) -> Result<DeliveryReceipt, ChannelError>;
}

/// Inbound half of the transport, used by the forwarding tracker.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// The most recent `limit` messages of `channel`, oldest first.
    async fn fetch_recent(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>, ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_leaves_short_text_alone() {
        assert_eq!(clip_message("hello"), "hello");
        let exact = "x".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(clip_message(&exact).len(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn clip_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_MESSAGE_CHARS + 10);
        let clipped = clip_message(&text);
        assert_eq!(clipped.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn forward_record_serialization() {
        let record = ForwardRecord {
            source_channel_id: "111".into(),
            message_id: "222".into(),
            destination_message_id: None,
            forwarded_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""message_id":"222""#));
        assert!(!json.contains("destination_message_id"));
    }
}
