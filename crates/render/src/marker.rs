//! Forwarding-marker extraction.
//!
//! Inbound chat messages reach the agent wrapped in an envelope that names
//! where they came from, e.g.
//!
//! ```text
//! [Discord Guild #general channel id:1203 ...] alice: hi [message_id: 9981]
//! ```
//!
//! Grammar: a channel token `channel id:<digits>` and a message token
//! `[message_id: <digits>]`, anywhere in the text, in either order. Both
//! must be present for the text to count as a forward instruction.

use regex_lite::Regex;
use std::sync::LazyLock;

static CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"channel id:(\d+)").expect("static regex"));
static MESSAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[message_id: (\d+)\]").expect("static regex"));

/// Prefix of the envelope the chat bridge wraps inbound messages in.
const INBOUND_ENVELOPE: &str = "[Discord";

/// Source coordinates of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardMarker {
    pub channel_id: String,
    pub message_id: String,
}

/// Extract both tokens from `text`; `None` unless both are present.
pub fn extract_forward_marker(text: &str) -> Option<ForwardMarker> {
    let channel_id = channel_token(text)?;
    let message_id = message_token(text)?;
    Some(ForwardMarker {
        channel_id: channel_id.to_string(),
        message_id: message_id.to_string(),
    })
}

/// Whether `text` carries an inbound-message envelope, marker or not.
pub fn has_inbound_envelope(text: &str) -> bool {
    text.contains(INBOUND_ENVELOPE)
}

fn channel_token(text: &str) -> Option<&str> {
    CHANNEL_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn message_token(text: &str) -> Option<&str> {
    MESSAGE_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str =
        "[Discord Guild #ops channel id:1203456 +2m] alice: deploy please\n[message_id: 998877]";

    #[test]
    fn both_tokens_yield_marker() {
        let marker = extract_forward_marker(ENVELOPE).unwrap();
        assert_eq!(marker.channel_id, "1203456");
        assert_eq!(marker.message_id, "998877");
    }

    #[test]
    fn token_order_does_not_matter() {
        let marker = extract_forward_marker("[message_id: 5] then channel id:7").unwrap();
        assert_eq!(marker.channel_id, "7");
        assert_eq!(marker.message_id, "5");
    }

    #[test]
    fn channel_token_alone_is_not_a_marker() {
        assert!(extract_forward_marker("see channel id:1203456 for details").is_none());
    }

    #[test]
    fn message_token_alone_is_not_a_marker() {
        assert!(extract_forward_marker("reply to [message_id: 998877]").is_none());
    }

    #[test]
    fn tokens_must_be_numeric_and_exact() {
        assert!(extract_forward_marker("channel id:abc [message_id: 1]").is_none());
        assert!(extract_forward_marker("channel id: 12 [message_id: 1]").is_none());
        assert!(extract_forward_marker("channel id:12 [message_id:1]").is_none());
    }

    #[test]
    fn envelope_detection() {
        assert!(has_inbound_envelope(ENVELOPE));
        assert!(!has_inbound_envelope("plain reply"));
    }
}
