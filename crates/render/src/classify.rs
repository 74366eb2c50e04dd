//! Record and content-item classification.
//!
//! Classification never fails: every record maps to exactly one
//! [`RecordKind`] and every content item to exactly one [`ItemKind`], with
//! explicit fallbacks for shapes nobody anticipated.

use clawtrail_core::event::{ContentItem, RawEvent, Role};
use serde_json::Value;

use crate::marker::{ForwardMarker, extract_forward_marker, has_inbound_envelope};

/// Families of tool calls that share a rendering rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Read,
    Write,
    Edit,
    Shell,
    Search,
    Fetch,
    Message,
    Browser,
    Memory,
    Session,
    Generic,
}

impl ToolKind {
    /// Map a tool name to its family. Names are matched exactly except for
    /// session tools, which match on a case-insensitive substring.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Read" => ToolKind::Read,
            "Write" => ToolKind::Write,
            "Edit" => ToolKind::Edit,
            "bash" | "exec" | "Bash" => ToolKind::Shell,
            "web_search" => ToolKind::Search,
            "web_fetch" => ToolKind::Fetch,
            "message" => ToolKind::Message,
            "browser" => ToolKind::Browser,
            "memory_search" | "memory_get" => ToolKind::Memory,
            _ if name.to_lowercase().contains("session") => ToolKind::Session,
            _ => ToolKind::Generic,
        }
    }

    /// Leading icon of every line rendered for this family.
    pub fn icon(self) -> &'static str {
        match self {
            ToolKind::Read => "📂",
            ToolKind::Write => "💾",
            ToolKind::Edit => "✏️",
            ToolKind::Shell => "⚡",
            ToolKind::Search => "🔎",
            ToolKind::Fetch => "🌐",
            ToolKind::Message => "💬",
            ToolKind::Browser => "🖥️",
            ToolKind::Memory => "🧠",
            ToolKind::Session => "📡",
            ToolKind::Generic => "🔧",
        }
    }
}

/// What a single content item is.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind<'a> {
    Thinking(&'a str),
    ToolCall {
        kind: ToolKind,
        name: &'a str,
        arguments: &'a Value,
    },
    Text(&'a str),
    /// Text carrying an inbound-message envelope; the marker is present
    /// when both source tokens could be extracted.
    Reference(Option<ForwardMarker>),
    /// Empty or unrecognized item
    Empty,
}

/// Classify one content item.
pub fn classify_item(item: &ContentItem) -> ItemKind<'_> {
    match item {
        ContentItem::Thinking { thinking } if !thinking.is_empty() => ItemKind::Thinking(thinking),
        ContentItem::ToolCall { name, arguments } => ItemKind::ToolCall {
            kind: ToolKind::from_name(name),
            name,
            arguments,
        },
        ContentItem::Text { text } if !text.is_empty() => classify_text(text),
        _ => ItemKind::Empty,
    }
}

fn classify_text(text: &str) -> ItemKind<'_> {
    match extract_forward_marker(text) {
        Some(marker) => ItemKind::Reference(Some(marker)),
        None if has_inbound_envelope(text) => ItemKind::Reference(None),
        None => ItemKind::Text(text),
    }
}

/// Why a record produces no delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Role other than user, assistant, or toolResult
    UnhandledRole,
    /// A user record without a complete forwarding marker
    UserWithoutMarker,
    /// An assistant record whose content is not an item list
    NoContentItems,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            IgnoreReason::UnhandledRole => "unhandled role",
            IgnoreReason::UserWithoutMarker => "user message without forwarding marker",
            IgnoreReason::NoContentItems => "assistant message without content items",
        };
        f.write_str(reason)
    }
}

/// What a whole record asks the stream processor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind<'a> {
    /// Mirror the referenced inbound message
    InboundForward(ForwardMarker),
    /// Render every item of one agent turn into a single post
    AssistantTurn(&'a [ContentItem]),
    /// Render a tool result
    ToolResult { text: String, is_error: bool },
    Ignored(IgnoreReason),
}

/// Classify one record.
pub fn classify_record(event: &RawEvent) -> RecordKind<'_> {
    match event.role {
        Role::User => event
            .content
            .texts()
            .into_iter()
            .find_map(extract_forward_marker)
            .map(RecordKind::InboundForward)
            .unwrap_or(RecordKind::Ignored(IgnoreReason::UserWithoutMarker)),
        Role::Assistant => match event.content.items() {
            [] => RecordKind::Ignored(IgnoreReason::NoContentItems),
            items => RecordKind::AssistantTurn(items),
        },
        Role::ToolResult => RecordKind::ToolResult {
            text: event.content.result_text(),
            is_error: event.is_error(),
        },
        Role::Other => RecordKind::Ignored(IgnoreReason::UnhandledRole),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(line: &str) -> RawEvent {
        RawEvent::from_line(line).unwrap()
    }

    #[test]
    fn tool_families() {
        assert_eq!(ToolKind::from_name("Read"), ToolKind::Read);
        assert_eq!(ToolKind::from_name("exec"), ToolKind::Shell);
        assert_eq!(ToolKind::from_name("Bash"), ToolKind::Shell);
        assert_eq!(ToolKind::from_name("memory_get"), ToolKind::Memory);
        assert_eq!(ToolKind::from_name("sessions_spawn"), ToolKind::Session);
        assert_eq!(ToolKind::from_name("ListSessions"), ToolKind::Session);
        assert_eq!(ToolKind::from_name("read"), ToolKind::Generic);
        assert_eq!(ToolKind::from_name("cron"), ToolKind::Generic);
    }

    #[test]
    fn empty_items_classify_as_empty() {
        let thinking = ContentItem::Thinking {
            thinking: String::new(),
        };
        let text = ContentItem::Text {
            text: String::new(),
        };
        assert_eq!(classify_item(&thinking), ItemKind::Empty);
        assert_eq!(classify_item(&text), ItemKind::Empty);
        assert_eq!(classify_item(&ContentItem::Unknown), ItemKind::Empty);
    }

    #[test]
    fn envelope_text_is_a_reference() {
        let with_marker = ContentItem::Text {
            text: "[Discord #ops channel id:1] bob: hi [message_id: 2]".into(),
        };
        let envelope_only = ContentItem::Text {
            text: "[Discord #ops] bob: hi".into(),
        };
        assert!(matches!(
            classify_item(&with_marker),
            ItemKind::Reference(Some(_))
        ));
        assert_eq!(classify_item(&envelope_only), ItemKind::Reference(None));
    }

    #[test]
    fn tool_call_keeps_arguments() {
        let item = ContentItem::ToolCall {
            name: "web_fetch".into(),
            arguments: json!({"url": "https://example.com/a"}),
        };
        match classify_item(&item) {
            ItemKind::ToolCall {
                kind, arguments, ..
            } => {
                assert_eq!(kind, ToolKind::Fetch);
                assert_eq!(arguments["url"], "https://example.com/a");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn user_record_with_marker_is_a_forward() {
        let event = record(
            r#"{"message":{"role":"user","content":[
                {"type":"text","text":"no marker here"},
                {"type":"text","text":"[Discord channel id:42 ...] hi [message_id: 7]"}
            ]}}"#,
        );
        assert_eq!(
            classify_record(&event),
            RecordKind::InboundForward(ForwardMarker {
                channel_id: "42".into(),
                message_id: "7".into(),
            })
        );
    }

    #[test]
    fn user_record_with_half_marker_is_ignored() {
        let event = record(r#"{"message":{"role":"user","content":"channel id:42 only"}}"#);
        assert_eq!(
            classify_record(&event),
            RecordKind::Ignored(IgnoreReason::UserWithoutMarker)
        );
    }

    #[test]
    fn record_roles() {
        let turn = record(r#"{"message":{"role":"assistant","content":[{"type":"text","text":"x"}]}}"#);
        assert!(matches!(classify_record(&turn), RecordKind::AssistantTurn(items) if items.len() == 1));

        let bare = record(r#"{"message":{"role":"assistant","content":"just text"}}"#);
        assert_eq!(
            classify_record(&bare),
            RecordKind::Ignored(IgnoreReason::NoContentItems)
        );

        let result = record(r#"{"message":{"role":"toolResult","isError":true,"content":"boom"}}"#);
        assert_eq!(
            classify_record(&result),
            RecordKind::ToolResult {
                text: "boom".into(),
                is_error: true
            }
        );

        let system = record(r#"{"message":{"role":"system","content":"x"}}"#);
        assert_eq!(
            classify_record(&system),
            RecordKind::Ignored(IgnoreReason::UnhandledRole)
        );
    }
}
