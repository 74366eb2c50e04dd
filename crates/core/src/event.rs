//! Event log records.
//!
//! Each line of an agent session log is a JSON envelope of the form
//! `{"message": {"role": .., "content": .., "isError": ..}}`.
//! Records are modelled as closed unions with explicit fallbacks, so an
//! unexpected shape degrades to "nothing to render" instead of an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Who produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Role {
    /// Inbound message relayed to the agent
    #[serde(rename = "user")]
    User,
    /// An agent turn: thinking, tool calls, and text
    #[serde(rename = "assistant")]
    Assistant,
    /// Output of a tool invocation
    #[serde(rename = "toolResult")]
    ToolResult,
    /// Anything else (system prompts, custom roles, missing role)
    #[default]
    #[serde(other)]
    Other,
}

/// One decoded log record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub content: Content,

    /// Failure flag on `toolResult` records; any JSON value, read by
    /// truthiness.
    #[serde(default)]
    pub is_error: Value,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    message: RawEvent,
}

impl RawEvent {
    /// Decode one log line. A line without a `message` object decodes to an
    /// event with role [`Role::Other`].
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Envelope>(line).map(|envelope| envelope.message)
    }

    /// `false`, `0`, `""`, `[]`, `{}`, `null` and a missing flag are not
    /// errors; everything else is.
    pub fn is_error(&self) -> bool {
        match &self.is_error {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
        }
    }
}

/// Message content: either a plain string or a list of typed items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Items(Vec<ContentItem>),
    Other(Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Other(Value::Null)
    }
}

impl Content {
    /// Typed items; plain-string content has none.
    pub fn items(&self) -> &[ContentItem] {
        match self {
            Content::Items(items) => items,
            _ => &[],
        }
    }

    /// All text bodies, in order: the string itself or every `text` item.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Content::Text(text) => vec![text.as_str()],
            Content::Items(items) => items
                .iter()
                .filter_map(|item| match item {
                    ContentItem::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            Content::Other(_) => Vec::new(),
        }
    }

    /// The text a tool result carries: the string content, or the first
    /// `text` item of a list. Scalars are stringified.
    pub fn result_text(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Items(_) => self.texts().first().map(|t| t.to_string()).unwrap_or_default(),
            Content::Other(Value::Null) => String::new(),
            Content::Other(Value::String(s)) => s.clone(),
            Content::Other(other) => other.to_string(),
        }
    }
}

/// A typed content item inside a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    /// Free-form reasoning
    Thinking { thinking: String },
    /// A tool invocation with its argument object
    ToolCall { name: String, arguments: Value },
    /// Plain text (may carry an inbound-message reference)
    Text { text: String },
    /// Any item whose shape is not recognized
    Unknown,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TaggedItem {
    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    #[serde(rename = "toolCall")]
    ToolCall {
        #[serde(default = "unnamed_tool")]
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
}

fn unnamed_tool() -> String {
    "?".into()
}

impl<'de> Deserialize<'de> for ContentItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match serde_json::from_value::<TaggedItem>(value) {
            Ok(TaggedItem::Thinking { thinking }) => ContentItem::Thinking { thinking },
            Ok(TaggedItem::ToolCall { name, arguments }) => {
                ContentItem::ToolCall { name, arguments }
            }
            Ok(TaggedItem::Text { text }) => ContentItem::Text { text },
            Err(_) => ContentItem::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assistant_turn() {
        let line = r#"{"message":{"role":"assistant","content":[
            {"type":"thinking","thinking":"hmm"},
            {"type":"toolCall","name":"Read","arguments":{"path":"/tmp/x"}},
            {"type":"text","text":"done"}
        ]}}"#;
        let event = RawEvent::from_line(line).unwrap();
        assert_eq!(event.role, Role::Assistant);
        let items = event.content.items();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            ContentItem::Thinking {
                thinking: "hmm".into()
            }
        );
        assert!(matches!(&items[1], ContentItem::ToolCall { name, .. } if name == "Read"));
        assert_eq!(event.content.texts(), vec!["done"]);
    }

    #[test]
    fn unknown_items_do_not_fail_the_record() {
        let line = r#"{"message":{"role":"assistant","content":[
            "bare string",
            {"type":"image","data":"..."},
            {"type":"thinking","thinking":null},
            {"type":"text","text":"kept"}
        ]}}"#;
        let event = RawEvent::from_line(line).unwrap();
        let items = event.content.items();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], ContentItem::Unknown);
        assert_eq!(items[1], ContentItem::Unknown);
        assert_eq!(items[2], ContentItem::Unknown);
        assert_eq!(items[3], ContentItem::Text { text: "kept".into() });
    }

    #[test]
    fn tool_call_defaults() {
        let line = r#"{"message":{"role":"assistant","content":[{"type":"toolCall"}]}}"#;
        let event = RawEvent::from_line(line).unwrap();
        match &event.content.items()[0] {
            ContentItem::ToolCall { name, arguments } => {
                assert_eq!(name, "?");
                assert!(arguments.is_null());
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn tool_result_fields() {
        let line = r#"{"message":{"role":"toolResult","toolName":"exec","isError":true,"content":"disk full"}}"#;
        let event = RawEvent::from_line(line).unwrap();
        assert_eq!(event.role, Role::ToolResult);
        assert!(event.is_error());
        assert_eq!(event.content.result_text(), "disk full");
    }

    #[test]
    fn loosely_typed_flags_still_decode() {
        let line = r#"{"message":{"role":"toolResult","toolName":7,"isError":"true","content":"boom"}}"#;
        let event = RawEvent::from_line(line).unwrap();
        assert!(event.is_error());
        assert_eq!(event.content.result_text(), "boom");

        for (flag, expected) in [("1", true), ("0", false), ("false", false), ("\"\"", false), ("null", false)] {
            let line = format!(r#"{{"message":{{"role":"toolResult","isError":{flag},"content":"x"}}}}"#);
            let event = RawEvent::from_line(&line).unwrap();
            assert_eq!(event.is_error(), expected, "isError = {flag}");
        }
    }

    #[test]
    fn result_text_takes_first_text_item() {
        let content: Content = serde_json::from_str(
            r#"[{"type":"image"},{"type":"text","text":"first"},{"type":"text","text":"second"}]"#,
        )
        .unwrap();
        assert_eq!(content.result_text(), "first");
        assert_eq!(Content::default().result_text(), "");
        assert_eq!(Content::Other(serde_json::json!(42)).result_text(), "42");
    }

    #[test]
    fn unknown_role_and_missing_message() {
        let event = RawEvent::from_line(r#"{"message":{"role":"system","content":"x"}}"#).unwrap();
        assert_eq!(event.role, Role::Other);

        let event = RawEvent::from_line(r#"{"type":"session","id":"abc"}"#).unwrap();
        assert_eq!(event.role, Role::Other);
        assert!(!event.is_error());
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(RawEvent::from_line("not json").is_err());
        assert!(RawEvent::from_line(r#"{"message":{"role":"assistant""#).is_err());
    }
}
