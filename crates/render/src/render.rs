//! Display rendering for classified content.
//!
//! Each function turns one classified piece of a record into one
//! Discord-markdown line. Every line starts with a fixed icon so the audit
//! channel can be skimmed by shape.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use clawtrail_core::event::ContentItem;

use crate::classify::{ItemKind, ToolKind, classify_item};
use crate::truncate::{take_chars, truncate};

const THINKING_LIMIT: usize = 250;
const TEXT_LIMIT: usize = 200;
const SHELL_LIMIT: usize = 150;
const SHELL_FIRST_LINE_LIMIT: usize = 80;
const SEARCH_LIMIT: usize = 100;
const FETCH_FALLBACK_LIMIT: usize = 50;
const SUCCESS_PHRASE_LIMIT: usize = 80;
const ERROR_LIMIT: usize = 150;
const PREVIEW_LINE_LIMIT: usize = 80;
const RESULT_LIMIT: usize = 120;

static URL_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"://([^/]+)").expect("static regex"));
static SUCCESS_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Successfully (\w+ \d+ \w+ to .+|.{20,60})").expect("static regex")
});

/// Render a whole assistant turn: one line per non-empty item, in order,
/// newline-joined. `None` when no item renders.
pub fn render_turn(items: &[ContentItem]) -> Option<String> {
    let lines: Vec<String> = items
        .iter()
        .filter_map(|item| render_item(&classify_item(item)))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Render one classified item. References and empty items render nothing.
pub fn render_item(item: &ItemKind<'_>) -> Option<String> {
    match item {
        ItemKind::Thinking(thinking) => Some(format!(">>> 💭 {}", truncate(thinking, THINKING_LIMIT))),
        ItemKind::ToolCall {
            kind,
            name,
            arguments,
        } => Some(render_tool_call(*kind, name, arguments)),
        ItemKind::Text(text) => Some(format!("💬 {}", truncate(text, TEXT_LIMIT))),
        ItemKind::Reference(_) | ItemKind::Empty => None,
    }
}

/// Render a tool invocation as an action line.
pub fn render_tool_call(kind: ToolKind, name: &str, arguments: &Value) -> String {
    let icon = kind.icon();
    match kind {
        ToolKind::Read => format!("{icon} `READ` → **{}**", target_path(arguments)),
        ToolKind::Write => format!("{icon} `WRITE` → **{}**", target_path(arguments)),
        ToolKind::Edit => format!("{icon} `EDIT` → **{}**", target_path(arguments)),
        ToolKind::Shell => {
            let command = arg_str(arguments, "command").unwrap_or_default();
            format!("{icon} `$` {}", shell_display(&command))
        }
        ToolKind::Search => {
            let query = arg_str(arguments, "query").unwrap_or_else(|| "?".into());
            format!("{icon} `SEARCH` → *{}*", truncate(&query, SEARCH_LIMIT))
        }
        ToolKind::Fetch => {
            let url = arg_str(arguments, "url").unwrap_or_else(|| "?".into());
            format!("{icon} `FETCH` → **{}**", url_host(&url))
        }
        ToolKind::Message => {
            let action = arg_str(arguments, "action").unwrap_or_else(|| "?".into());
            format!("{icon} `MSG.{}`", action.to_uppercase())
        }
        ToolKind::Browser => {
            let action = arg_str(arguments, "action").unwrap_or_else(|| "?".into());
            format!("{icon} `BROWSER.{action}`")
        }
        ToolKind::Memory => format!("{icon} `{}`", name.to_uppercase()),
        ToolKind::Session | ToolKind::Generic => format!("{icon} `{name}`"),
    }
}

/// Render a tool result with a success/failure icon and a short snippet.
///
/// Priority: empty output, output mentioning success, errors, long
/// multi-line output, everything else.
pub fn render_tool_result(text: &str, is_error: bool) -> String {
    let icon = if is_error { "❌" } else { "✓" };
    let result = text.trim();

    if result.is_empty() {
        return icon.to_string();
    }

    if result.to_lowercase().contains("success") {
        return match success_phrase(result) {
            Some(phrase) => format!("✓ *{}*", truncate(phrase, SUCCESS_PHRASE_LIMIT)),
            None => "✓ *done*".to_string(),
        };
    }

    if is_error {
        return format!("❌ `{}`", truncate(result, ERROR_LIMIT));
    }

    let lines: Vec<&str> = result.split('\n').collect();
    if lines.len() > 3 {
        return format!(
            "✓ `{}` *({} lines)*",
            truncate(lines[0], PREVIEW_LINE_LIMIT),
            lines.len()
        );
    }

    format!("✓ `{}`", truncate(result, RESULT_LIMIT))
}

fn success_phrase(text: &str) -> Option<&str> {
    SUCCESS_PHRASE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Single-line commands inline; multi-line commands as the first line and
/// a count of the rest.
fn shell_display(command: &str) -> String {
    let lines: Vec<&str> = command.trim().lines().collect();
    if lines.len() <= 1 {
        truncate(command, SHELL_LIMIT)
    } else {
        format!(
            "{}  *(+{} lines)*",
            take_chars(lines[0], SHELL_FIRST_LINE_LIMIT),
            lines.len() - 1
        )
    }
}

/// Network host of a URL, or the first characters of the raw string when
/// it has no scheme separator.
fn url_host(url: &str) -> String {
    URL_HOST
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| take_chars(url, FETCH_FALLBACK_LIMIT).to_string())
}

fn target_path(arguments: &Value) -> String {
    arg_str(arguments, "path")
        .or_else(|| arg_str(arguments, "file_path"))
        .unwrap_or_else(|| "?".into())
}

/// A string argument; non-string scalars are stringified, null and missing
/// keys are `None`.
fn arg_str(arguments: &Value, key: &str) -> Option<String> {
    match arguments.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: Value) -> String {
        render_tool_call(ToolKind::from_name(name), name, &arguments)
    }

    #[test]
    fn file_operations_show_path() {
        assert_eq!(call("Read", json!({"path": "/tmp/x"})), "📂 `READ` → **/tmp/x**");
        assert_eq!(
            call("Write", json!({"file_path": "/srv/out.txt"})),
            "💾 `WRITE` → **/srv/out.txt**"
        );
        assert_eq!(call("Edit", json!({})), "✏️ `EDIT` → **?**");
        assert_eq!(call("Read", Value::Null), "📂 `READ` → **?**");
    }

    #[test]
    fn single_line_shell_command() {
        assert_eq!(call("exec", json!({"command": "ls -la"})), "⚡ `$` ls -la");
        let long = "x".repeat(200);
        let out = call("bash", json!({"command": long}));
        assert_eq!(out, format!("⚡ `$` {}…", "x".repeat(150)));
    }

    #[test]
    fn multi_line_shell_command() {
        let out = call("Bash", json!({"command": "cd /srv\nmake\nmake install\n"}));
        assert_eq!(out, "⚡ `$` cd /srv  *(+2 lines)*");

        let long_first = format!("{}\necho done", "y".repeat(120));
        let out = call("exec", json!({"command": long_first}));
        assert_eq!(out, format!("⚡ `$` {}  *(+1 lines)*", "y".repeat(80)));
    }

    #[test]
    fn crlf_shell_command_has_no_raw_line_break() {
        let out = call("bash", json!({"command": "cd /srv\r\nmake\r\nmake install"}));
        assert_eq!(out, "⚡ `$` cd /srv  *(+2 lines)*");
        assert!(!out.contains('\r') && !out.contains('\n'));
    }

    #[test]
    fn search_and_fetch() {
        assert_eq!(
            call("web_search", json!({"query": "rust tokio select"})),
            "🔎 `SEARCH` → *rust tokio select*"
        );
        assert_eq!(
            call("web_fetch", json!({"url": "https://docs.rs/tokio/latest/tokio/"})),
            "🌐 `FETCH` → **docs.rs**"
        );
        let no_scheme = "z".repeat(70);
        assert_eq!(
            call("web_fetch", json!({"url": no_scheme})),
            format!("🌐 `FETCH` → **{}**", "z".repeat(50))
        );
        assert_eq!(call("web_fetch", json!({})), "🌐 `FETCH` → **?**");
    }

    #[test]
    fn action_only_tools() {
        assert_eq!(call("message", json!({"action": "send"})), "💬 `MSG.SEND`");
        assert_eq!(call("browser", json!({"action": "snapshot"})), "🖥️ `BROWSER.snapshot`");
        assert_eq!(call("memory_search", json!({"query": "x"})), "🧠 `MEMORY_SEARCH`");
        assert_eq!(call("sessions_send", json!({})), "📡 `sessions_send`");
        assert_eq!(call("cron", json!({})), "🔧 `cron`");
        assert_eq!(call("message", json!({})), "💬 `MSG.?`");
    }

    #[test]
    fn recognized_tools_start_with_their_icon() {
        for name in [
            "Read", "Write", "Edit", "bash", "web_search", "web_fetch", "message", "browser",
            "memory_get", "session_status", "anything",
        ] {
            let kind = ToolKind::from_name(name);
            assert!(call(name, json!({"action": 1})).starts_with(kind.icon()), "{name}");
        }
    }

    #[test]
    fn thinking_and_text_lines() {
        let thinking = ItemKind::Thinking("let me check\nthe logs");
        assert_eq!(
            render_item(&thinking).unwrap(),
            ">>> 💭 let me check ↵ the logs"
        );
        let long = "w".repeat(300);
        let rendered = render_item(&ItemKind::Thinking(&long)).unwrap();
        assert!(rendered.chars().count() <= ">>> 💭 ".chars().count() + 251);

        assert_eq!(render_item(&ItemKind::Text("All done.")).unwrap(), "💬 All done.");
        assert!(render_item(&ItemKind::Reference(None)).is_none());
        assert!(render_item(&ItemKind::Empty).is_none());
    }

    #[test]
    fn turn_preserves_order_and_skips_empty() {
        let items = vec![
            ContentItem::Thinking {
                thinking: "plan".into(),
            },
            ContentItem::Unknown,
            ContentItem::ToolCall {
                name: "Read".into(),
                arguments: json!({"path": "a.rs"}),
            },
            ContentItem::Text {
                text: "[Discord #x] echo".into(),
            },
            ContentItem::Text { text: "ok".into() },
        ];
        assert_eq!(
            render_turn(&items).unwrap(),
            ">>> 💭 plan\n📂 `READ` → **a.rs**\n💬 ok"
        );
        assert!(render_turn(&[ContentItem::Unknown]).is_none());
        assert!(render_turn(&[]).is_none());
    }

    #[test]
    fn empty_result_is_icon_only() {
        assert_eq!(render_tool_result("   ", false), "✓");
        assert_eq!(render_tool_result("", true), "❌");
    }

    #[test]
    fn success_results() {
        assert_eq!(
            render_tool_result("Successfully wrote 120 bytes to /tmp/out.txt", false),
            "✓ *wrote 120 bytes to /tmp/out.txt*"
        );
        assert_eq!(
            render_tool_result("Successfully replaced text in config.toml.", false),
            "✓ *replaced text in config.toml.*"
        );
        assert_eq!(render_tool_result("SUCCESS", false), "✓ *done*");
        // a success mention wins over the error flag
        assert_eq!(render_tool_result("partial success", true), "✓ *done*");
    }

    #[test]
    fn error_result() {
        assert_eq!(render_tool_result("disk full", true), "❌ `disk full`");
        let long = "e".repeat(200);
        assert_eq!(
            render_tool_result(&long, true),
            format!("❌ `{}…`", "e".repeat(150))
        );
    }

    #[test]
    fn multi_line_result_shows_first_line_and_count() {
        let output = "total 3\n-rw a\n-rw b\n-rw c";
        assert_eq!(render_tool_result(output, false), "✓ `total 3` *(4 lines)*");

        let short = "line one\nline two";
        assert_eq!(render_tool_result(short, false), "✓ `line one ↵ line two`");
    }

    #[test]
    fn plain_result_truncated() {
        let long = "r".repeat(130);
        assert_eq!(
            render_tool_result(&long, false),
            format!("✓ `{}…`", "r".repeat(120))
        );
    }
}
