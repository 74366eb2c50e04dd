//! Classification and rendering of agent log records.
//!
//! Everything in this crate is pure: a record goes in, at most one display
//! line comes out. The [`classify`] module decides what a record or content
//! item *is*; the [`render`] module decides how it reads in the audit
//! channel.

pub mod classify;
pub mod marker;
pub mod render;
pub mod truncate;

pub use classify::{IgnoreReason, ItemKind, RecordKind, ToolKind, classify_item, classify_record};
pub use marker::{ForwardMarker, extract_forward_marker};
pub use render::{render_item, render_tool_call, render_tool_result, render_turn};
pub use truncate::truncate;
