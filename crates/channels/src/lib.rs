//! Chat transport implementations for clawtrail.
//!
//! Each transport implements the core `DeliverySink` trait, and the ones
//! that can list history also implement `MessageSource`.
//!
//! Available transports:
//! - **Discord** — Discord REST API v10 (post, forward, fetch history)
//! - **Console** — prints what would be posted to stdout (`--dry-run`)

pub mod console;
pub mod discord;

pub use console::ConsoleSink;
pub use discord::{DiscordClient, DiscordConfig};
