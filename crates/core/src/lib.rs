//! # clawtrail core
//!
//! Domain types, transport traits, and error definitions shared by the
//! clawtrail audit pipeline. The formatter, the stream processor and the
//! forwarding tracker all depend inward on this crate; none of them know
//! which chat platform sits behind the traits.

pub mod channel;
pub mod error;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use channel::{
    DeliveryReceipt, DeliverySink, FetchedMessage, ForwardRecord, MAX_MESSAGE_CHARS,
    MessageSource, clip_message,
};
pub use error::{ChannelError, StateError};
pub use event::{Content, ContentItem, RawEvent, Role};
