//! Console sink — prints deliveries to stdout.
//!
//! Used by `--dry-run` so the formatter and forwarder can be watched
//! without touching the chat platform.

use async_trait::async_trait;
use clawtrail_core::channel::{DeliveryReceipt, DeliverySink, clip_message};
use clawtrail_core::error::ChannelError;

/// Delivery sink that writes every post to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn format_post(destination: &str, text: &str) -> String {
        format!("[{destination}] {}", clip_message(text))
    }

    fn format_reference(destination: &str, source_channel: &str, source_message: &str) -> String {
        format!("[{destination}] ↪ forward {source_channel}/{source_message}")
    }
}

#[async_trait]
impl DeliverySink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn post(&self, destination: &str, text: &str) -> Result<DeliveryReceipt, ChannelError> {
        if !text.trim().is_empty() {
            println!("{}", Self::format_post(destination, text));
        }
        Ok(DeliveryReceipt::default())
    }

    async fn post_reference(
        &self,
        destination: &str,
        source_channel: &str,
        source_message: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        println!(
            "{}",
            Self::format_reference(destination, source_channel, source_message)
        );
        Ok(DeliveryReceipt::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_line_names_destination() {
        assert_eq!(ConsoleSink::format_post("100", "hello"), "[100] hello");
    }

    #[test]
    fn reference_line_names_source() {
        assert_eq!(
            ConsoleSink::format_reference("100", "300", "42"),
            "[100] ↪ forward 300/42"
        );
    }

    #[tokio::test]
    async fn console_sink_always_succeeds() {
        let sink = ConsoleSink::new();
        assert_eq!(sink.name(), "console");
        assert!(sink.post("100", "hi").await.is_ok());
        assert!(sink.post("100", "").await.is_ok());
        assert!(sink.post_reference("100", "300", "42").await.is_ok());
    }
}
