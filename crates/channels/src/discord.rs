//! Discord transport over the REST API.
//!
//! Implements both transport traits against Discord API v10:
//! - text posts: `POST /channels/{id}/messages {"content": ..}`
//! - forwards: `POST /channels/{id}/messages {"message_reference": {"type": 1, ..}}`
//! - history: `GET /channels/{id}/messages?limit=N` (newest first on the wire)
//!
//! No retries here; callers own the retry policy.

use std::time::Duration;

use async_trait::async_trait;
use clawtrail_config::AuditConfig;
use clawtrail_core::channel::{
    DeliveryReceipt, DeliverySink, FetchedMessage, MessageSource, clip_message,
};
use clawtrail_core::error::ChannelError;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Discord message reference type for a forward (as opposed to a reply).
const REFERENCE_TYPE_FORWARD: u8 = 1;

/// Longest response body quoted in an error.
const ERROR_BODY_CHARS: usize = 200;

/// Discord transport configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    pub bot_token: String,
    /// REST base URL, e.g. `https://discord.com/api/v10`.
    pub api_base: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl From<&AuditConfig> for DiscordConfig {
    fn from(config: &AuditConfig) -> Self {
        Self {
            bot_token: config.discord_token.clone(),
            api_base: config.api_base.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    author: HistoryAuthor,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryAuthor {
    #[serde(default)]
    id: String,
}

/// Discord REST client.
pub struct DiscordClient {
    config: DiscordConfig,
    http: reqwest::Client,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> Result<Self, ChannelError> {
        if config.bot_token.trim().is_empty() {
            return Err(ChannelError::NotConfigured("discord bot token is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("clawtrail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            config: DiscordConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
            http,
        })
    }

    fn messages_url(&self, channel: &str) -> String {
        format!("{}/channels/{channel}/messages", self.config.api_base)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    async fn create_message(
        &self,
        destination: &str,
        payload: &Value,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let response = self
            .http
            .post(self.messages_url(destination))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(payload)
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::DeliveryFailed {
                channel: destination.to_string(),
                reason: format!("HTTP {status}: {}", error_excerpt(&body)),
            });
        }

        let created = response.json::<CreatedMessage>().await.ok();
        Ok(DeliveryReceipt {
            message_id: created.and_then(|c| c.id),
        })
    }
}

#[async_trait]
impl DeliverySink for DiscordClient {
    fn name(&self) -> &str {
        "discord"
    }

    async fn post(&self, destination: &str, text: &str) -> Result<DeliveryReceipt, ChannelError> {
        if text.trim().is_empty() {
            debug!(destination, "Skipping empty Discord post");
            return Ok(DeliveryReceipt::default());
        }
        let payload = json!({ "content": clip_message(text) });
        let receipt = self.create_message(destination, &payload).await?;
        debug!(
            destination,
            message_id = ?receipt.message_id,
            content_len = text.len(),
            "Discord post delivered"
        );
        Ok(receipt)
    }

    async fn post_reference(
        &self,
        destination: &str,
        source_channel: &str,
        source_message: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let payload = json!({
            "message_reference": {
                "type": REFERENCE_TYPE_FORWARD,
                "channel_id": source_channel,
                "message_id": source_message,
            }
        });
        let receipt = self.create_message(destination, &payload).await?;
        debug!(
            destination,
            source_channel,
            source_message,
            "Discord forward delivered"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl MessageSource for DiscordClient {
    async fn fetch_recent(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>, ChannelError> {
        let response = self
            .http
            .get(self.messages_url(channel))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::FetchFailed {
                channel: channel.to_string(),
                reason: format!("HTTP {status}: {}", error_excerpt(&body)),
            });
        }

        let history: Vec<HistoryMessage> = response
            .json()
            .await
            .map_err(|e| ChannelError::InvalidPayload(format!("message history: {e}")))?;

        let total = history.len();
        let messages: Vec<FetchedMessage> = history
            .into_iter()
            .rev()
            .filter(|m| !m.id.is_empty())
            .map(|m| FetchedMessage {
                id: m.id,
                author_id: m.author.id,
            })
            .collect();
        if messages.len() < total {
            warn!(channel, dropped = total - messages.len(), "History entries without an id");
        }
        Ok(messages)
    }
}

fn error_excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_CHARS).collect()
}
