//! The polling forwarder.
//!
//! Each cycle walks the watched channels in configured order, fetches the
//! most recent messages oldest first, and forwards every agent-authored
//! message not yet recorded in the dedup state. State is persisted after
//! every successful forward.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clawtrail_config::AuditConfig;
use clawtrail_core::channel::{DeliverySink, FetchedMessage, ForwardRecord, MessageSource};
use tracing::{debug, info, warn};

use crate::state::DedupStateStore;

/// What the tracker watches and where it forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Audit channel receiving the forwards
    pub destination: String,
    /// User id of the agent whose messages are forwarded
    pub agent_user_id: String,
    /// Source channels, polled in this order
    pub watch_channels: Vec<String>,
    /// Messages fetched per channel per cycle
    pub fetch_limit: usize,
    pub poll_interval: Duration,
}

impl From<&AuditConfig> for TrackerSettings {
    fn from(config: &AuditConfig) -> Self {
        Self {
            destination: config.audit_channel_id.clone(),
            agent_user_id: config.bot_user_id.clone(),
            watch_channels: config.watch_channels.clone(),
            fetch_limit: config.fetch_limit,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Messages forwarded this cycle, in forwarding order
    pub forwarded: Vec<ForwardRecord>,
    /// Messages not authored by the agent
    pub skipped_foreign: usize,
    /// Messages already in the dedup state
    pub skipped_seen: usize,
    /// Watched channels skipped because they are the destination
    pub skipped_channels: usize,
    /// Channels whose fetch failed
    pub fetch_failures: usize,
    /// Forward calls that failed; retried next cycle
    pub forward_failures: usize,
    /// State saves that failed after a successful forward
    pub persist_failures: usize,
}

impl CycleReport {
    pub fn has_failures(&self) -> bool {
        self.fetch_failures + self.forward_failures + self.persist_failures > 0
    }
}

/// At-least-once forwarder of agent-authored messages.
pub struct DedupTracker {
    source: Arc<dyn MessageSource>,
    sink: Arc<dyn DeliverySink>,
    store: DedupStateStore,
    settings: TrackerSettings,
}

impl DedupTracker {
    pub fn new(
        source: Arc<dyn MessageSource>,
        sink: Arc<dyn DeliverySink>,
        store: DedupStateStore,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &DedupStateStore {
        &self.store
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Run one pass over every watched channel. Never fails: each fetch,
    /// forward, and save error is logged, counted, and skipped.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let channels = self.settings.watch_channels.clone();

        for channel in &channels {
            if *channel == self.settings.destination {
                debug!(channel = %channel, "Watched channel is the destination; not forwarding from it");
                report.skipped_channels += 1;
                continue;
            }

            let messages = match self
                .source
                .fetch_recent(channel, self.settings.fetch_limit)
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Fetching recent messages failed");
                    report.fetch_failures += 1;
                    continue;
                }
            };

            for message in &messages {
                self.consider(channel, message, &mut report).await;
            }
        }

        if !report.forwarded.is_empty() || report.has_failures() {
            info!(
                forwarded = report.forwarded.len(),
                fetch_failures = report.fetch_failures,
                forward_failures = report.forward_failures,
                persist_failures = report.persist_failures,
                tracked = self.store.len(),
                "Forwarding cycle complete"
            );
        }
        report
    }

    async fn consider(&mut self, channel: &str, message: &FetchedMessage, report: &mut CycleReport) {
        if message.author_id != self.settings.agent_user_id {
            report.skipped_foreign += 1;
            return;
        }
        if self.store.contains(&message.id) {
            report.skipped_seen += 1;
            return;
        }

        let receipt = match self
            .sink
            .post_reference(&self.settings.destination, channel, &message.id)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(channel, message_id = %message.id, error = %e, "Forward failed; will retry next cycle");
                report.forward_failures += 1;
                return;
            }
        };

        self.store.mark_forwarded(&message.id);
        if let Err(e) = self.store.save() {
            warn!(error = %e, "Persisting dedup state failed");
            report.persist_failures += 1;
        }
        debug!(channel, message_id = %message.id, "Message forwarded");
        report.forwarded.push(ForwardRecord {
            source_channel_id: channel.to_string(),
            message_id: message.id.clone(),
            destination_message_id: receipt.message_id,
            forwarded_at: Utc::now(),
        });
    }

    /// Poll forever, sleeping the poll interval between cycles, until
    /// `shutdown` resolves. A cycle in progress always completes.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            channels = self.settings.watch_channels.len(),
            destination = %self.settings.destination,
            interval_secs = self.settings.poll_interval.as_secs(),
            "Forwarder started"
        );
        loop {
            self.run_cycle().await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Forwarder stopping");
                    break;
                }
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }
    }
}
