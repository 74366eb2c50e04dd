//! The stream processor: one record in, at most one delivery out.

use std::sync::Arc;

use clawtrail_core::channel::DeliverySink;
use clawtrail_core::event::RawEvent;
use clawtrail_render::{RecordKind, render_tool_result, render_turn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::outcome::{RecordOutcome, SkipReason, StreamSummary};

/// Turns session-log records into audit deliveries.
///
/// Records are handled strictly in input order and each delivery is awaited
/// before the next record is read, so the audit channel mirrors the log
/// one-to-one.
pub struct StreamProcessor {
    sink: Arc<dyn DeliverySink>,
    destination: String,
    session: Option<String>,
}

impl StreamProcessor {
    pub fn new(sink: Arc<dyn DeliverySink>, destination: impl Into<String>) -> Self {
        Self {
            sink,
            destination: destination.into(),
            session: None,
        }
    }

    /// Attach a session label to every log line this processor emits.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Process every line of `reader` until end of input.
    ///
    /// A line that is not valid UTF-8 is skipped as malformed. A real I/O
    /// error on the reader ends the stream like end of input does; it is
    /// logged and the summary so far is returned.
    pub async fn run<R>(&self, mut reader: R) -> StreamSummary
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = StreamSummary::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let outcome = match std::str::from_utf8(&buf) {
                        Ok(line) => self.process_line(line).await,
                        Err(e) => {
                            let outcome = RecordOutcome::Skipped(SkipReason::Malformed(format!(
                                "invalid UTF-8: {e}"
                            )));
                            self.log_outcome(&outcome);
                            outcome
                        }
                    };
                    summary.record(&outcome);
                }
                Err(e) => {
                    warn!(session = self.session_label(), error = %e, "Input stream read failed");
                    break;
                }
            }
        }
        info!(
            session = self.session_label(),
            posted = summary.posted,
            forwarded = summary.forwarded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Input stream finished"
        );
        summary
    }

    /// Parse and process one raw input line.
    pub async fn process_line(&self, line: &str) -> RecordOutcome {
        let line = line.trim();
        if line.is_empty() {
            return RecordOutcome::Skipped(SkipReason::BlankLine);
        }
        match RawEvent::from_line(line) {
            Ok(event) => self.process_record(&event).await,
            Err(e) => {
                let outcome = RecordOutcome::Skipped(SkipReason::Malformed(e.to_string()));
                self.log_outcome(&outcome);
                outcome
            }
        }
    }

    /// Process one parsed record.
    pub async fn process_record(&self, event: &RawEvent) -> RecordOutcome {
        let outcome = match clawtrail_render::classify_record(event) {
            RecordKind::InboundForward(marker) => {
                match self
                    .sink
                    .post_reference(&self.destination, &marker.channel_id, &marker.message_id)
                    .await
                {
                    Ok(_) => RecordOutcome::Forwarded,
                    Err(e) => RecordOutcome::Failed(e.to_string()),
                }
            }
            RecordKind::AssistantTurn(items) => match render_turn(items) {
                Some(text) => self.deliver(&text).await,
                None => RecordOutcome::Skipped(SkipReason::NothingToRender),
            },
            RecordKind::ToolResult { text, is_error } => {
                self.deliver(&render_tool_result(&text, is_error)).await
            }
            RecordKind::Ignored(reason) => RecordOutcome::Skipped(SkipReason::Ignored(reason)),
        };
        self.log_outcome(&outcome);
        outcome
    }

    async fn deliver(&self, text: &str) -> RecordOutcome {
        if text.trim().is_empty() {
            return RecordOutcome::Skipped(SkipReason::NothingToRender);
        }
        match self.sink.post(&self.destination, text).await {
            Ok(_) => RecordOutcome::Posted,
            Err(e) => RecordOutcome::Failed(e.to_string()),
        }
    }

    fn session_label(&self) -> &str {
        self.session.as_deref().unwrap_or("?")
    }

    fn log_outcome(&self, outcome: &RecordOutcome) {
        let session = self.session_label();
        let sink = self.sink.name();
        match outcome {
            RecordOutcome::Posted => debug!(session, sink, "Audit summary posted"),
            RecordOutcome::Forwarded => debug!(session, sink, "Inbound message forwarded"),
            RecordOutcome::Skipped(reason) => debug!(session, %reason, "Record skipped"),
            RecordOutcome::Failed(reason) => warn!(session, sink, %reason, "Audit delivery failed"),
        }
    }
}
