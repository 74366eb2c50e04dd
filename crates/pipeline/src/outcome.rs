//! Per-record results and the running tally over a stream.

use clawtrail_render::IgnoreReason;

/// Why a record produced no delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line
    BlankLine,
    /// Line was not a parseable record
    Malformed(String),
    /// Record classified as not auditable
    Ignored(IgnoreReason),
    /// Every item of the record rendered to nothing
    NothingToRender,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::BlankLine => f.write_str("blank line"),
            SkipReason::Malformed(reason) => write!(f, "malformed record: {reason}"),
            SkipReason::Ignored(reason) => write!(f, "{reason}"),
            SkipReason::NothingToRender => f.write_str("nothing to render"),
        }
    }
}

/// What happened to one input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A rendered summary was posted
    Posted,
    /// The referenced inbound message was forwarded
    Forwarded,
    Skipped(SkipReason),
    /// The delivery call failed; the record is dropped
    Failed(String),
}

/// Counts of outcomes over a processed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub posted: usize,
    pub forwarded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StreamSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Posted => self.posted += 1,
            RecordOutcome::Forwarded => self.forwarded += 1,
            RecordOutcome::Skipped(_) => self.skipped += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Records seen, whatever their outcome.
    pub fn total(&self) -> usize {
        self.posted + self.forwarded + self.skipped + self.failed
    }
}

impl std::fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records: {} posted, {} forwarded, {} skipped, {} failed",
            self.total(),
            self.posted,
            self.forwarded,
            self.skipped,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tallies_each_outcome() {
        let mut summary = StreamSummary::default();
        summary.record(&RecordOutcome::Posted);
        summary.record(&RecordOutcome::Posted);
        summary.record(&RecordOutcome::Forwarded);
        summary.record(&RecordOutcome::Skipped(SkipReason::BlankLine));
        summary.record(&RecordOutcome::Failed("HTTP 500".into()));

        assert_eq!(summary.posted, 2);
        assert_eq!(summary.total(), 5);
        assert_eq!(
            summary.to_string(),
            "5 records: 2 posted, 1 forwarded, 1 skipped, 1 failed"
        );
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::Ignored(IgnoreReason::UnhandledRole).to_string(),
            "unhandled role"
        );
        assert!(
            SkipReason::Malformed("EOF while parsing".into())
                .to_string()
                .starts_with("malformed record")
        );
    }
}
