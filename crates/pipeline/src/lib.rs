//! Stream processing of agent session logs.
//!
//! Reads newline-delimited JSON records, classifies each one, and issues at
//! most one delivery per record to the audit destination. Every record ends
//! in an explicit [`RecordOutcome`]; nothing short of the input ending stops
//! the stream.

pub mod outcome;
pub mod processor;

pub use outcome::{RecordOutcome, SkipReason, StreamSummary};
pub use processor::StreamProcessor;
