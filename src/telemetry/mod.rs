//! # Telemetry Module
//!
//! Emits decoded sensor records as JSONL (JSON Lines).
//!
//! This module handles:
//! - The `RecordSink` seam between decoding and output
//! - Formatting records as one JSON object per line
//! - Optional local timestamps on every record

pub mod sink;

pub use sink::{decode_and_emit, JsonLinesSink, RecordSink, TIME_FORMAT};
