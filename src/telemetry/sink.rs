//! # Record Sinks
//!
//! Where decoded records go once a row has been decoded.

use chrono::Local;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

use crate::error::Result;
use crate::fineoffset::bitrow::BitRow;
use crate::fineoffset::decoder::decode_any;
use crate::fineoffset::protocol::Family;
use crate::fineoffset::record::SensorRecord;

/// Format of the `time` field
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Consumer of decoded records
pub trait RecordSink {
    /// Emit one record
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be serialized or written
    fn emit(&mut self, record: &SensorRecord) -> Result<()>;
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    timestamps: bool,
    emitted: u64,
}

/// A record with a leading `time` field
struct Stamped<'a> {
    time: String,
    record: &'a SensorRecord,
}

impl Serialize for Stamped<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self.record.fields();
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (name, value) in fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink writing to `writer`
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination, flushed after every record
    /// * `timestamps` - Prefix each record with the local time
    pub fn new(writer: W, timestamps: bool) -> Self {
        Self {
            writer,
            timestamps,
            emitted: 0,
        }
    }

    /// Number of records written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &SensorRecord) -> Result<()> {
        if self.timestamps {
            let stamped = Stamped {
                time: Local::now().format(TIME_FORMAT).to_string(),
                record,
            };
            serde_json::to_writer(&mut self.writer, &stamped)?;
        } else {
            serde_json::to_writer(&mut self.writer, record)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.emitted += 1;
        Ok(())
    }
}

/// Decode a row with every family in `families` and emit each record
///
/// # Returns
///
/// * `Result<usize>` - Number of records emitted
///
/// # Errors
///
/// Returns the first sink error. Decode failures are not errors here.
pub fn decode_and_emit<S: RecordSink + ?Sized>(
    families: &[Family],
    row: &BitRow,
    sink: &mut S,
) -> Result<usize> {
    let records = decode_any(families, row);
    if records.is_empty() {
        debug!("no decoder accepted {}", row);
    }
    for record in &records {
        sink.emit(record)?;
    }
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fineoffset::bitrow::BitRowBuilder;

    fn wh0530_row() -> BitRow {
        BitRowBuilder::new()
            .push_bits(0x7F, 7)
            .push_bytes(&[0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x51])
            .build()
    }

    #[test]
    fn test_json_line_without_timestamp() {
        let mut sink = JsonLinesSink::new(Vec::new(), false);
        let mut record = SensorRecord::new("Fineoffset-WH2");
        record.push("id", 83i64);
        record.push("mic", "CRC");

        sink.emit(&record).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "{\"model\":\"Fineoffset-WH2\",\"id\":83,\"mic\":\"CRC\"}\n");
    }

    #[test]
    fn test_json_line_with_timestamp_first() {
        let mut sink = JsonLinesSink::new(Vec::new(), true);
        sink.emit(&SensorRecord::new("Fineoffset-WH25")).unwrap();
        assert_eq!(sink.emitted(), 1);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("{\"time\":\""));
        assert!(out.ends_with("\"model\":\"Fineoffset-WH25\"}\n"));

        let line: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        let time = line["time"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(time, TIME_FORMAT).is_ok());
    }

    #[test]
    fn test_decode_and_emit_writes_records() {
        let mut sink = JsonLinesSink::new(Vec::new(), false);
        let count = decode_and_emit(&Family::ALL, &wh0530_row(), &mut sink).unwrap();
        assert_eq!(count, 1);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"model\":\"Fineoffset-WH0530\""));
        assert!(out.contains("\"mic\":\"CRC\""));
    }

    #[test]
    fn test_decode_and_emit_skips_unknown_rows() {
        let mut sink = JsonLinesSink::new(Vec::new(), false);
        let row = BitRow::from_bytes(&[0u8; 6]);
        assert_eq!(decode_and_emit(&Family::ALL, &row, &mut sink).unwrap(), 0);
        assert!(sink.into_inner().is_empty());
    }
}
