//! # Fine Offset Decoder
//!
//! Two-phase dispatch: a row is first classified into a [`Variant`] and a
//! located frame, then the frame is validated and its fields decoded.

use tracing::debug;

use super::bitrow::BitRow;
use super::classifier::{classify, Classification};
use super::fields::{decode_field, layout};
use super::integrity::validate;
use super::protocol::*;
use super::record::SensorRecord;
use crate::error::{DecodeError, DecodeResult};

/// Decode one row with the decision table of `family`
///
/// # Errors
///
/// Returns the first classification, integrity or sanity failure
pub fn decode(family: Family, row: &BitRow) -> DecodeResult<SensorRecord> {
    let Classification { variant, frame } = classify(family, row)?;
    decode_frame(variant, frame.bytes())
}

/// Decode a capture. Only the first row is consumed.
///
/// # Errors
///
/// Returns `AbortLength` for an empty capture
pub fn decode_capture(family: Family, rows: &[BitRow]) -> DecodeResult<SensorRecord> {
    let row = rows.first().ok_or(DecodeError::AbortLength)?;
    decode(family, row)
}

/// Validate a located frame and build its record
///
/// # Arguments
///
/// * `variant` - Classified variant
/// * `frame` - Frame bytes, at least `variant.frame_len()` long
///
/// # Errors
///
/// Returns `FailIntegrity` on a CRC or checksum mismatch and `FailSanity` when a
/// structural constant is off. No record is built in either case.
pub fn decode_frame(variant: Variant, frame: &[u8]) -> DecodeResult<SensorRecord> {
    validate(variant, frame)?;
    check_sanity(variant, frame)?;

    let mut record = SensorRecord::new(variant.model());
    for spec in layout(variant) {
        match decode_field(spec, frame) {
            Some(value) => {
                debug!("{}: {} = {} {}", variant, spec.name, value, spec.unit);
                record.push(spec.name, value);
            }
            None => debug!("{}: {} not reported", variant, spec.name),
        }
    }
    record.push("mic", MIC_CRC);

    Ok(record)
}

/// Structural constants checked once integrity has passed
fn check_sanity(variant: Variant, frame: &[u8]) -> DecodeResult<()> {
    if variant.family() == Family::Wh2 && frame[0] >> 4 != WH2_TYPE_NIBBLE {
        debug!("{}: unknown type {:x}", variant, frame[0] >> 4);
        return Err(DecodeError::FailSanity);
    }
    Ok(())
}

/// Run every family on a row and collect the records that decoded
pub fn decode_any(families: &[Family], row: &BitRow) -> Vec<SensorRecord> {
    families
        .iter()
        .filter_map(|&family| match decode(family, row) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("{}: {} ({})", family, e, e.code());
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fineoffset::bitrow::BitRowBuilder;
    use crate::fineoffset::record::Value;

    fn pwm_row(frame: &[u8]) -> BitRow {
        BitRowBuilder::new().push_bits(0x7F, 7).push_bytes(frame).build()
    }

    fn fsk_row(frame: &[u8], trailing: usize) -> BitRow {
        BitRowBuilder::new()
            .push_bytes(&[0xAA, 0xAA])
            .push_bytes(&FSK_PREAMBLE)
            .push_bytes(frame)
            .push_bits(0, trailing)
            .build()
    }

    fn float(record: &SensorRecord, name: &str) -> f64 {
        record.get(name).and_then(Value::as_f64).expect(name)
    }

    #[test]
    fn test_decode_wh2() {
        let row = BitRowBuilder::new()
            .push_bytes(&[0xFF, 0x45, 0x31, 0x0F, 0x3C, 0xCF])
            .build();
        let record = decode(Family::Wh2, &row).unwrap();

        assert_eq!(record.model(), "Fineoffset-WH2");
        assert_eq!(record.get("id"), Some(&Value::Int(83)));
        assert!((float(&record, "temperature_C") - 27.1).abs() < 1e-9);
        assert_eq!(record.get("humidity"), Some(&Value::Int(60)));
        assert_eq!(record.get("mic"), Some(&Value::from("CRC")));
    }

    #[test]
    fn test_decode_wh2_wrong_type_is_sanity_failure() {
        let row = BitRowBuilder::new()
            .push_bytes(&[0xFF, 0x55, 0x31, 0x0F, 0x3C, 0xF7])
            .build();
        assert_eq!(decode(Family::Wh2, &row), Err(DecodeError::FailSanity));
    }

    #[test]
    fn test_decode_wh0530_capture() {
        let row = pwm_row(&[0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x51]);
        let record = decode(Family::Wh0530, &row).unwrap();

        let names: Vec<_> = record.names().collect();
        assert_eq!(names, ["model", "id", "battery_ok", "temperature_C", "rain_mm", "mic"]);
        assert_eq!(record.model(), "Fineoffset-WH0530");
        assert_eq!(record.get("id"), Some(&Value::Int(138)));
        assert_eq!(record.get("battery_ok"), Some(&Value::Int(1)));
        assert!((float(&record, "temperature_C") - 25.5).abs() < 1e-9);
        assert!((float(&record, "rain_mm") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_decode_wh0530_corrupt_trailer() {
        let row = pwm_row(&[0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x50]);
        assert_eq!(decode(Family::Wh0530, &row), Err(DecodeError::FailIntegrity));
    }

    #[test]
    fn test_decode_wh25_without_pressure() {
        let row = fsk_row(&[0xE4, 0xBA, 0x8F, 0x37, 0xFF, 0xFF, 0x62, 0x6E], 376);
        let record = decode(Family::Wh25, &row).unwrap();

        assert_eq!(record.model(), "Fineoffset-WH25");
        assert_eq!(record.get("battery_ok"), Some(&Value::Int(0)));
        assert!(!record.contains("pressure_hPa"));
    }

    #[test]
    fn test_decode_capture_uses_first_row() {
        let good = pwm_row(&[0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x51]);
        let bad = BitRow::from_bytes(&[0u8; 4]);

        assert!(decode_capture(Family::Wh0530, &[good.clone(), bad.clone()]).is_ok());
        assert_eq!(
            decode_capture(Family::Wh0530, &[bad, good]),
            Err(DecodeError::AbortLength)
        );
        assert_eq!(decode_capture(Family::Wh0530, &[]), Err(DecodeError::AbortLength));
    }

    #[test]
    fn test_decode_any_collects_successes() {
        let row = pwm_row(&[0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x51]);
        let records = decode_any(&Family::ALL, &row);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model(), "Fineoffset-WH0530");

        assert!(decode_any(&[Family::Wh2, Family::Wh51], &row).is_empty());
    }

    #[test]
    fn test_records_stay_inside_declared_fields() {
        let row = pwm_row(&[0x52, 0x9A, 0x80, 0x24, 0x06, 0x15, 0x13, 0x45, 0x07, 0x8D, 0x97]);
        let record = decode(Family::Wh0530, &row).unwrap();
        let declared = Family::Wh0530.declared_fields();
        assert!(record.names().all(|n| declared.contains(&n)));
    }
}
