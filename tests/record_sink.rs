//! Record emission through a mocked sink (mockall)

mod common;

use common::*;
use fineoffset_decoder::error::{Error, Result};
use fineoffset_decoder::fineoffset::{BitRow, Family, SensorRecord};
use fineoffset_decoder::telemetry::{decode_and_emit, RecordSink};
use mockall::mock;
use mockall::Sequence;

mock! {
    pub Sink {}

    impl RecordSink for Sink {
        fn emit(&mut self, record: &SensorRecord) -> Result<()>;
    }
}

#[test]
fn test_emits_decoded_record() {
    let mut sink = MockSink::new();
    sink.expect_emit()
        .withf(|record| record.model() == "Fineoffset-WH0530" && record.contains("rain_mm"))
        .times(1)
        .returning(|_| Ok(()));

    let count = decode_and_emit(&Family::ALL, &pwm_row(&hex(WH0530)), &mut sink).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_no_emit_on_failed_decode() {
    let mut sink = MockSink::new();
    sink.expect_emit().never();

    let mut corrupt = hex(WH0530);
    corrupt[2] ^= 0x01;
    assert_eq!(decode_and_emit(&Family::ALL, &pwm_row(&corrupt), &mut sink).unwrap(), 0);

    let noise = BitRow::from_bytes(&[0x5A; 40]);
    assert_eq!(decode_and_emit(&Family::ALL, &noise, &mut sink).unwrap(), 0);
}

#[test]
fn test_disabled_family_is_not_run() {
    let mut sink = MockSink::new();
    sink.expect_emit().never();

    let row = fsk_row(16, &hex(WH51), 0);
    assert_eq!(decode_and_emit(&[Family::Wh2, Family::Wh25], &row, &mut sink).unwrap(), 0);
}

#[test]
fn test_rows_emit_in_order() {
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    sink.expect_emit()
        .withf(|record| record.model() == "Fineoffset-WH25")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    sink.expect_emit()
        .withf(|record| record.model() == "Fineoffset-WH51")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    decode_and_emit(&Family::ALL, &fsk_row(16, &hex(WH25), 376), &mut sink).unwrap();
    decode_and_emit(&Family::ALL, &fsk_row(16, &hex(WH51), 0), &mut sink).unwrap();
}

#[test]
fn test_sink_error_propagates() {
    let mut sink = MockSink::new();
    sink.expect_emit().times(1).returning(|_| {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "closed",
        )))
    });

    let result = decode_and_emit(&Family::ALL, &pwm_row(&hex(WH0530)), &mut sink);
    assert!(matches!(result, Err(Error::Io(_))));
}
