//! Row builders shared by the integration tests

#![allow(dead_code)]

use fineoffset_decoder::fineoffset::protocol::FSK_PREAMBLE;
use fineoffset_decoder::fineoffset::{BitRow, BitRowBuilder, SensorRecord};

/// Seven 1-bits, then the frame
pub fn pwm_row(frame: &[u8]) -> BitRow {
    BitRowBuilder::new().push_bits(0x7F, 7).push_bytes(frame).build()
}

/// `lead` alternating bits ending in 0, the FSK preamble, the frame, then `trailing` zero bits.
///
/// The frame starts at bit `lead + 24`.
pub fn fsk_row(lead: usize, frame: &[u8], trailing: usize) -> BitRow {
    let mut builder = BitRowBuilder::new();
    for i in 0..lead {
        builder.push_bit((lead - i) % 2 == 0);
    }
    builder
        .push_bytes(&FSK_PREAMBLE)
        .push_bytes(frame)
        .push_bits(0, trailing);
    builder.build()
}

pub fn hex(s: &str) -> Vec<u8> {
    s.split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

pub fn int(record: &SensorRecord, name: &str) -> i64 {
    record
        .get(name)
        .and_then(|v| v.as_i64())
        .unwrap_or_else(|| panic!("{} missing in {}", name, record))
}

pub fn float(record: &SensorRecord, name: &str) -> f64 {
    record
        .get(name)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("{} missing in {}", name, record))
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

// Valid frames, trailers included
pub const WH2: &str = "45 31 0F 3C CF";
pub const WH2_FROST: &str = "45 38 2D FF CA";
pub const WH5: &str = "45 32 8F 3C 26";
pub const WH0530: &str = "38 a2 8f 02 00 ff e7 51";
pub const ALECTO_V1: &str = "38 A2 8F 02 00 FF E7";
pub const ALECTO_V1_COLD: &str = "31 29 5E 10 27 FF 4B";
pub const ALECTO_V2: &str = "38 A2 8F 02 00 FF E7 51 00 00 00";
pub const ALECTO_DCF: &str = "52 9A 80 24 06 15 13 45 07 8D 97";
pub const WH24: &str = "24 5A B4 02 8F 41 10 05 00 0A 01 F4 00 27 10 8D DC";
pub const WH24_SENTINELS: &str = "24 5A FF 97 FF FF FF FF 00 0A FF FF FF FF FF FB 10";
pub const WH24_NEAR_SENTINELS: &str = "24 5A FE 97 FE FE FE FE 00 0A FF FE FF FF FE 2D 3B";
pub const WH25: &str = "E4 B2 8F 37 27 9C 1F 55";
pub const WH25_NO_PRESSURE: &str = "E4 BA 8F 37 FF FF 62 6E";
pub const WH25_PRESSURE_FFFE: &str = "E4 B2 8F 37 FF FE 59 FE";
pub const WH32: &str = "D4 B2 8F 37 27 9C 0F 56";
pub const WH0290: &str = "41 7C 40 7B 40 C8 65 E5";
pub const WH51: &str = "51 A1 B2 C3 4F 00 32 01 7F 00 00 00 63 CB";
