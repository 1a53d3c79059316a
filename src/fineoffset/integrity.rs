//! # Integrity Validation
//!
//! Each variant lists the checks its frame must pass. A check covers the
//! first `len` bytes and compares against the trailer byte at `trailer`.

use tracing::debug;

use super::crc::{add_bytes, crc8, xor_bytes_swapped};
use super::protocol::Variant;
use crate::error::{DecodeError, DecodeResult};

/// One integrity check over a frame prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// CRC-8 poly 0x31 init 0x00
    Crc8 { len: usize, trailer: usize },
    /// Byte sum modulo 256
    Sum { len: usize, trailer: usize },
    /// Byte XOR with nibbles swapped
    XorSwapped { len: usize, trailer: usize },
}

impl Check {
    /// Computed and received values
    fn evaluate(self, frame: &[u8]) -> (u8, u8) {
        match self {
            Check::Crc8 { len, trailer } => (crc8(&frame[..len]), frame[trailer]),
            Check::Sum { len, trailer } => (add_bytes(&frame[..len]), frame[trailer]),
            Check::XorSwapped { len, trailer } => {
                (xor_bytes_swapped(&frame[..len]), frame[trailer])
            }
        }
    }

    fn name(self) -> &'static str {
        match self {
            Check::Crc8 { .. } => "CRC",
            Check::Sum { .. } => "Checksum",
            Check::XorSwapped { .. } => "Bitsum",
        }
    }
}

const fn crc(len: usize) -> Check {
    Check::Crc8 { len, trailer: len }
}

const fn sum(len: usize) -> Check {
    Check::Sum { len, trailer: len }
}

const WH2_CHECKS: &[Check] = &[crc(4)];
const WH24_CHECKS: &[Check] = &[crc(15), sum(16)];
const CRC_SUM_7_CHECKS: &[Check] = &[crc(6), sum(7)];
const WH25_CHECKS: &[Check] = &[sum(6), Check::XorSwapped { len: 6, trailer: 7 }];
const WH32_CHECKS: &[Check] = &[sum(6)];
const WH51_CHECKS: &[Check] = &[sum(13), crc(12)];
const ALECTO_V1_CHECKS: &[Check] = &[crc(6)];
const ALECTO_DCF_CHECKS: &[Check] = &[crc(9), sum(10)];

/// Checks a frame of the given variant must pass, in evaluation order
pub fn checks(variant: Variant) -> &'static [Check] {
    match variant {
        Variant::Wh2 | Variant::Wh2a | Variant::Wh5 | Variant::Telldus => WH2_CHECKS,
        Variant::Wh24 | Variant::Wh65b => WH24_CHECKS,
        Variant::Wh0290 | Variant::Wh0530 | Variant::AlectoV2 => CRC_SUM_7_CHECKS,
        Variant::Wh25 => WH25_CHECKS,
        Variant::Wh32 | Variant::Wh32b => WH32_CHECKS,
        Variant::Wh51 => WH51_CHECKS,
        Variant::AlectoV1 => ALECTO_V1_CHECKS,
        Variant::AlectoV2Dcf => ALECTO_DCF_CHECKS,
    }
}

/// Verify every check for the variant
///
/// # Errors
///
/// Returns `FailIntegrity` on the first mismatching check
pub fn validate(variant: Variant, frame: &[u8]) -> DecodeResult<()> {
    if frame.len() < variant.frame_len() {
        return Err(DecodeError::AbortLength);
    }

    for &check in checks(variant) {
        let (computed, received) = check.evaluate(frame);
        if computed != received {
            debug!(
                "{}: {} error: computed {:02x}, received {:02x}, frame {:02x?}",
                variant,
                check.name(),
                computed,
                received,
                frame
            );
            return Err(DecodeError::FailIntegrity);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wh0530_capture_validates() {
        let frame = [0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x51];
        assert!(validate(Variant::Wh0530, &frame).is_ok());
    }

    #[test]
    fn test_wh0530_bad_sum() {
        let frame = [0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7, 0x52];
        assert_eq!(validate(Variant::Wh0530, &frame), Err(DecodeError::FailIntegrity));
    }

    #[test]
    fn test_wh25_xor_only_for_wh25() {
        let mut frame = [0xE4, 0xB2, 0x8F, 0x37, 0x27, 0x9C, 0x1F, 0x55];
        assert!(validate(Variant::Wh25, &frame).is_ok());

        frame[7] = 0x00;
        assert_eq!(validate(Variant::Wh25, &frame), Err(DecodeError::FailIntegrity));
        assert!(validate(Variant::Wh32b, &frame).is_ok());
        assert!(validate(Variant::Wh32, &frame).is_ok());
    }

    #[test]
    fn test_checks_fit_frames() {
        let variants = [
            Variant::Wh2,
            Variant::Wh2a,
            Variant::Wh5,
            Variant::Telldus,
            Variant::Wh0530,
            Variant::Wh24,
            Variant::Wh65b,
            Variant::Wh25,
            Variant::Wh32,
            Variant::Wh32b,
            Variant::Wh0290,
            Variant::Wh51,
            Variant::AlectoV1,
            Variant::AlectoV2,
            Variant::AlectoV2Dcf,
        ];
        for variant in variants {
            assert!(!checks(variant).is_empty());
            for check in checks(variant) {
                let (len, trailer) = match *check {
                    Check::Crc8 { len, trailer }
                    | Check::Sum { len, trailer }
                    | Check::XorSwapped { len, trailer } => (len, trailer),
                };
                assert!(len <= trailer && trailer < variant.frame_len(), "{:?}", variant);
            }
        }
    }

    #[test]
    fn test_check_lists_per_variant() {
        assert_eq!(checks(Variant::Telldus), &[Check::Crc8 { len: 4, trailer: 4 }]);
        assert_eq!(
            checks(Variant::Wh65b),
            &[Check::Crc8 { len: 15, trailer: 15 }, Check::Sum { len: 16, trailer: 16 }]
        );
        assert_eq!(
            checks(Variant::Wh51),
            &[Check::Sum { len: 13, trailer: 13 }, Check::Crc8 { len: 12, trailer: 12 }]
        );
        assert_eq!(checks(Variant::Wh0290), checks(Variant::Wh0530));
    }

    #[test]
    fn test_short_frame_rejected() {
        assert_eq!(validate(Variant::Wh24, &[0x24; 10]), Err(DecodeError::AbortLength));
    }
}
