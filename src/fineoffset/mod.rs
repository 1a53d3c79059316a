//! # Fine Offset Weather Sensor Protocol
//!
//! Classification, integrity checking and field decoding for Fine Offset
//! (Ecowitt, Renkforce, Froggit, Alecto, Telldus) weather sensor frames.
//!
//! This module handles:
//! - Locating frames behind the FSK preamble or the PWM lead-in
//! - Telling apart variants that share a frame geometry
//! - CRC-8 (poly 0x31) and additive checksum validation
//! - Declarative field layouts with "not measured" sentinels

pub mod bitrow;
pub mod classifier;
pub mod crc;
pub mod decoder;
pub mod fields;
pub mod integrity;
pub mod locator;
pub mod protocol;
pub mod record;

pub use bitrow::{BitRow, BitRowBuilder};
pub use decoder::{decode, decode_any, decode_capture, decode_frame};
pub use protocol::{Family, Variant};
pub use record::{SensorRecord, Value};
