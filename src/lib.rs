//! # Fine Offset Decoder Library
//!
//! Decode Fine Offset and Alecto weather sensor transmissions from
//! demodulated bit rows.
//!
//! The decoder is pure and stateless: a row goes in, a [`fineoffset::SensorRecord`]
//! or a [`error::DecodeError`] comes out. The [`telemetry`] module writes records
//! out as JSON Lines.

pub mod config;
pub mod error;
pub mod fineoffset;
pub mod telemetry;
