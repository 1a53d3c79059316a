//! # Error Types
//!
//! Decode outcome codes and the crate-level error type, using `thiserror`.

use thiserror::Error;

/// Outcome of a decode attempt that did not produce a record.
///
/// All variants are local and recoverable. The caller either tries the next
/// candidate decoder or drops the row.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// Bit count outside every accepted length envelope
    #[error("row length does not match any known variant")]
    AbortLength,

    /// Length matched but the header belongs to another variant
    #[error("header does not match this variant")]
    AbortEarly,

    /// A structural constant holds an unexpected value
    #[error("frame failed sanity check")]
    FailSanity,

    /// CRC-8 and/or additive checksum mismatch
    #[error("message integrity check failed")]
    FailIntegrity,
}

impl DecodeError {
    /// Conventional numeric decoder return code.
    pub fn code(self) -> i32 {
        match self {
            DecodeError::AbortLength => -1,
            DecodeError::AbortEarly => -2,
            DecodeError::FailIntegrity => -3,
            DecodeError::FailSanity => -4,
        }
    }
}

/// Result type alias for a single decode
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Decode failures surfaced outside the decode path
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Unparsable textual bit row
    #[error("invalid bit row: {0}")]
    InvalidRow(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Record serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_codes() {
        assert_eq!(DecodeError::AbortLength.code(), -1);
        assert_eq!(DecodeError::AbortEarly.code(), -2);
        assert_eq!(DecodeError::FailIntegrity.code(), -3);
        assert_eq!(DecodeError::FailSanity.code(), -4);
    }

    #[test]
    fn test_decode_error_converts() {
        let err: Error = DecodeError::FailIntegrity.into();
        assert!(matches!(err, Error::Decode(DecodeError::FailIntegrity)));
        assert_eq!(err.to_string(), "decode error: message integrity check failed");
    }
}
