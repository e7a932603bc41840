//! Error types for VietQR payload construction

use thiserror::Error;

/// Result type alias for payload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or decoding a payload
#[derive(Debug, Error)]
pub enum Error {
    /// A field value is too long for the two-digit TLV length prefix.
    ///
    /// Clamping here would produce a checksum-valid but semantically wrong
    /// payload that a scanning app happily accepts, so overflow is fatal.
    #[error("field {tag:02} value is {len} characters, exceeding the {max}-character TLV limit", max = crate::tlv::MAX_VALUE_LEN)]
    FieldOverflow { tag: u8, len: usize },

    /// Bank BIN is not exactly six ASCII digits
    #[error("invalid bank BIN (expected 6 digits): {0:?}")]
    InvalidBin(String),

    /// Account number is not 1-19 ASCII digits
    #[error("invalid account number (expected 1-19 digits): {0:?}")]
    InvalidAccountNumber(String),

    /// A payload handed to the decoder is structurally malformed
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The trailing checksum does not match the payload body
    #[error("checksum mismatch: payload carries {found}, computed {computed}")]
    ChecksumMismatch { found: String, computed: String },
}
