//! # VietQR payment payload construction
//!
//! This crate builds merchant-presented QR payloads for Vietnam's interbank
//! transfer network (VietQR / Napas 247), following the EMVCo MPM field
//! catalog. The output is a plain ASCII string; rendering it as a scannable
//! image is the caller's concern.
//!
//! ## Payload format
//!
//! ```text
//! 000201 010211 38<len><merchant account info> 52040000 5303704
//! [54<len><amount>] 5802VN [62<len><additional data>] 6304<CRC>
//! ```
//!
//! Every field is Tag-Length-Value with a two-digit tag and a two-digit
//! character count. The trailing four characters are the CRC-16/CCITT-FALSE
//! of everything before them, including the `6304` checksum header itself.
//!
//! ## Example
//!
//! ```
//! use vietqr_payload::VietQrBuilder;
//!
//! let qr = VietQrBuilder::new("970418", "1000001001242424")
//!     .content("Ung ho CLYT")
//!     .build()
//!     .unwrap();
//! assert!(qr.payload().starts_with("000201"));
//! ```

use serde::{Deserialize, Serialize};

pub mod crc;
mod error;
mod payload;
mod sanitize;
pub mod tlv;

pub use error::{Error, Result};
pub use payload::{generate_payload, verify_checksum, VietQr, VietQrBuilder};
pub use sanitize::{sanitize_content, MAX_CONTENT_LEN};

/// Globally unique identifier of the Napas transfer service (tag 38/00)
pub const NAPAS_GUID: &str = "A000000727";

/// Service code for interbank funds transfer to a bank account (tag 38/02)
pub const SERVICE_IBFT_TO_ACCOUNT: &str = "QRIBFTTA";

/// Payload format indicator, fixed by the EMVCo MPM specification (tag 00)
pub const PAYLOAD_FORMAT_INDICATOR: &str = "01";

/// Point-of-initiation method for a static QR (no amount embedded)
pub const POI_STATIC: &str = "11";

/// Point-of-initiation method for a dynamic QR (amount embedded)
pub const POI_DYNAMIC: &str = "12";

/// Merchant category code used for person-to-person transfers (tag 52)
pub const MCC_UNSPECIFIED: &str = "0000";

/// ISO 4217 numeric code for the Vietnamese dong (tag 53)
pub const CURRENCY_VND: &str = "704";

/// ISO 3166-1 alpha-2 country code (tag 58)
pub const COUNTRY_VN: &str = "VN";

/// Beneficiary account configuration supplied by the hosting application.
///
/// This is process-wide, read-only data; the crate performs no defaulting.
/// The holder name is display-only and never enters the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryAccount {
    /// Bank identification number within the Napas network (6 digits)
    pub bin: String,
    /// Account number at the receiving bank
    pub number: String,
    /// Account holder name, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}
