//! VietQR payload assembly
//!
//! Composes the Napas field catalog into the final transmittable string:
//! nested merchant-account and additional-data templates, the fixed
//! top-level fields in canonical order, then the CRC-16/CCITT-FALSE over
//! everything assembled so far (including the checksum field's own `6304`
//! header).

use std::fmt;

use crate::{
    crc, sanitize_content,
    tlv::{self, Value},
    BeneficiaryAccount, Error, Result, COUNTRY_VN, CURRENCY_VND, MCC_UNSPECIFIED, NAPAS_GUID,
    PAYLOAD_FORMAT_INDICATOR, POI_DYNAMIC, POI_STATIC, SERVICE_IBFT_TO_ACCOUNT,
};

// Top-level field tags, in emission order
const TAG_PAYLOAD_FORMAT: u8 = 0;
const TAG_POI_METHOD: u8 = 1;
const TAG_MERCHANT_ACCOUNT: u8 = 38;
const TAG_MCC: u8 = 52;
const TAG_CURRENCY: u8 = 53;
const TAG_AMOUNT: u8 = 54;
const TAG_COUNTRY: u8 = 58;
const TAG_ADDITIONAL_DATA: u8 = 62;

// Within the tag 38 template
const TAG_GUID: u8 = 0;
const TAG_CONSUMER_ACCOUNT: u8 = 1;
const TAG_SERVICE_CODE: u8 = 2;

// Within the consumer-account template (38/01)
const TAG_BENEFICIARY_BIN: u8 = 0;
const TAG_BENEFICIARY_NUMBER: u8 = 1;

// Within the tag 62 template
const TAG_PURPOSE: u8 = 8;

/// Checksum tag 63 plus its fixed length 04. The CRC covers the payload up
/// to and including this header.
const CHECKSUM_HEADER: &str = "6304";

/// An assembled VietQR payload.
#[derive(Debug, Clone)]
pub struct VietQr {
    bin: String,
    account_number: String,
    content: Option<String>,
    amount: Option<u64>,
    payload: String,
}

impl VietQr {
    /// Bank identification number of the beneficiary
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Beneficiary account number
    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    /// Sanitized purpose-of-transaction text, if any
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Transfer amount in VND, if the QR is dynamic
    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    /// The complete payload string, checksum included
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Consume self and return the payload string
    pub fn into_payload(self) -> String {
        self.payload
    }
}

impl fmt::Display for VietQr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)
    }
}

/// Builder for VietQR payloads.
#[derive(Debug, Clone)]
pub struct VietQrBuilder {
    bin: String,
    account_number: String,
    content: Option<String>,
    amount: Option<u64>,
}

impl VietQrBuilder {
    /// Create a builder for the given bank BIN and account number.
    pub fn new(bin: impl Into<String>, account_number: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            account_number: account_number.into(),
            content: None,
            amount: None,
        }
    }

    /// Create a builder from injected beneficiary configuration.
    pub fn for_account(account: &BeneficiaryAccount) -> Self {
        Self::new(account.bin.clone(), account.number.clone())
    }

    /// Set the purpose-of-transaction text. It is sanitized to ASCII at
    /// build time; if nothing survives sanitization the field is omitted.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the transfer amount in VND, making the QR dynamic. VND has no
    /// subunits, so the amount is a whole number.
    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Validate the inputs and assemble the payload.
    pub fn build(self) -> Result<VietQr> {
        validate_bin(&self.bin)?;
        validate_account_number(&self.account_number)?;
        let content = self
            .content
            .as_deref()
            .map(sanitize_content)
            .filter(|c| !c.is_empty());
        let payload = assemble(&self.bin, &self.account_number, content.as_deref(), self.amount)?;
        Ok(VietQr {
            bin: self.bin,
            account_number: self.account_number,
            content,
            amount: self.amount,
            payload,
        })
    }
}

fn validate_bin(bin: &str) -> Result<()> {
    if bin.len() != 6 || !bin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidBin(bin.to_string()));
    }
    Ok(())
}

fn validate_account_number(number: &str) -> Result<()> {
    if number.is_empty() || number.len() > 19 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAccountNumber(number.to_string()));
    }
    Ok(())
}

fn assemble(
    bin: &str,
    account_number: &str,
    content: Option<&str>,
    amount: Option<u64>,
) -> Result<String> {
    let consumer_account = format!(
        "{}{}",
        tlv::encode(TAG_BENEFICIARY_BIN, Value::Text(bin))?,
        tlv::encode(TAG_BENEFICIARY_NUMBER, Value::Text(account_number))?,
    );
    let merchant_info = format!(
        "{}{}{}",
        tlv::encode(TAG_GUID, Value::Text(NAPAS_GUID))?,
        tlv::encode(TAG_CONSUMER_ACCOUNT, Value::Text(&consumer_account))?,
        tlv::encode(TAG_SERVICE_CODE, Value::Text(SERVICE_IBFT_TO_ACCOUNT))?,
    );

    let poi = if amount.is_some() { POI_DYNAMIC } else { POI_STATIC };

    let mut payload = String::with_capacity(160);
    payload.push_str(&tlv::encode(TAG_PAYLOAD_FORMAT, Value::Text(PAYLOAD_FORMAT_INDICATOR))?);
    payload.push_str(&tlv::encode(TAG_POI_METHOD, Value::Text(poi))?);
    payload.push_str(&tlv::encode(TAG_MERCHANT_ACCOUNT, Value::Text(&merchant_info))?);
    payload.push_str(&tlv::encode(TAG_MCC, Value::Text(MCC_UNSPECIFIED))?);
    payload.push_str(&tlv::encode(TAG_CURRENCY, Value::Text(CURRENCY_VND))?);
    if let Some(amount) = amount {
        payload.push_str(&tlv::encode(TAG_AMOUNT, Value::Numeric(amount))?);
    }
    payload.push_str(&tlv::encode(TAG_COUNTRY, Value::Text(COUNTRY_VN))?);
    if let Some(content) = content {
        let purpose = tlv::encode(TAG_PURPOSE, Value::Text(content))?;
        payload.push_str(&tlv::encode(TAG_ADDITIONAL_DATA, Value::Text(&purpose))?);
    }

    payload.push_str(CHECKSUM_HEADER);
    let checksum = crc::checksum_hex(&payload);
    payload.push_str(&checksum);
    Ok(payload)
}

/// Generate a payload in one call.
///
/// `info` is sanitized before it enters the payload; an empty or
/// fully-stripped string omits the additional-data field entirely.
pub fn generate_payload(
    bin: &str,
    account_number: &str,
    info: Option<&str>,
    amount: Option<u64>,
) -> Result<String> {
    let mut builder = VietQrBuilder::new(bin, account_number);
    if let Some(info) = info {
        builder = builder.content(info);
    }
    if let Some(amount) = amount {
        builder = builder.amount(amount);
    }
    builder.build().map(VietQr::into_payload)
}

/// Verify that a payload's trailing four characters are the correct
/// CRC-16/CCITT-FALSE of everything before them.
pub fn verify_checksum(payload: &str) -> Result<()> {
    if !payload.is_ascii() || payload.len() < CHECKSUM_HEADER.len() + 4 {
        return Err(Error::InvalidPayload(
            "payload too short to carry a checksum".into(),
        ));
    }
    let (body, found) = payload.split_at(payload.len() - 4);
    if !body.ends_with(CHECKSUM_HEADER) {
        return Err(Error::InvalidPayload(format!(
            "payload does not end in a {CHECKSUM_HEADER}-prefixed checksum field"
        )));
    }
    let computed = crc::checksum_hex(body);
    if computed != found {
        return Err(Error::ChecksumMismatch {
            found: found.to_string(),
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIN: &str = "970418";
    const ACCOUNT: &str = "1000001001242424";

    fn decode_top_level(payload: &str) -> Vec<tlv::Field> {
        tlv::parse(payload).unwrap()
    }

    #[test]
    fn test_static_payload_golden() {
        let payload = generate_payload(BIN, ACCOUNT, None, None).unwrap();
        assert_eq!(
            payload,
            "00020101021138600010A00000072701300006970418011610000010012424240208QRIBFTTA5204000053037045802VN6304E525"
        );
    }

    #[test]
    fn test_payload_with_content_golden() {
        let payload = generate_payload(BIN, ACCOUNT, Some("Ung ho CLYT"), None).unwrap();
        assert_eq!(
            payload,
            "00020101021138600010A00000072701300006970418011610000010012424240208QRIBFTTA5204000053037045802VN62150811Ung ho CLYT630457DD"
        );
    }

    #[test]
    fn test_dynamic_payload_golden() {
        let payload =
            generate_payload(BIN, ACCOUNT, Some("Ung ho CLYT"), Some(100_000)).unwrap();
        assert_eq!(
            payload,
            "00020101021238600010A00000072701300006970418011610000010012424240208QRIBFTTA52040000530370454061000005802VN62150811Ung ho CLYT6304C456"
        );
    }

    #[test]
    fn test_static_payload_field_set() {
        let payload = generate_payload(BIN, ACCOUNT, None, None).unwrap();
        let fields = decode_top_level(&payload);
        let tags: Vec<u8> = fields.iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![0, 1, 38, 52, 53, 58, 63]);
        assert_eq!(fields[1].value, "11");
        assert_eq!(fields[6].value.len(), 4);
    }

    #[test]
    fn test_amount_flips_poi_and_adds_tag_54() {
        let payload = generate_payload(BIN, ACCOUNT, None, Some(50_000)).unwrap();
        assert_eq!(
            payload,
            "00020101021238600010A00000072701300006970418011610000010012424240208QRIBFTTA5204000053037045405500005802VN6304CBC3"
        );
        let fields = decode_top_level(&payload);
        let tags: Vec<u8> = fields.iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![0, 1, 38, 52, 53, 54, 58, 63]);
        assert_eq!(fields[1].value, "12");
        assert_eq!(fields[5].value, "50000");
    }

    #[test]
    fn test_merchant_template_nesting() {
        let payload = generate_payload(BIN, ACCOUNT, None, None).unwrap();
        let fields = decode_top_level(&payload);
        let merchant = &fields.iter().find(|f| f.tag == 38).unwrap().value;

        let inner = tlv::parse(merchant).unwrap();
        assert_eq!(inner[0].tag, 0);
        assert_eq!(inner[0].value, NAPAS_GUID);
        assert_eq!(inner[2].tag, 2);
        assert_eq!(inner[2].value, SERVICE_IBFT_TO_ACCOUNT);

        let consumer = tlv::parse(&inner[1].value).unwrap();
        assert_eq!(consumer[0].value, BIN);
        assert_eq!(consumer[1].value, ACCOUNT);
    }

    #[test]
    fn test_content_is_sanitized_into_tag_62() {
        let payload = generate_payload(BIN, ACCOUNT, Some("Bé Ánh - LCL001"), None).unwrap();
        let fields = decode_top_level(&payload);
        let additional = &fields.iter().find(|f| f.tag == 62).unwrap().value;
        let inner = tlv::parse(additional).unwrap();
        assert_eq!(inner[0].tag, 8);
        assert_eq!(inner[0].value, "Be Anh LCL001");
    }

    #[test]
    fn test_blank_content_omits_tag_62() {
        for info in ["", "   ", "!!!"] {
            let payload = generate_payload(BIN, ACCOUNT, Some(info), None).unwrap();
            let fields = decode_top_level(&payload);
            assert!(fields.iter().all(|f| f.tag != 62), "info {info:?}");
        }
    }

    #[test]
    fn test_checksum_round_trip() {
        let payload = generate_payload(BIN, ACCOUNT, Some("Ung ho CLYT"), Some(20_000)).unwrap();
        verify_checksum(&payload).unwrap();

        let mut tampered = payload.clone();
        tampered.replace_range(6..8, "99");
        assert!(matches!(
            verify_checksum(&tampered),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_builder_accessors() {
        let account = BeneficiaryAccount {
            bin: BIN.into(),
            number: ACCOUNT.into(),
            holder: Some("Cap la yeu thuong".into()),
        };
        let qr = VietQrBuilder::for_account(&account)
            .content("Bé Ánh - LCL001")
            .amount(100_000)
            .build()
            .unwrap();
        assert_eq!(qr.bin(), BIN);
        assert_eq!(qr.account_number(), ACCOUNT);
        assert_eq!(qr.content(), Some("Be Anh LCL001"));
        assert_eq!(qr.amount(), Some(100_000));
        assert_eq!(qr.to_string(), qr.payload());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            generate_payload("97041", ACCOUNT, None, None),
            Err(Error::InvalidBin(_))
        ));
        assert!(matches!(
            generate_payload("9704AB", ACCOUNT, None, None),
            Err(Error::InvalidBin(_))
        ));
        assert!(matches!(
            generate_payload(BIN, "", None, None),
            Err(Error::InvalidAccountNumber(_))
        ));
        assert!(matches!(
            generate_payload(BIN, "12345678901234567890", None, None),
            Err(Error::InvalidAccountNumber(_))
        ));
        assert!(matches!(
            generate_payload(BIN, "12-34", None, None),
            Err(Error::InvalidAccountNumber(_))
        ));
    }
}
