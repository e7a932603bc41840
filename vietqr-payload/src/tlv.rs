//! Tag-Length-Value encoding for EMVCo MPM payloads
//!
//! Each field is `TTLLvvv…`: a two-digit tag, a two-digit character count,
//! then the value. Nested templates (merchant account information,
//! additional data) are themselves TLV strings carried as the value of an
//! outer field.

use serde::Serialize;

use crate::{Error, Result};

/// Longest value representable by the two-digit length prefix
pub const MAX_VALUE_LEN: usize = 99;

/// A field value, typed so numbers and text never coerce silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Free text, expected to be ASCII after upstream sanitization
    Text(&'a str),
    /// A non-negative integer, rendered as a plain decimal string
    Numeric(u64),
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Text(s)
    }
}

impl From<u64> for Value<'_> {
    fn from(n: u64) -> Self {
        Value::Numeric(n)
    }
}

/// Encode a single TLV field.
///
/// An empty value encodes to the empty string: the field is omitted from its
/// parent rather than emitted with a zero length. A value longer than
/// [`MAX_VALUE_LEN`] characters fails with [`Error::FieldOverflow`].
pub fn encode(tag: u8, value: Value<'_>) -> Result<String> {
    debug_assert!(tag <= 99, "TLV tags are two digits");
    let rendered;
    let value = match value {
        Value::Text(s) => s,
        Value::Numeric(n) => {
            rendered = n.to_string();
            rendered.as_str()
        }
    };
    if value.is_empty() {
        return Ok(String::new());
    }
    let len = value.chars().count();
    if len > MAX_VALUE_LEN {
        return Err(Error::FieldOverflow { tag, len });
    }
    Ok(format!("{:02}{:02}{}", tag, len, value))
}

/// A decoded TLV field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub tag: u8,
    pub value: String,
}

/// Parse a TLV string into its fields, consuming the length prefixes.
///
/// This parses a single nesting level; the values of template fields (38,
/// 62) can be fed back through to expand them.
pub fn parse(payload: &str) -> Result<Vec<Field>> {
    if !payload.is_ascii() {
        return Err(Error::InvalidPayload(
            "payload contains non-ASCII characters".into(),
        ));
    }
    let mut fields = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        if rest.len() < 4 {
            return Err(Error::InvalidPayload(format!(
                "truncated field header {rest:?}"
            )));
        }
        let (header, tail) = rest.split_at(4);
        let tag: u8 = header[..2]
            .parse()
            .map_err(|_| Error::InvalidPayload(format!("non-numeric tag in {header:?}")))?;
        let len: usize = header[2..]
            .parse()
            .map_err(|_| Error::InvalidPayload(format!("non-numeric length in {header:?}")))?;
        if tail.len() < len {
            return Err(Error::InvalidPayload(format!(
                "field {tag:02} declares {len} characters but only {} remain",
                tail.len()
            )));
        }
        let (value, tail) = tail.split_at(len);
        fields.push(Field {
            tag,
            value: value.to_string(),
        });
        rest = tail;
    }
    Ok(fields)
}
