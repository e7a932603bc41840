//! CRC-16/CCITT-FALSE checksum engine
//!
//! The EMVCo MPM checksum: initial value `0xFFFF`, polynomial `0x1021`,
//! MSB-first, no input/output reflection, no final XOR. Payloads are ASCII,
//! so the byte-wise CRC and the character-wise CRC coincide.

/// Compute the CRC-16/CCITT-FALSE of a byte slice.
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Render the checksum of `data` as four uppercase hex digits.
pub fn checksum_hex(data: &str) -> String {
    format!("{:04X}", crc16_ccitt_false(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_standard_check_vector() {
        // The canonical CRC-16/CCITT-FALSE check value
        assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
        assert_eq!(checksum_hex("123456789"), "29B1");
    }

    #[test]
    fn test_known_inputs() {
        assert_eq!(checksum_hex(""), "FFFF");
        assert_eq!(checksum_hex("A"), "B915");
        assert_eq!(checksum_hex("Ung ho CLYT"), "8D2E");
    }

    #[test]
    fn test_deterministic_and_well_formed() {
        let inputs = ["", "x", "00020101021138", "a slightly longer input 123"];
        for input in inputs {
            let first = checksum_hex(input);
            let second = checksum_hex(input);
            assert_eq!(first, second);
            assert_eq!(first.len(), 4);
            assert!(first
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    proptest! {
        #[test]
        fn checksum_is_four_uppercase_hex_digits(input in "[ -~]{0,200}") {
            let hex = checksum_hex(&input);
            prop_assert_eq!(hex.len(), 4);
            prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
            prop_assert_eq!(hex, checksum_hex(&input));
        }
    }
}
