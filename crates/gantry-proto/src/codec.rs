//! Fixed-width field codecs.
//!
//! All integer-like protocol fields are ASCII-hex text: a fixed number of
//! hexadecimal characters that hex-decode to at most four bytes, interpreted
//! as a big-endian signed 32-bit integer. Name fields are ASCII-hex as well,
//! but the decoded bytes are GBK text rather than an integer. The GBK
//! dependency is confined to this module so the charset never leaks into
//! decode dispatch.

use crate::error::{ProtoError, Result};

/// `chrono` layout of every decoded timestamp, as produced by
/// [`format_timestamp`] and carried on delivered events.
pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Decode a fixed-width ASCII-hex field into a signed 32-bit integer.
///
/// Narrower fields are left-padded with zero bytes before conversion. An
/// odd-width field (the protocol declares one, `ETCCar`) is left-padded with
/// a single `'0'` character first so the hex decode is well formed.
pub fn hex_int(field: &[u8], name: &'static str) -> Result<i32> {
    let text = std::str::from_utf8(field).map_err(|_| ProtoError::InvalidText { field: name })?;
    let bytes = decode_hex(text, name)?;
    if bytes.len() > 4 {
        return Err(ProtoError::IntegerOverflow {
            field: name,
            bytes: bytes.len(),
        });
    }
    let mut wide = [0u8; 4];
    wide[4 - bytes.len()..].copy_from_slice(&bytes);
    Ok(i32::from_be_bytes(wide))
}

/// Decode an ASCII-hex field into GBK text, trimming trailing padding spaces.
///
/// Invalid GBK sequences decode to replacement characters rather than
/// failing the frame, matching the tolerant behaviour field controllers
/// rely on.
pub fn gbk_text(field: &[u8], name: &'static str) -> Result<String> {
    let text = std::str::from_utf8(field).map_err(|_| ProtoError::InvalidText { field: name })?;
    let bytes = decode_hex(text, name)?;
    let (decoded, _, _) = encoding_rs::GBK.decode(&bytes);
    Ok(decoded.trim_end_matches(' ').to_string())
}

/// Take a fixed-width field verbatim as ASCII text.
pub fn ascii_text(field: &[u8], name: &'static str) -> Result<String> {
    std::str::from_utf8(field)
        .map(str::to_string)
        .map_err(|_| ProtoError::InvalidText { field: name })
}

/// Reformat a 14-character `YYYYMMDDHHMMSS` timestamp as
/// `YYYY-MM-DD HH:MM:SS`.
///
/// Anything other than exactly 14 characters is a decode error for the
/// whole frame.
pub fn format_timestamp(field: &[u8]) -> Result<String> {
    let text =
        std::str::from_utf8(field).map_err(|_| ProtoError::BadTimestamp { len: field.len() })?;
    if text.len() != 14 {
        return Err(ProtoError::BadTimestamp { len: text.len() });
    }
    Ok(format!(
        "{}-{}-{} {}:{}:{}",
        &text[0..4],
        &text[4..6],
        &text[6..8],
        &text[8..10],
        &text[10..12],
        &text[12..14]
    ))
}

fn decode_hex(text: &str, name: &'static str) -> Result<Vec<u8>> {
    if text.len() % 2 == 1 {
        hex::decode(format!("0{text}"))
    } else {
        hex::decode(text)
    }
    .map_err(|_| ProtoError::InvalidHex { field: name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(b"01", 1; "one byte")]
    #[test_case(b"00FF", 255; "two bytes")]
    #[test_case(b"0000A0C5", 41157; "four bytes")]
    #[test_case(b"4", 4; "odd width pads left")]
    #[test_case(b"FFFFFFFF", -1; "signed wrap")]
    fn test_hex_int(field: &[u8], expected: i32) {
        assert_eq!(hex_int(field, "f").unwrap(), expected);
    }

    #[test]
    fn test_hex_int_rejects_non_hex() {
        assert!(matches!(
            hex_int(b"zz", "f"),
            Err(ProtoError::InvalidHex { field: "f" })
        ));
    }

    #[test]
    fn test_hex_int_rejects_overwide() {
        assert!(matches!(
            hex_int(b"0102030405", "f"),
            Err(ProtoError::IntegerOverflow { bytes: 5, .. })
        ));
    }

    #[test]
    fn test_timestamp_reformat() {
        assert_eq!(
            format_timestamp(b"20240101120000").unwrap(),
            "2024-01-01 12:00:00"
        );
    }

    #[test]
    fn test_timestamp_wrong_width_fails() {
        assert!(matches!(
            format_timestamp(b"2024010112000"),
            Err(ProtoError::BadTimestamp { len: 13 })
        ));
    }

    #[test]
    fn test_gbk_name_trims_padding() {
        // "张三" in GBK is D5C5 C8FD; six hex-encoded padding spaces follow.
        let name = gbk_text(b"D5C5C8FD202020202020", "EmpName").unwrap();
        assert_eq!(name, "张三");
    }

    #[test]
    fn test_ascii_text_keeps_padding() {
        assert_eq!(ascii_text(b"NOTE-001  ", "n").unwrap(), "NOTE-001  ");
    }

    proptest! {
        // Round-trip: any value encodable at a given even width decodes back.
        #[test]
        fn prop_hex_int_round_trip(value in 0u32..=0xFFFF_FFFF) {
            let encoded = format!("{value:08X}");
            let decoded = hex_int(encoded.as_bytes(), "f").unwrap();
            prop_assert_eq!(decoded, value as i32);
        }

        #[test]
        fn prop_hex_int_width_never_panics(width in 1usize..=8, seed in any::<u64>()) {
            // Any ASCII-hex string of a declared width must decode cleanly.
            let digits: String = (0..width)
                .map(|i| char::from_digit(((seed >> (i * 4)) & 0xF) as u32, 16).unwrap_or('0'))
                .collect();
            prop_assert!(hex_int(digits.as_bytes(), "f").is_ok());
        }
    }
}
