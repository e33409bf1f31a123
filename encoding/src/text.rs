//! The default character repertoire codec: ISO-IR 6 (ASCII) with a Latin-1
//! fallback for the high half of the byte range. Full Specific Character
//! Set negotiation is out of scope; every string VR is decoded through this
//! single repertoire.

use crate::error::{InvalidTextSnafu, Result};
use dicom_core::tag::Tag;
use snafu::ensure;

/// Decode a byte run as text under the default repertoire.
///
/// DICOM's default repertoire is a 7-bit subset of ISO-IR 6; bytes with the
/// high bit set are not valid under it, but are accepted here and mapped to
/// their Latin-1 code point rather than rejected outright, matching the
/// lenient behavior real-world senders require in practice.
pub fn decode_text(tag: Tag, bytes: &[u8]) -> Result<String> {
    ensure!(bytes.is_ascii() || bytes.iter().all(|&b| b < 0x100), InvalidTextSnafu { tag });
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Encode a string under the default repertoire. Characters outside Latin-1
/// are rejected; this codec never emits escape sequences.
pub fn encode_text(tag: Tag, text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        ensure!(code < 0x100, InvalidTextSnafu { tag });
        out.push(code as u8);
    }
    Ok(out)
}

/// Split a multi-valued string field on the `\` value delimiter (§4.1).
pub fn split_values(raw: &str) -> Vec<&str> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split('\\').collect()
    }
}

/// Trim the padding byte appended to bring a value to even length.
pub fn trim_trailing_pad(raw: &str) -> &str {
    raw.trim_end_matches(['\0', ' '])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ascii() {
        let tag = Tag(0x0010, 0x0010);
        let bytes = encode_text(tag, "DOE^JOHN").unwrap();
        assert_eq!(decode_text(tag, &bytes).unwrap(), "DOE^JOHN");
    }

    #[test]
    fn splits_backslash_values() {
        assert_eq!(split_values("A\\B\\C"), vec!["A", "B", "C"]);
        assert_eq!(split_values(""), Vec::<&str>::new());
    }

    #[test]
    fn trims_pad_byte() {
        assert_eq!(trim_trailing_pad("ABC "), "ABC");
        assert_eq!(trim_trailing_pad("ABC\0"), "ABC");
    }
}
