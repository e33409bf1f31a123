//! Explicit VR Little Endian decoding (`1.2.840.10008.1.2.1`): each header
//! carries its own two-letter VR code, followed by either a 2-byte or
//! 4-byte length field depending on [`VR::is_special`] (§4.1).

use std::io::Read;

use dicom_core::dictionary::DataDictionary;
use dicom_core::length::Length;
use dicom_core::vr::VR;

use super::{decode_after_tag, BasicDecoder, Decode, DecodeToken, Endianness};
use crate::error::{IoSnafu, Result, UnknownVrSnafu};
use snafu::ResultExt;

/// Decoder for the Explicit VR Little Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitLeDecoder;

impl Decode for ExplicitLeDecoder {
    fn decode_header<S: Read>(
        &self,
        source: &mut S,
        _dict: &dyn DataDictionary,
    ) -> Result<DecodeToken> {
        let basic = self.basic();
        let tag = basic
            .decode_tag(&mut *source)
            .context(IoSnafu { tag: dicom_core::tag::Tag(0, 0) })?;
        decode_after_tag(tag, source, basic, |source, basic| {
            read_explicit_vr_and_len(tag, source, basic)
        })
    }

    fn basic(&self) -> BasicDecoder {
        BasicDecoder(Endianness::Little)
    }
}

/// Read a VR code and its associated length field, in the layout shared by
/// both explicit-VR profiles (only endianness of the numeric fields
/// differs, carried by `basic`).
pub(super) fn read_explicit_vr_and_len<S: Read>(
    tag: dicom_core::tag::Tag,
    source: &mut S,
    basic: BasicDecoder,
) -> Result<(VR, Length)> {
    let mut code = [0u8; 2];
    source.read_exact(&mut code).context(IoSnafu { tag })?;
    let vr = vr_from_code(code).context(UnknownVrSnafu { code })?;

    let len = if vr.is_special() {
        let mut reserved = [0u8; 2];
        source.read_exact(&mut reserved).context(IoSnafu { tag })?;
        basic.decode_ul(&mut *source).context(IoSnafu { tag })?
    } else {
        basic.decode_us(&mut *source).context(IoSnafu { tag })? as u32
    };
    Ok((vr, Length(len)))
}

fn vr_from_code(code: [u8; 2]) -> Option<VR> {
    std::str::from_utf8(&code).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::dictionary::StubDictionary;
    use dicom_core::header::Header;

    #[test]
    fn decodes_short_form_vr() {
        // (0008,0020) DA, length 8.
        let bytes = [0x08, 0x00, 0x20, 0x00, b'D', b'A', 0x08, 0x00];
        let dec = ExplicitLeDecoder;
        let token = dec
            .decode_header(&mut &bytes[..], &StubDictionary)
            .unwrap();
        match token {
            DecodeToken::ElementHeader(h) => {
                assert_eq!(h.vr(), VR::DA);
                assert_eq!(h.len().get(), Some(8));
            }
            other => panic!("unexpected token: {:?}", other),
        }
    }

    #[test]
    fn decodes_long_form_vr() {
        // (7FE0,0010) OB, reserved 0000, length 4 (undefined-length would be 0xFFFFFFFF).
        let bytes = [
            0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        ];
        let dec = ExplicitLeDecoder;
        let token = dec
            .decode_header(&mut &bytes[..], &StubDictionary)
            .unwrap();
        match token {
            DecodeToken::ElementHeader(h) => {
                assert_eq!(h.vr(), VR::OB);
                assert_eq!(h.len().get(), Some(4));
            }
            other => panic!("unexpected token: {:?}", other),
        }
    }

    #[test]
    fn unknown_vr_code_is_rejected() {
        let bytes = [0x08, 0x00, 0x20, 0x00, b'Z', b'Z', 0x08, 0x00];
        let dec = ExplicitLeDecoder;
        let err = dec
            .decode_header(&mut &bytes[..], &StubDictionary)
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownVr { .. }));
    }
}
