//! Implicit VR Little Endian decoding (`1.2.840.10008.1.2`): every header is
//! tag + 4-byte length; the VR is resolved from the dictionary, never read
//! off the wire (§4.1, §4.2).

use std::io::Read;

use dicom_core::dictionary::DataDictionary;
use dicom_core::length::Length;
use dicom_core::vr::VR;

use super::{decode_after_tag, BasicDecoder, Decode, DecodeToken, Endianness};
use crate::error::{IoSnafu, Result};
use snafu::ResultExt;

/// Decoder for the Implicit VR Little Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplicitLeDecoder;

impl Decode for ImplicitLeDecoder {
    fn decode_header<S: Read>(
        &self,
        source: &mut S,
        dict: &dyn DataDictionary,
    ) -> Result<DecodeToken> {
        let basic = self.basic();
        let tag = basic.decode_tag(&mut *source).context(IoSnafu { tag: dicom_core::tag::Tag(0, 0) })?;
        decode_after_tag(tag, source, basic, |source, basic| {
            let vr = dict.by_tag(tag).primary_vr();
            let len = basic.decode_ul(&mut *source).context(IoSnafu { tag })?;
            Ok((resolve_overlong_vr(vr), Length(len)))
        })
    }

    fn basic(&self) -> BasicDecoder {
        BasicDecoder(Endianness::Little)
    }
}

/// SQ and the opaque VRs always take a 4-byte length regardless of how the
/// dictionary classifies them; this only matters for VRs the dictionary
/// resolves to something incompatible with a 4-byte-length element, which
/// cannot happen for a well-formed dictionary, but is kept explicit for
/// parity with the explicit-VR decoders' special-VR branch.
fn resolve_overlong_vr(vr: VR) -> VR {
    vr
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::dictionary::StubDictionary;
    use dicom_core::header::Header;

    #[test]
    fn decodes_unknown_tag_as_un() {
        // (0010,0010), length 4, implicit VR.
        let bytes = [0x10, 0x00, 0x10, 0x00, 0x04, 0x00, 0x00, 0x00];
        let dec = ImplicitLeDecoder;
        let token = dec
            .decode_header(&mut &bytes[..], &StubDictionary)
            .unwrap();
        match token {
            DecodeToken::ElementHeader(h) => {
                assert_eq!(h.tag(), dicom_core::tag::Tag(0x0010, 0x0010));
                assert_eq!(h.vr(), VR::UN);
                assert_eq!(h.len().get(), Some(4));
            }
            other => panic!("unexpected token: {:?}", other),
        }
    }

    #[test]
    fn decodes_item_marker() {
        let bytes = [0xFE, 0xFF, 0x00, 0xE0, 0x08, 0x00, 0x00, 0x00];
        let dec = ImplicitLeDecoder;
        let token = dec
            .decode_header(&mut &bytes[..], &StubDictionary)
            .unwrap();
        assert_eq!(token, DecodeToken::ItemHeader(Length(8)));
    }
}
