//! Explicit VR Big Endian decoding (`1.2.840.10008.1.2.2`). Identical header
//! layout to [`explicit_le`](super::explicit_le), but every numeric field —
//! tag, length — is big-endian (§4.1, §6).

use std::io::Read;

use dicom_core::dictionary::DataDictionary;

use super::explicit_le::read_explicit_vr_and_len;
use super::{decode_after_tag, BasicDecoder, Decode, DecodeToken, Endianness};
use crate::error::{IoSnafu, Result};
use snafu::ResultExt;

/// Decoder for the Explicit VR Big Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitBeDecoder;

impl Decode for ExplicitBeDecoder {
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
        BasicDecoder(Endianness::Big)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::dictionary::StubDictionary;
    use dicom_core::header::Header;
    use dicom_core::vr::VR;

    #[test]
    fn decodes_short_form_vr_big_endian() {
        // (0008,0020) DA, length 8, big-endian tag words.
        let bytes = [0x00, 0x08, 0x00, 0x20, b'D', b'A', 0x00, 0x08];
        let dec = ExplicitBeDecoder;
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
}
