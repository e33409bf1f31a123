//! Per-VR codec for an element's value field (§4.1): numeric fixed-width
//! reads for the binary VRs, backslash-split text for the multi-valued
//! string VRs, a single indivisible string for LT/ST/UT, a tag sequence for
//! AT, and an opaque byte run for OB/OW/UN. SQ is handled by the dataset
//! tree builder (`dicom-parser`), not here.

use dicom_core::tag::Tag;
use dicom_core::value::{PrimitiveValue, C};
use dicom_core::vr::VR;

use crate::decode::basic::BasicDecoder;
use crate::encode::basic::BasicEncoder;
use crate::error::{IoSnafu, Result, WriteIoSnafu};
use crate::text;
use snafu::ResultExt;

/// Decode a primitive value field, already isolated to exactly its declared
/// length, under the given VR and endianness.
pub fn decode_value(tag: Tag, vr: VR, bytes: &[u8], basic: BasicDecoder) -> Result<PrimitiveValue> {
    if bytes.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }

    Ok(match vr {
        VR::AE | VR::AS | VR::CS | VR::DA | VR::DS | VR::DT | VR::IS | VR::LO | VR::PN
        | VR::SH | VR::TM | VR::UI => {
            let text = text::decode_text(tag, bytes)?;
            let values: C<String> = text::split_values(text::trim_trailing_pad(&text))
                .into_iter()
                .map(|s| s.trim_end_matches('\0').to_string())
                .collect();
            PrimitiveValue::Strs(values)
        }
        VR::LT | VR::ST | VR::UT => {
            let text = text::decode_text(tag, bytes)?;
            PrimitiveValue::Str(text::trim_trailing_pad(&text).to_string())
        }
        VR::AT => {
            let mut tags = C::new();
            for chunk in bytes.chunks_exact(4) {
                tags.push(basic.decode_tag(chunk)?);
            }
            PrimitiveValue::Tags(tags)
        }
        VR::US | VR::OW => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(2) {
                values.push(basic.decode_us(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::U16(values)
        }
        VR::SS => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(2) {
                values.push(basic.decode_ss(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::I16(values)
        }
        VR::UL => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(4) {
                values.push(basic.decode_ul(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::U32(values)
        }
        VR::SL => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(4) {
                values.push(basic.decode_sl(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::I32(values)
        }
        VR::FL | VR::OF => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(4) {
                values.push(basic.decode_fl(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::F32(values)
        }
        VR::FD => {
            let mut values = C::new();
            for chunk in bytes.chunks_exact(8) {
                values.push(basic.decode_fd(chunk).context(IoSnafu { tag })?);
            }
            PrimitiveValue::F64(values)
        }
        VR::OB | VR::UN | VR::NI | VR::NN => PrimitiveValue::U8(C::from_slice(bytes)),
        VR::SQ => PrimitiveValue::Empty,
    })
}

/// Encode a primitive value to its byte-field representation, padding to an
/// even length with the VR's pad byte (§4.1).
pub fn encode_value(
    tag: Tag,
    vr: VR,
    value: &PrimitiveValue,
    basic: BasicEncoder,
) -> Result<Vec<u8>> {
    let mut out = match value {
        PrimitiveValue::Empty => Vec::new(),
        PrimitiveValue::Strs(values) => {
            let joined = values
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\\");
            text::encode_text(tag, &joined)?
        }
        PrimitiveValue::Str(s) => text::encode_text(tag, s)?,
        PrimitiveValue::Tags(tags) => {
            let mut out = Vec::with_capacity(tags.len() * 4);
            for t in tags {
                basic.encode_tag(&mut out, *t)?;
            }
            out
        }
        PrimitiveValue::U8(values) => values.to_vec(),
        PrimitiveValue::I16(values) => {
            let mut out = Vec::with_capacity(values.len() * 2);
            for &v in values {
                basic.encode_ss(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
        PrimitiveValue::U16(values) => {
            let mut out = Vec::with_capacity(values.len() * 2);
            for &v in values {
                basic.encode_us(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
        PrimitiveValue::I32(values) => {
            let mut out = Vec::with_capacity(values.len() * 4);
            for &v in values {
                basic.encode_sl(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
        PrimitiveValue::U32(values) => {
            let mut out = Vec::with_capacity(values.len() * 4);
            for &v in values {
                basic.encode_ul(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
        PrimitiveValue::F32(values) => {
            let mut out = Vec::with_capacity(values.len() * 4);
            for &v in values {
                basic.encode_fl(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
        PrimitiveValue::F64(values) => {
            let mut out = Vec::with_capacity(values.len() * 8);
            for &v in values {
                basic.encode_fd(&mut out, v).context(WriteIoSnafu)?;
            }
            out
        }
    };

    if out.len() % 2 != 0 {
        out.push(vr.pad_byte());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Endianness;

    #[test]
    fn round_trips_multivalued_string() {
        let tag = Tag(0x0008, 0x0008);
        let value = PrimitiveValue::Strs(C::from_vec(vec!["ORIGINAL".into(), "PRIMARY".into()]));
        let basic_e = BasicEncoder(Endianness::Little);
        let bytes = encode_value(tag, VR::CS, &value, basic_e).unwrap();
        assert_eq!(bytes.len() % 2, 0);

        let basic_d = BasicDecoder(Endianness::Little);
        let decoded = decode_value(tag, VR::CS, &bytes, basic_d).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn round_trips_us_values() {
        let tag = Tag(0x0028, 0x0010);
        let value = PrimitiveValue::U16(C::from_vec(vec![512, 512]));
        let basic_e = BasicEncoder(Endianness::Little);
        let bytes = encode_value(tag, VR::US, &value, basic_e).unwrap();
        assert_eq!(bytes, vec![0x00, 0x02, 0x00, 0x02]);

        let basic_d = BasicDecoder(Endianness::Little);
        let decoded = decode_value(tag, VR::US, &bytes, basic_d).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn odd_length_opaque_value_is_padded() {
        let tag = Tag(0x7FE0, 0x0010);
        let value = PrimitiveValue::U8(C::from_vec(vec![1, 2, 3]));
        let basic_e = BasicEncoder(Endianness::Little);
        let bytes = encode_value(tag, VR::OB, &value, basic_e).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 0]);
    }
}
