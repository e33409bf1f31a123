//! The dataset serialization algorithm (§4.2), the write-side mirror of
//! [`decode`](super::decode): walk an [`InMemDataSet`] tag by tag and emit
//! element headers and value bytes through the codec layer, rewriting
//! sequence and item lengths bottom-up from their freshly serialized
//! contents.
//!
//! Unlike the reader, this walk may recurse: the tree being serialized was
//! built by this same process (never untrusted wire bytes), so its depth is
//! already bounded by whatever built it.

use std::io::Write;

use dicom_core::dataset::InMemDataSet;
use dicom_core::header::{DataElementHeader, Header};
use dicom_core::length::Length;
use dicom_core::pixeldata::PixelFragmentSequence;
use dicom_core::tag::Tag;
use dicom_core::value::Value;
use dicom_core::vr::VR;
use dicom_encoding::decode::Endianness;
use dicom_encoding::encode::{BasicEncoder, Encode, HeaderEncoder};
use dicom_encoding::primitive_value::encode_value;
use dicom_encoding::transfer_syntax::TransferSyntax;

use crate::error::{CodecSnafu, IoSnafu, Result};
use snafu::ResultExt;

/// Serialize a whole dataset to `out` under the given transfer syntax, in
/// tag order.
pub fn write_dataset<W: Write>(dataset: &InMemDataSet, ts: &TransferSyntax, out: &mut W) -> Result<()> {
    let encoder = ts.encoder();
    let basic = ts.basic_encoder();
    for element in dataset.iter() {
        write_element(element, encoder, basic, out)?;
    }
    Ok(())
}

fn write_element<W: Write>(
    element: &dicom_core::header::DataElement<InMemDataSet>,
    encoder: HeaderEncoder,
    basic: BasicEncoder,
    out: &mut W,
) -> Result<()> {
    let tag = element.tag();
    let vr = element.vr();

    match element.value() {
        Value::Primitive(value) => {
            let bytes = encode_value(tag, vr, value, basic).context(CodecSnafu { tag })?;
            let header = DataElementHeader::new(tag, vr, bytes.len() as u32);
            encoder
                .encode_header(out, &header, vr)
                .context(CodecSnafu { tag })?;
            out.write_all(&bytes).context(IoSnafu)?;
            Ok(())
        }
        Value::Sequence { items, length } => write_sequence(tag, items, *length, encoder, basic, out),
        Value::PixelSequence(fragments) => write_encapsulated(tag, fragments, encoder, out),
    }
}

/// Serialize one sequence item's dataset into a standalone buffer, for the
/// enclosing sequence to measure and frame with an `Item` header.
fn encode_item(item: &InMemDataSet, encoder: HeaderEncoder, basic: BasicEncoder) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for element in item.iter() {
        write_element(element, encoder, basic, &mut buf)?;
    }
    Ok(buf)
}

fn write_sequence<W: Write>(
    tag: Tag,
    items: &[InMemDataSet],
    declared_len: Length,
    encoder: HeaderEncoder,
    basic: BasicEncoder,
    out: &mut W,
) -> Result<()> {
    let item_buffers = items
        .iter()
        .map(|item| encode_item(item, encoder, basic))
        .collect::<Result<Vec<_>>>()?;

    let undefined = declared_len.is_undefined();
    let header_len = if undefined {
        Length::UNDEFINED
    } else {
        let total: usize = item_buffers.iter().map(|b| 8 + b.len()).sum();
        Length(total as u32)
    };
    let header = DataElementHeader::new(tag, VR::SQ, header_len);
    encoder
        .encode_header(out, &header, VR::SQ)
        .context(CodecSnafu { tag })?;

    for buf in &item_buffers {
        encoder
            .encode_item_header(out, buf.len() as u32)
            .context(CodecSnafu { tag })?;
        out.write_all(buf).context(IoSnafu)?;
    }

    if undefined {
        encoder
            .encode_sequence_delimitation(out)
            .context(CodecSnafu { tag })?;
    }
    Ok(())
}

/// Write an encapsulated pixel data value: undefined length, a basic offset
/// table item, one item per fragment, and a closing
/// `SequenceDelimitationItem`. Offset table entries are always little
/// endian, matching the decoder's reading convention.
fn write_encapsulated<W: Write>(
    tag: Tag,
    fragments: &PixelFragmentSequence,
    encoder: HeaderEncoder,
    out: &mut W,
) -> Result<()> {
    let header = DataElementHeader::new(tag, VR::OB, Length::UNDEFINED);
    encoder
        .encode_header(out, &header, VR::OB)
        .context(CodecSnafu { tag })?;

    let basic_le = BasicEncoder(Endianness::Little);
    let mut offset_bytes = Vec::with_capacity(fragments.offset_table().len() * 4);
    for &entry in fragments.offset_table() {
        basic_le
            .encode_ul(&mut offset_bytes, entry)
            .context(IoSnafu)?;
    }
    encoder
        .encode_item_header(out, offset_bytes.len() as u32)
        .context(CodecSnafu { tag })?;
    out.write_all(&offset_bytes).context(IoSnafu)?;

    for fragment in fragments.fragments() {
        encoder
            .encode_item_header(out, fragment.len() as u32)
            .context(CodecSnafu { tag })?;
        out.write_all(fragment).context(IoSnafu)?;
    }

    encoder
        .encode_sequence_delimitation(out)
        .context(CodecSnafu { tag })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stateful::decode::read_dataset;
    use dicom_core::dictionary::StubDictionary;
    use dicom_core::header::DataElement;
    use dicom_core::value::PrimitiveValue;

    #[test]
    fn round_trips_flat_dataset() {
        let mut ds = InMemDataSet::new();
        ds.insert(DataElement::new_primitive(
            Tag(0x0010, 0x0010),
            VR::PN,
            PrimitiveValue::Strs(dicom_core::value::C::from_vec(vec!["DOE^JOHN".into()])),
        ));

        let mut out = Vec::new();
        write_dataset(&ds, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &mut out).unwrap();

        let back = read_dataset(&out, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &StubDictionary)
            .unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn round_trips_undefined_length_sequence() {
        let mut inner = InMemDataSet::new();
        inner.insert(DataElement::new_primitive(
            Tag(0x0010, 0x0020),
            VR::LO,
            PrimitiveValue::Strs(dicom_core::value::C::from_vec(vec!["ID1".into()])),
        ));

        let mut ds = InMemDataSet::new();
        ds.insert(DataElement::new(
            DataElementHeader::new(Tag(0x0008, 0x9215), VR::SQ, Length::UNDEFINED),
            Value::Sequence {
                items: vec![inner],
                length: Length::UNDEFINED,
            },
        ));

        let mut out = Vec::new();
        write_dataset(&ds, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &mut out).unwrap();
        let back = read_dataset(&out, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &StubDictionary)
            .unwrap();
        assert_eq!(back, ds);
    }
}
