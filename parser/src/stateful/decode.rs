//! The dataset deserialization algorithm (§4.2): an iterative depth-first
//! walk that decodes tag/VR/length headers through the codec layer,
//! recognizes the three structural tags (Item, ItemDelimitationItem,
//! SequenceDelimitationItem), and assembles a bidirectionally walkable
//! [`InMemDataSet`] tree.
//!
//! The walk keeps an explicit stack of scopes rather than recursing on the
//! call stack, so that adversarially deep sequence nesting cannot exhaust
//! it.

use std::io::{Cursor, Read};

use dicom_core::dataset::InMemDataSet;
use dicom_core::dictionary::DataDictionary;
use dicom_core::header::{DataElement, DataElementHeader, Header};
use dicom_core::length::Length;
use dicom_core::pixeldata::PixelFragmentSequence;
use dicom_core::tag::{self, Tag};
use dicom_core::value::{PrimitiveValue, Value};
use dicom_core::vr::VR;
use dicom_encoding::decode::{BasicDecoder, Decode, DecodeToken, Endianness, HeaderDecoder};
use dicom_encoding::primitive_value::decode_value;
use dicom_encoding::transfer_syntax::TransferSyntax;

use crate::error::{CodecSnafu, IoSnafu, Result, UnexpectedStructuralTagSnafu, UnterminatedSnafu};
use snafu::ResultExt;

/// One level of nesting while deserializing: either the body of a dataset
/// (the top level, or one sequence item) being assembled element by
/// element, or a sequence awaiting its items.
enum Scope {
    Item(ItemScope),
    Seq(SeqScope),
}

struct ItemScope {
    dataset: InMemDataSet,
    /// Absolute byte offset where this item's body ends, if it declared a
    /// finite length. `None` means undefined length: the body runs until an
    /// `ItemDelimitationItem` token is read (or is recovered, below, when
    /// the producer omitted it).
    end: Option<u64>,
    /// Whether this is the top-level dataset rather than a sequence item:
    /// no enclosing sequence to report back into, and no structural tags
    /// are legal directly within it.
    top_level: bool,
}

struct SeqScope {
    tag: Tag,
    /// The sequence's originally declared length, preserved verbatim on the
    /// resulting [`Value::Sequence`] even when undefined.
    declared_len: Length,
    /// Absolute byte offset where this sequence's body ends: either
    /// `header_end + declared_len`, or the position just past the matching
    /// `SequenceDelimitationItem` as found by [`find_enclosure_end`].
    end: u64,
    items: Vec<InMemDataSet>,
}

/// Deserialize a whole dataset from `bytes` under the given transfer syntax
/// and dictionary.
pub fn read_dataset<D: DataDictionary>(
    bytes: &[u8],
    ts: &TransferSyntax,
    dict: &D,
) -> Result<InMemDataSet> {
    let decoder = ts.decoder();
    let basic = ts.basic_decoder();
    let mut cursor = Cursor::new(bytes);

    let mut stack: Vec<Scope> = vec![Scope::Item(ItemScope {
        dataset: InMemDataSet::new(),
        end: Some(bytes.len() as u64),
        top_level: true,
    })];

    loop {
        let at_end = match stack.last() {
            Some(Scope::Item(item)) => item.end.map(|e| cursor.position() >= e).unwrap_or(false),
            Some(Scope::Seq(seq)) => cursor.position() >= seq.end,
            None => unreachable!("stack never empties before returning"),
        };

        if at_end {
            if matches!(stack.last(), Some(Scope::Seq(_))) {
                pop_sequence(&mut stack);
            } else {
                let finished = pop_item(&mut stack);
                if let Some(dataset) = push_completed_item(&mut stack, finished)? {
                    return Ok(dataset);
                }
            }
            continue;
        }

        if matches!(stack.last(), Some(Scope::Seq(_))) {
            step_sequence(&mut cursor, decoder, dict, &mut stack)?;
        } else {
            step_item(&mut cursor, decoder, basic, dict, &mut stack)?;
        }
    }
}

fn pop_item(stack: &mut Vec<Scope>) -> ItemScope {
    match stack.pop().expect("item scope present") {
        Scope::Item(item) => item,
        Scope::Seq(_) => unreachable!("top was checked to be an item scope"),
    }
}

fn pop_sequence(stack: &mut Vec<Scope>) {
    let seq = match stack.pop().expect("sequence scope present") {
        Scope::Seq(seq) => seq,
        Scope::Item(_) => unreachable!("top was checked to be a sequence scope"),
    };
    let parent = match stack.last_mut() {
        Some(Scope::Item(parent)) => parent,
        _ => unreachable!("a sequence's enclosing scope is always an item"),
    };
    let header = DataElementHeader::new(seq.tag, VR::SQ, seq.declared_len);
    parent.dataset.insert(DataElement::new(
        header,
        Value::Sequence {
            items: seq.items,
            length: seq.declared_len,
        },
    ));
}

/// Record a just-finished item's dataset into its enclosing sequence, or —
/// if the stack is now empty — return it as the finished top-level result.
fn push_completed_item(
    stack: &mut Vec<Scope>,
    finished: ItemScope,
) -> Result<Option<InMemDataSet>> {
    if finished.top_level {
        return Ok(Some(finished.dataset));
    }
    match stack.last_mut() {
        Some(Scope::Seq(seq)) => {
            seq.items.push(finished.dataset);
            Ok(None)
        }
        _ => unreachable!("a non-top-level item always nests in a sequence"),
    }
}

fn ensure_not_top_level(item: &ItemScope, offending: Tag) -> Result<()> {
    if item.top_level {
        return UnexpectedStructuralTagSnafu { tag: offending }.fail();
    }
    Ok(())
}

fn synthesize_item_delimiter(dataset: &mut InMemDataSet) {
    let header = DataElementHeader::new(tag::ITEM_DELIMITATION, VR::NI, 0u32);
    dataset.insert(DataElement::new(header, Value::Primitive(PrimitiveValue::Empty)));
}

fn item_end(body_start: u64, len: Length) -> Option<u64> {
    len.get().map(|n| body_start + n as u64)
}

fn step_item(
    cursor: &mut Cursor<&[u8]>,
    decoder: HeaderDecoder,
    basic: BasicDecoder,
    dict: &dyn DataDictionary,
    stack: &mut Vec<Scope>,
) -> Result<()> {
    let token = decoder
        .decode_header(cursor, dict)
        .context(CodecSnafu { tag: Tag(0, 0) })?;

    match token {
        DecodeToken::ElementHeader(header) => {
            handle_element(cursor, header, decoder, basic, dict, stack)
        }
        DecodeToken::ItemDelimitation => {
            let finished = pop_item(stack);
            ensure_not_top_level(&finished, tag::ITEM_DELIMITATION)?;
            push_completed_item(stack, finished)?;
            Ok(())
        }
        DecodeToken::ItemHeader(len) => {
            // Recovery: the previous item was missing its
            // ItemDelimitationItem. Close it implicitly and start the new
            // sibling using the header already decoded.
            let mut finished = pop_item(stack);
            ensure_not_top_level(&finished, tag::ITEM)?;
            synthesize_item_delimiter(&mut finished.dataset);
            push_completed_item(stack, finished)?;
            stack.push(Scope::Item(ItemScope {
                dataset: InMemDataSet::new(),
                end: item_end(cursor.position(), len),
                top_level: false,
            }));
            Ok(())
        }
        DecodeToken::SequenceDelimitation => {
            // The enclosing sequence is ending without a prior
            // ItemDelimitationItem on its last item; normalize the same way
            // before letting the sequence itself close.
            let mut finished = pop_item(stack);
            ensure_not_top_level(&finished, tag::SEQUENCE_DELIMITATION)?;
            synthesize_item_delimiter(&mut finished.dataset);
            push_completed_item(stack, finished)?;
            pop_sequence(stack);
            Ok(())
        }
    }
}

fn step_sequence(
    cursor: &mut Cursor<&[u8]>,
    decoder: HeaderDecoder,
    dict: &dyn DataDictionary,
    stack: &mut Vec<Scope>,
) -> Result<()> {
    let token = decoder
        .decode_header(cursor, dict)
        .context(CodecSnafu { tag: Tag(0, 0) })?;

    match token {
        DecodeToken::ItemHeader(len) => {
            let body_start = cursor.position();
            stack.push(Scope::Item(ItemScope {
                dataset: InMemDataSet::new(),
                end: item_end(body_start, len),
                top_level: false,
            }));
            Ok(())
        }
        DecodeToken::SequenceDelimitation => {
            // The body is now exhausted; the enclosing loop's `pos >= end`
            // check pops this scope on the next iteration.
            Ok(())
        }
        DecodeToken::ElementHeader(h) => UnexpectedStructuralTagSnafu { tag: h.tag() }.fail(),
        DecodeToken::ItemDelimitation => {
            UnexpectedStructuralTagSnafu { tag: tag::ITEM_DELIMITATION }.fail()
        }
    }
}

fn handle_element(
    cursor: &mut Cursor<&[u8]>,
    header: DataElementHeader,
    decoder: HeaderDecoder,
    basic: BasicDecoder,
    dict: &dyn DataDictionary,
    stack: &mut Vec<Scope>,
) -> Result<()> {
    if header.vr() == VR::SQ {
        let body_start = cursor.position();
        let end = if header.len().is_undefined() {
            let end = find_enclosure_end(cursor, decoder, dict, header.tag())?;
            cursor.set_position(body_start);
            end
        } else {
            body_start + header.len().get().expect("checked defined") as u64
        };
        stack.push(Scope::Seq(SeqScope {
            tag: header.tag(),
            declared_len: header.len(),
            end,
            items: Vec::new(),
        }));
        return Ok(());
    }

    if header.vr() == VR::OB && header.len().is_undefined() {
        let fragments = decode_encapsulated(cursor, decoder, dict, header.tag())?;
        let item = current_item(stack);
        item.dataset
            .insert(DataElement::new(header, Value::PixelSequence(fragments)));
        return Ok(());
    }

    let len = header
        .len()
        .get()
        .expect("a non-SQ, non-encapsulated-OB element always has a defined length");
    let mut buf = vec![0u8; len as usize];
    cursor.read_exact(&mut buf).context(IoSnafu)?;
    let value = decode_value(header.tag(), header.vr(), &buf, basic)
        .context(CodecSnafu { tag: header.tag() })?;

    let item = current_item(stack);
    item.dataset
        .insert(DataElement::new(header, Value::Primitive(value)));
    Ok(())
}

fn current_item(stack: &mut [Scope]) -> &mut ItemScope {
    match stack.last_mut() {
        Some(Scope::Item(item)) => item,
        _ => unreachable!("an element's enclosing scope is always an item"),
    }
}

/// Compute the byte offset just past the delimiter that closes an
/// undefined-length region (a sequence or encapsulated pixel data value)
/// starting at the cursor's current position ("enclosure finder"). Tracks
/// nesting with a plain counter instead of a shadow stack of entered
/// sequences: every push and pop is symmetric (one token each), so a single
/// depth count carries the same information a stack of tags would, using
/// O(1) memory instead of O(nesting depth).
fn find_enclosure_end(
    cursor: &mut Cursor<&[u8]>,
    decoder: HeaderDecoder,
    dict: &dyn DataDictionary,
    opening_tag: Tag,
) -> Result<u64> {
    let mut depth: u32 = 1;
    loop {
        if cursor.position() >= cursor.get_ref().len() as u64 {
            return UnterminatedSnafu { tag: opening_tag }.fail();
        }
        let token = decoder
            .decode_header(cursor, dict)
            .context(CodecSnafu { tag: opening_tag })?;
        match token {
            DecodeToken::ElementHeader(h) => {
                if h.len().is_undefined() {
                    depth += 1;
                } else {
                    let skip = h.len().get().expect("checked defined") as u64;
                    cursor.set_position(cursor.position() + skip);
                }
            }
            DecodeToken::ItemHeader(len) => {
                if len.is_undefined() {
                    depth += 1;
                } else {
                    let skip = len.get().expect("checked defined") as u64;
                    cursor.set_position(cursor.position() + skip);
                }
            }
            DecodeToken::ItemDelimitation | DecodeToken::SequenceDelimitation => {
                depth -= 1;
                if depth == 0 {
                    return Ok(cursor.position());
                }
            }
        }
    }
}

/// Read an encapsulated (undefined-length) OB pixel data value: a basic
/// offset table item followed by one item per fragment, closed by a
/// `SequenceDelimitationItem`. Per the encapsulated pixel data encoding
/// rule, items here are always little-endian regardless of the negotiated
/// transfer syntax, since Item/ItemDelimitationItem carry no VR.
fn decode_encapsulated(
    cursor: &mut Cursor<&[u8]>,
    decoder: HeaderDecoder,
    dict: &dyn DataDictionary,
    pixel_data_tag: Tag,
) -> Result<PixelFragmentSequence> {
    let basic = BasicDecoder(Endianness::Little);

    let first = decoder
        .decode_header(cursor, dict)
        .context(CodecSnafu { tag: pixel_data_tag })?;
    let offset_table = match first {
        DecodeToken::ItemHeader(len) => {
            let len = len.get().unwrap_or(0) as usize;
            let mut buf = vec![0u8; len];
            cursor.read_exact(&mut buf).context(IoSnafu)?;
            buf.chunks_exact(4)
                .map(|c| basic.decode_ul(c))
                .collect::<std::io::Result<Vec<u32>>>()
                .context(IoSnafu)?
        }
        _ => {
            return UnexpectedStructuralTagSnafu {
                tag: pixel_data_tag,
            }
            .fail()
        }
    };

    let mut fragments = Vec::new();
    loop {
        if cursor.position() >= cursor.get_ref().len() as u64 {
            return UnterminatedSnafu {
                tag: pixel_data_tag,
            }
            .fail();
        }
        let token = decoder
            .decode_header(cursor, dict)
            .context(CodecSnafu { tag: pixel_data_tag })?;
        match token {
            DecodeToken::ItemHeader(len) => {
                let len = len
                    .get()
                    .expect("a pixel data fragment item always has a defined length");
                let mut buf = vec![0u8; len as usize];
                cursor.read_exact(&mut buf).context(IoSnafu)?;
                fragments.push(buf);
            }
            DecodeToken::SequenceDelimitation => break,
            _ => {
                return UnexpectedStructuralTagSnafu {
                    tag: pixel_data_tag,
                }
                .fail()
            }
        }
    }

    Ok(if offset_table.is_empty() {
        PixelFragmentSequence::fragments_only(fragments)
    } else {
        PixelFragmentSequence::with_offset_table(offset_table, fragments)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::dictionary::StubDictionary;
    use dicom_core::vr::VR;

    fn push_explicit_element(out: &mut Vec<u8>, tag: Tag, vr: VR, value: &[u8]) {
        out.extend_from_slice(&tag.group().to_le_bytes());
        out.extend_from_slice(&tag.element().to_le_bytes());
        out.extend_from_slice(vr.as_str().as_bytes());
        if vr.is_special() {
            out.extend_from_slice(&[0, 0]);
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        } else {
            out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(value);
    }

    #[test]
    fn reads_flat_explicit_le_dataset() {
        let mut bytes = Vec::new();
        push_explicit_element(&mut bytes, Tag(0x0010, 0x0010), VR::PN, b"DOE^JOHN");
        push_explicit_element(&mut bytes, Tag(0x0010, 0x0020), VR::LO, b"12345678");

        let ds = read_dataset(&bytes, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &StubDictionary)
            .expect("valid dataset");
        assert_eq!(ds.len(), 2);
        assert!(ds.get(Tag(0x0010, 0x0010)).is_some());
    }

    #[test]
    fn reads_undefined_length_sequence_with_one_item() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0008u16.to_le_bytes());
        bytes.extend_from_slice(&0x9215u16.to_le_bytes());
        bytes.extend_from_slice(b"SQ");
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&Length::UNDEFINED.0.to_le_bytes());

        let mut item_body = Vec::new();
        push_explicit_element(&mut item_body, Tag(0x0010, 0x0010), VR::PN, b"A^B");

        bytes.extend_from_slice(&tag::ITEM.group().to_le_bytes());
        bytes.extend_from_slice(&tag::ITEM.element().to_le_bytes());
        bytes.extend_from_slice(&(item_body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&item_body);

        bytes.extend_from_slice(&tag::SEQUENCE_DELIMITATION.group().to_le_bytes());
        bytes.extend_from_slice(&tag::SEQUENCE_DELIMITATION.element().to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let ds = read_dataset(&bytes, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &StubDictionary)
            .expect("valid dataset");
        let element = ds.get(Tag(0x0008, 0x9215)).expect("sequence present");
        match element.value() {
            Value::Sequence { items, length } => {
                assert!(length.is_undefined());
                assert_eq!(items.len(), 1);
                assert!(items[0].get(Tag(0x0010, 0x0010)).is_some());
            }
            _ => panic!("expected a sequence value"),
        }
    }

    #[test]
    fn recovers_missing_item_delimitation() {
        // A sequence item of undefined length whose ItemDelimitationItem
        // was omitted; the next token is instead the sibling item's header.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0008u16.to_le_bytes());
        bytes.extend_from_slice(&0x9215u16.to_le_bytes());
        bytes.extend_from_slice(b"SQ");
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&Length::UNDEFINED.0.to_le_bytes());

        bytes.extend_from_slice(&tag::ITEM.group().to_le_bytes());
        bytes.extend_from_slice(&tag::ITEM.element().to_le_bytes());
        bytes.extend_from_slice(&Length::UNDEFINED.0.to_le_bytes());
        let mut item1 = Vec::new();
        push_explicit_element(&mut item1, Tag(0x0010, 0x0010), VR::PN, b"A^B");
        bytes.extend_from_slice(&item1);
        // Missing ItemDelimitationItem: straight into item 2's header.
        bytes.extend_from_slice(&tag::ITEM.group().to_le_bytes());
        bytes.extend_from_slice(&tag::ITEM.element().to_le_bytes());
        let mut item2 = Vec::new();
        push_explicit_element(&mut item2, Tag(0x0010, 0x0020), VR::LO, b"ID");
        bytes.extend_from_slice(&(item2.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&item2);
        bytes.extend_from_slice(&tag::ITEM_DELIMITATION.group().to_le_bytes());
        bytes.extend_from_slice(&tag::ITEM_DELIMITATION.element().to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&tag::SEQUENCE_DELIMITATION.group().to_le_bytes());
        bytes.extend_from_slice(&tag::SEQUENCE_DELIMITATION.element().to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let ds = read_dataset(&bytes, &TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, &StubDictionary)
            .expect("recovered dataset");
        match ds.get(Tag(0x0008, 0x9215)).unwrap().value() {
            Value::Sequence { items, .. } => {
                assert_eq!(items.len(), 2);
                assert!(items[0].get(tag::ITEM_DELIMITATION).is_some());
            }
            _ => panic!("expected a sequence value"),
        }
    }
}
