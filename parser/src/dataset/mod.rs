//! A bidirectionally walkable flattening of a dataset tree (§4.2.1): every
//! element, sequence boundary, item boundary, and pixel fragment becomes one
//! [`DataSetToken`] in a single linear sequence, and a [`DataSetIterator`]
//! walks that sequence forwards and backwards.
//!
//! The tree is flattened eagerly rather than walked lazily with a live
//! recursive cursor. A live cursor has to reconstruct "where do I go if I
//! step backward out of this sequence" on every call, which is exactly the
//! class of bug that produces an off-by-one `previous` implementation. Once
//! the tree is a plain `Vec<DataSetToken>`, stepping is just `index ± 1`, so
//! `previous(next(p)) == p` and `next(previous(p)) == p` hold by
//! construction rather than by careful bookkeeping.

use dicom_core::dataset::InMemDataSet;
use dicom_core::header::{DataElementHeader, Header};
use dicom_core::length::Length;
use dicom_core::tag::Tag;
use dicom_core::value::{PrimitiveValue, Value};
use dicom_core::vr::VR;

/// One token in a flattened dataset walk.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSetToken {
    /// A primitive element's header.
    ElementHeader(DataElementHeader),
    /// A primitive element's value, immediately following its header.
    PrimitiveValue(PrimitiveValue),
    /// The start of a sequence (VR=SQ), carrying its tag and declared
    /// length.
    SequenceStart { tag: Tag, len: Length },
    /// The end of a sequence, paired with the preceding `SequenceStart`.
    SequenceEnd,
    /// The start of one sequence item, carrying its declared length.
    ItemStart { len: Length },
    /// The end of one sequence item, paired with the preceding `ItemStart`.
    ItemEnd,
    /// The start of an encapsulated pixel data value.
    PixelSequenceStart { tag: Tag },
    /// The encapsulated value's basic offset table (possibly empty, for the
    /// fragments-only regime).
    OffsetTable(Vec<u32>),
    /// One fragment item's bytes.
    ItemValue(Vec<u8>),
    /// The end of an encapsulated pixel data value.
    PixelSequenceEnd,
}

/// Flatten a dataset into its token sequence, in tag order, descending into
/// sequences depth-first.
pub fn flatten(dataset: &InMemDataSet) -> Vec<DataSetToken> {
    let mut tokens = Vec::new();
    flatten_into(dataset, &mut tokens);
    tokens
}

fn flatten_into(dataset: &InMemDataSet, tokens: &mut Vec<DataSetToken>) {
    for element in dataset.iter() {
        let tag = element.tag();
        match element.value() {
            Value::Primitive(value) => {
                tokens.push(DataSetToken::ElementHeader(*element.header()));
                tokens.push(DataSetToken::PrimitiveValue(value.clone()));
            }
            Value::Sequence { items, length } => {
                tokens.push(DataSetToken::SequenceStart { tag, len: *length });
                for item in items {
                    let item_len = item_declared_len(item);
                    tokens.push(DataSetToken::ItemStart { len: item_len });
                    flatten_into(item, tokens);
                    tokens.push(DataSetToken::ItemEnd);
                }
                tokens.push(DataSetToken::SequenceEnd);
            }
            Value::PixelSequence(fragments) => {
                tokens.push(DataSetToken::PixelSequenceStart { tag });
                tokens.push(DataSetToken::OffsetTable(fragments.offset_table().to_vec()));
                for fragment in fragments.fragments() {
                    tokens.push(DataSetToken::ItemValue(fragment.clone()));
                }
                tokens.push(DataSetToken::PixelSequenceEnd);
            }
        }
    }
}

/// An item dataset carries no length of its own (it is just an
/// `InMemDataSet`); items are always flattened as undefined-length, since
/// nothing upstream of the iterator needs the original wire-declared item
/// length once the tree is in memory.
fn item_declared_len(_item: &InMemDataSet) -> Length {
    Length::UNDEFINED
}

/// A cursor over a flattened token sequence that can walk both forwards and
/// backwards. `position()` identifies the index of the token `next()` would
/// return next; it ranges over `0..=len`.
#[derive(Debug, Clone)]
pub struct DataSetIterator<'a> {
    tokens: &'a [DataSetToken],
    pos: usize,
}

impl<'a> DataSetIterator<'a> {
    /// Build an iterator positioned at the start of `tokens`.
    pub fn new(tokens: &'a [DataSetToken]) -> Self {
        DataSetIterator { tokens, pos: 0 }
    }

    /// The index of the token `next()` would return.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute position (clamped to `0..=len`).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    /// Advance and return the token at the old position, or `None` at the
    /// end.
    pub fn next(&mut self) -> Option<&'a DataSetToken> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Step back and return the token at the new position, or `None` at the
    /// start.
    pub fn previous(&mut self) -> Option<&'a DataSetToken> {
        if self.pos == 0 {
            return None;
        }
        self.pos -= 1;
        self.tokens.get(self.pos)
    }
}

impl<'a> Iterator for DataSetIterator<'a> {
    type Item = &'a DataSetToken;

    fn next(&mut self) -> Option<Self::Item> {
        DataSetIterator::next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::header::DataElement;

    fn sample_tokens() -> Vec<DataSetToken> {
        let mut ds = InMemDataSet::new();
        ds.insert(DataElement::new_primitive(
            Tag(0x0010, 0x0010),
            VR::PN,
            PrimitiveValue::Strs(dicom_core::value::C::from_vec(vec!["A^B".into()])),
        ));
        let mut inner = InMemDataSet::new();
        inner.insert(DataElement::new_primitive(
            Tag(0x0010, 0x0020),
            VR::LO,
            PrimitiveValue::Strs(dicom_core::value::C::from_vec(vec!["ID".into()])),
        ));
        ds.insert(DataElement::new(
            DataElementHeader::new(Tag(0x0008, 0x9215), VR::SQ, Length::UNDEFINED),
            Value::Sequence {
                items: vec![inner],
                length: Length::UNDEFINED,
            },
        ));
        flatten(&ds)
    }

    #[test]
    fn previous_undoes_next_everywhere() {
        let tokens = sample_tokens();
        let mut it = DataSetIterator::new(&tokens);
        for _ in 0..tokens.len() {
            let before = it.position();
            it.next();
            let after_next = it.position();
            it.previous();
            assert_eq!(it.position(), before);
            it.seek(after_next);
        }
    }

    #[test]
    fn next_undoes_previous_everywhere() {
        let tokens = sample_tokens();
        let mut it = DataSetIterator::new(&tokens);
        it.seek(tokens.len());
        for _ in 0..tokens.len() {
            let before = it.position();
            it.previous();
            let after_prev = it.position();
            it.next();
            assert_eq!(it.position(), before);
            it.seek(after_prev);
        }
    }

    #[test]
    fn walks_full_sequence_forward() {
        let tokens = sample_tokens();
        let mut it = DataSetIterator::new(&tokens);
        let mut count = 0;
        while it.next().is_some() {
            count += 1;
        }
        assert_eq!(count, tokens.len());
    }
}
