//! The DICOM data element header and the owning element type built on top
//! of it.

use crate::length::Length;
use crate::tag::{self, Tag};
use crate::value::Value;
use crate::vr::VR;

/// A trait for a data type that carries a DICOM element header: its tag and
/// declared value length.
#[allow(clippy::len_without_is_empty)]
pub trait Header {
    /// The element's tag.
    fn tag(&self) -> Tag;

    /// The element's declared value length. May be
    /// [`Length::UNDEFINED`] for sequences and encapsulated pixel data.
    fn len(&self) -> Length;

    /// Whether this is an `Item` marker.
    fn is_item(&self) -> bool {
        self.tag() == tag::ITEM
    }

    /// Whether this is an `ItemDelimitationItem` marker.
    fn is_item_delimiter(&self) -> bool {
        self.tag() == tag::ITEM_DELIMITATION
    }

    /// Whether this is a `SequenceDelimitationItem` marker.
    fn is_sequence_delimiter(&self) -> bool {
        self.tag() == tag::SEQUENCE_DELIMITATION
    }
}

/// The header of a data element: its tag, VR, and declared length.
///
/// The VR is optional at the type level only in the sense that implicit-VR
/// decoding resolves it via the dictionary before a header is ever built;
/// by the time one exists, the VR is always known.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DataElementHeader {
    tag: Tag,
    vr: VR,
    len: Length,
}

impl DataElementHeader {
    /// Build a new data element header.
    pub fn new(tag: Tag, vr: VR, len: impl Into<Length>) -> Self {
        DataElementHeader {
            tag,
            vr,
            len: len.into(),
        }
    }

    /// The element's value representation.
    pub fn vr(&self) -> VR {
        self.vr
    }
}

impl Header for DataElementHeader {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn len(&self) -> Length {
        self.len
    }
}

/// A data type that represents and owns a DICOM data element: a header plus
/// its value. `I` is the type used for nested sequence items.
#[derive(Debug, PartialEq, Clone)]
pub struct DataElement<I> {
    header: DataElementHeader,
    value: Value<I>,
}

impl<I> DataElement<I> {
    /// Build a new data element from its header and value.
    pub fn new(header: DataElementHeader, value: Value<I>) -> Self {
        DataElement { header, value }
    }

    /// Build a primitive-valued data element.
    pub fn new_primitive(tag: Tag, vr: VR, value: impl Into<crate::value::PrimitiveValue>) -> Self
    where
        Value<I>: From<crate::value::PrimitiveValue>,
    {
        let value = value.into();
        let len = primitive_encoded_len(&value, vr);
        DataElement {
            header: DataElementHeader::new(tag, vr, len),
            value: Value::Primitive(value),
        }
    }

    /// The element's header.
    pub fn header(&self) -> &DataElementHeader {
        &self.header
    }

    /// The element's value.
    pub fn value(&self) -> &Value<I> {
        &self.value
    }

    /// The element's value representation.
    pub fn vr(&self) -> VR {
        self.header.vr
    }

    /// Replace the element's declared length (used by the serializer to
    /// rewrite sequence/item lengths bottom-up).
    pub fn set_len(&mut self, len: Length) {
        self.header.len = len;
    }
}

impl<I> Header for DataElement<I> {
    fn tag(&self) -> Tag {
        self.header.tag()
    }

    fn len(&self) -> Length {
        self.header.len()
    }
}

impl<'a, I> Header for &'a DataElement<I> {
    fn tag(&self) -> Tag {
        (**self).tag()
    }

    fn len(&self) -> Length {
        (**self).len()
    }
}

/// Compute the raw (pre-padding) byte length of a primitive value's encoded
/// payload. The caller is responsible for rounding up to an even length;
/// this is a best-effort estimate used as the initial declared length for
/// freshly built elements, and is always recomputed by the serializer.
fn primitive_encoded_len(value: &crate::value::PrimitiveValue, _vr: VR) -> u32 {
    use crate::value::PrimitiveValue::*;
    let raw = match value {
        Empty => 0,
        Strs(c) => c.iter().map(|s| s.len() + 1).sum::<usize>().saturating_sub(1),
        Str(s) => s.len(),
        Tags(c) => c.len() * 4,
        U8(c) => c.len(),
        I16(c) => c.len() * 2,
        U16(c) => c.len() * 2,
        I32(c) => c.len() * 4,
        U32(c) => c.len() * 4,
        F32(c) => c.len() * 4,
        F64(c) => c.len() * 8,
    };
    (raw + (raw % 2)) as u32
}
