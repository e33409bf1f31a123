//! The value held by a data element: primitive, nested sequence, or
//! encapsulated pixel fragments.

mod primitive;

pub use primitive::{PrimitiveValue, ValueType, C};

use crate::length::Length;
use crate::pixeldata::PixelFragmentSequence;

/// The value of a data element.
///
/// `I` is the concrete item/dataset type used to hold the contents of a
/// sequence (VR=SQ); it is generic so that decoders can build a tree of
/// their own dataset representation without this crate dictating one.
#[derive(Debug, PartialEq, Clone)]
pub enum Value<I> {
    /// A primitive, non-nested value.
    Primitive(PrimitiveValue),
    /// A sequence of item datasets (VR=SQ).
    Sequence {
        /// The items contained in the sequence, in encounter order.
        items: Vec<I>,
        /// The sequence's declared length, `Length::UNDEFINED` if delimited.
        length: Length,
    },
    /// An encapsulated pixel data value (VR=OB, undefined length).
    PixelSequence(PixelFragmentSequence),
}

impl<I> Value<I> {
    /// Build a primitive value.
    pub fn new_primitive(value: impl Into<PrimitiveValue>) -> Self {
        Value::Primitive(value.into())
    }

    /// Borrow this value as a primitive value, if it is one.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the items of a sequence value, if it is one.
    pub fn items(&self) -> Option<&[I]> {
        match self {
            Value::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Borrow the encapsulated pixel fragments, if this is one.
    pub fn fragments(&self) -> Option<&PixelFragmentSequence> {
        match self {
            Value::PixelSequence(f) => Some(f),
            _ => None,
        }
    }
}

/// A trait implemented by anything that can report the kind of DICOM value
/// it holds, used for building informative error messages without requiring
/// the caller to know the concrete item type.
pub trait DicomValueType {
    /// The primitive value type discriminant, if this is a primitive value.
    fn value_type(&self) -> ValueType;
    /// Whether this value is a sequence (VR=SQ).
    fn is_sequence(&self) -> bool;
}

impl<I> From<PrimitiveValue> for Value<I> {
    fn from(value: PrimitiveValue) -> Self {
        Value::Primitive(value)
    }
}

impl<I> DicomValueType for Value<I> {
    fn value_type(&self) -> ValueType {
        match self {
            Value::Primitive(p) => p.value_type(),
            Value::Sequence { .. } => ValueType::Empty,
            Value::PixelSequence(_) => ValueType::U8,
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence { .. })
    }
}
