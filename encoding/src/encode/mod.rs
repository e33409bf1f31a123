//! Encoding of data element headers and structural tokens — the write-side
//! mirror of [`decode`](crate::decode).

pub mod basic;
pub mod explicit_be;
pub mod explicit_le;
pub mod implicit_le;

pub use basic::BasicEncoder;

use std::io::Write;

use dicom_core::header::Header;
use dicom_core::length::Length;
use dicom_core::tag::{self, Tag};
use dicom_core::vr::VR;

use crate::error::{Result, WriteIoSnafu};
use snafu::ResultExt;

/// Encodes data element headers to a byte stream under one transfer syntax
/// profile.
pub trait Encode {
    /// Write a regular element header (tag, VR if applicable, length).
    fn encode_header<W: Write>(&self, to: &mut W, header: &dyn Header, vr: VR) -> Result<()>;

    /// Write an `Item` marker with the given declared length.
    fn encode_item_header<W: Write>(&self, to: &mut W, len: u32) -> Result<()>;

    /// Write an `ItemDelimitationItem` marker.
    fn encode_item_delimitation<W: Write>(&self, to: &mut W) -> Result<()>;

    /// Write a `SequenceDelimitationItem` marker.
    fn encode_sequence_delimitation<W: Write>(&self, to: &mut W) -> Result<()>;

    /// The basic (tag/numeric) encoder backing this profile.
    fn basic(&self) -> BasicEncoder;
}

/// Shared item/sequence delimiter encoding, identical across every profile:
/// these structural tags never carry a VR field, only a 4-byte length (the
/// delimiters always declare zero).
fn encode_marker<W: Write>(to: &mut W, basic: BasicEncoder, tag: Tag, len: u32) -> Result<()> {
    basic.encode_tag(&mut *to, tag)?;
    basic.encode_ul(&mut *to, len).context(WriteIoSnafu)
}

pub(crate) fn item_header(basic: BasicEncoder, to: &mut impl Write, len: u32) -> Result<()> {
    encode_marker(to, basic, tag::ITEM, len)
}

pub(crate) fn item_delimitation(basic: BasicEncoder, to: &mut impl Write) -> Result<()> {
    encode_marker(to, basic, tag::ITEM_DELIMITATION, 0)
}

pub(crate) fn sequence_delimitation(basic: BasicEncoder, to: &mut impl Write) -> Result<()> {
    encode_marker(to, basic, tag::SEQUENCE_DELIMITATION, 0)
}

/// Whether a declared length is the undefined-length sentinel.
pub(crate) fn is_undefined(len: Length) -> bool {
    len.is_undefined()
}

/// A statically-dispatched encoder covering all three header-framing
/// profiles, the write-side mirror of
/// [`HeaderDecoder`](crate::decode::HeaderDecoder).
#[derive(Debug, Clone, Copy)]
pub enum HeaderEncoder {
    /// Implicit VR Little Endian.
    ImplicitLe(implicit_le::ImplicitLeEncoder),
    /// Explicit VR Little Endian.
    ExplicitLe(explicit_le::ExplicitLeEncoder),
    /// Explicit VR Big Endian.
    ExplicitBe(explicit_be::ExplicitBeEncoder),
}

impl Encode for HeaderEncoder {
    fn encode_header<W: Write>(&self, to: &mut W, header: &dyn Header, vr: VR) -> Result<()> {
        match self {
            HeaderEncoder::ImplicitLe(e) => e.encode_header(to, header, vr),
            HeaderEncoder::ExplicitLe(e) => e.encode_header(to, header, vr),
            HeaderEncoder::ExplicitBe(e) => e.encode_header(to, header, vr),
        }
    }

    fn encode_item_header<W: Write>(&self, to: &mut W, len: u32) -> Result<()> {
        match self {
            HeaderEncoder::ImplicitLe(e) => e.encode_item_header(to, len),
            HeaderEncoder::ExplicitLe(e) => e.encode_item_header(to, len),
            HeaderEncoder::ExplicitBe(e) => e.encode_item_header(to, len),
        }
    }

    fn encode_item_delimitation<W: Write>(&self, to: &mut W) -> Result<()> {
        match self {
            HeaderEncoder::ImplicitLe(e) => e.encode_item_delimitation(to),
            HeaderEncoder::ExplicitLe(e) => e.encode_item_delimitation(to),
            HeaderEncoder::ExplicitBe(e) => e.encode_item_delimitation(to),
        }
    }

    fn encode_sequence_delimitation<W: Write>(&self, to: &mut W) -> Result<()> {
        match self {
            HeaderEncoder::ImplicitLe(e) => e.encode_sequence_delimitation(to),
            HeaderEncoder::ExplicitLe(e) => e.encode_sequence_delimitation(to),
            HeaderEncoder::ExplicitBe(e) => e.encode_sequence_delimitation(to),
        }
    }

    fn basic(&self) -> BasicEncoder {
        match self {
            HeaderEncoder::ImplicitLe(e) => e.basic(),
            HeaderEncoder::ExplicitLe(e) => e.basic(),
            HeaderEncoder::ExplicitBe(e) => e.basic(),
        }
    }
}
