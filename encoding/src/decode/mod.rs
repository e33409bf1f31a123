//! Decoding of data element headers and the structural tokens that bound
//! sequence items (§4.1).

pub mod basic;
pub mod explicit_be;
pub mod explicit_le;
pub mod implicit_le;

pub use basic::{BasicDecoder, Endianness};

use std::io::Read;

use dicom_core::dictionary::DataDictionary;
use dicom_core::header::DataElementHeader;
use dicom_core::length::Length;
use dicom_core::tag::{self, Tag};
use dicom_core::vr::VR;

use crate::error::{MalformedStreamSnafu, Result};
use snafu::ensure;

/// One token read off a dataset byte stream: either a regular element
/// header, or one of the two structural markers that bound sequence items
/// and undefined-length sequences/pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeToken {
    /// A regular data element header.
    ElementHeader(DataElementHeader),
    /// An `Item` marker, carrying the item's declared length (possibly
    /// undefined, for items within an undefined-length pixel data sequence).
    ItemHeader(Length),
    /// An `ItemDelimitationItem` marker, closing an undefined-length item.
    ItemDelimitation,
    /// A `SequenceDelimitationItem` marker, closing an undefined-length
    /// sequence or encapsulated pixel data value.
    SequenceDelimitation,
}

/// Decodes data element headers from a byte stream under one transfer
/// syntax profile (implicit-LE, explicit-LE, or explicit-BE).
pub trait Decode {
    /// Read the next token: either a full element header or a structural
    /// delimiter. `dict` is only consulted by the implicit-VR profile.
    fn decode_header<S: Read>(
        &self,
        source: &mut S,
        dict: &dyn DataDictionary,
    ) -> Result<DecodeToken>;

    /// The basic (tag/numeric) decoder backing this profile.
    fn basic(&self) -> BasicDecoder;
}

/// Shared tag-then-length-or-VR decode skeleton used by every profile: reads
/// the tag, recognizes the three structural tags uniformly (they carry no VR
/// field on the wire, in either implicit or explicit encoding), and defers to
/// `resolve` for the VR/length of a regular element.
fn decode_after_tag<S: Read>(
    tag: Tag,
    source: &mut S,
    basic: BasicDecoder,
    resolve: impl FnOnce(&mut S, BasicDecoder) -> Result<(VR, Length)>,
) -> Result<DecodeToken> {
    use crate::error::IoSnafu;
    use snafu::ResultExt;

    if tag == tag::ITEM {
        let len = basic.decode_ul(&mut *source).context(IoSnafu { tag })?;
        return Ok(DecodeToken::ItemHeader(Length(len)));
    }
    if tag == tag::ITEM_DELIMITATION {
        let _reserved = basic.decode_ul(&mut *source).context(IoSnafu { tag })?;
        return Ok(DecodeToken::ItemDelimitation);
    }
    if tag == tag::SEQUENCE_DELIMITATION {
        let _reserved = basic.decode_ul(&mut *source).context(IoSnafu { tag })?;
        return Ok(DecodeToken::SequenceDelimitation);
    }

    let (vr, len) = resolve(source, basic)?;
    Ok(DecodeToken::ElementHeader(DataElementHeader::new(
        tag, vr, len,
    )))
}

/// A statically-dispatched decoder covering all three header-framing
/// profiles, selected once per negotiated transfer syntax and then reused
/// for the rest of the association. An enum rather than a trait object: the
/// profiles are a closed, small set, and this keeps `decode_header` generic
/// over any `Read` without losing dyn-compatibility concerns.
#[derive(Debug, Clone, Copy)]
pub enum HeaderDecoder {
    /// Implicit VR Little Endian.
    ImplicitLe(implicit_le::ImplicitLeDecoder),
    /// Explicit VR Little Endian.
    ExplicitLe(explicit_le::ExplicitLeDecoder),
    /// Explicit VR Big Endian.
    ExplicitBe(explicit_be::ExplicitBeDecoder),
}

impl Decode for HeaderDecoder {
    fn decode_header<S: Read>(
        &self,
        source: &mut S,
        dict: &dyn DataDictionary,
    ) -> Result<DecodeToken> {
        match self {
            HeaderDecoder::ImplicitLe(d) => d.decode_header(source, dict),
            HeaderDecoder::ExplicitLe(d) => d.decode_header(source, dict),
            HeaderDecoder::ExplicitBe(d) => d.decode_header(source, dict),
        }
    }

    fn basic(&self) -> BasicDecoder {
        match self {
            HeaderDecoder::ImplicitLe(d) => d.basic(),
            HeaderDecoder::ExplicitLe(d) => d.basic(),
            HeaderDecoder::ExplicitBe(d) => d.basic(),
        }
    }
}

/// Check a declared length against the bytes actually remaining, per §4.1's
/// `MalformedStream` rule. `remaining` is `None` when the source has no
/// known bound (e.g. a live socket mid-association), in which case the
/// check is skipped.
pub fn check_declared_len(declared: Length, remaining: Option<usize>) -> Result<()> {
    if let (Some(n), Some(declared)) = (remaining, declared.get()) {
        ensure!(
            declared as usize <= n,
            MalformedStreamSnafu {
                declared,
                remaining: n,
            }
        );
    }
    Ok(())
}
