//! The four transfer syntax profiles this node understands (§4.2, §6): the
//! three VR-determination-and-endianness models (implicit-LE, explicit-LE,
//! explicit-BE) plus the encapsulated-pixel-data variant layered on top of
//! implicit or explicit LE.
//!
//! Transfer syntax *registration* (UID to profile mapping) lives in the
//! external `dicom-transfer-syntax-registry` collaborator; this module only
//! defines the profile behavior itself.

use dicom_core::tag::Tag;
use dicom_core::vr::VR;

use crate::decode::explicit_be::ExplicitBeDecoder;
use crate::decode::explicit_le::ExplicitLeDecoder;
use crate::decode::implicit_le::ImplicitLeDecoder;
use crate::decode::{BasicDecoder, Endianness, HeaderDecoder};
use crate::encode::explicit_be::ExplicitBeEncoder;
use crate::encode::explicit_le::ExplicitLeEncoder;
use crate::encode::implicit_le::ImplicitLeEncoder;
use crate::encode::{BasicEncoder, HeaderEncoder};

/// Whether pixel data is carried as a single opaque payload or fragmented
/// into encapsulated items with a basic offset table (§4.2 "Encapsulated
/// pixel data").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDataEncoding {
    /// Native, single-fragment pixel data (the VR's length field is used
    /// as normal).
    Native,
    /// Encapsulated (possibly compressed) pixel data: undefined length,
    /// followed by an offset table item and one item per fragment.
    Encapsulated,
}

/// The VR/endianness model a transfer syntax uses for its data elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrModel {
    /// VRs are resolved from the dictionary; every header uses a 4-byte
    /// length field.
    Implicit,
    /// VRs are read directly off the wire; length field width depends on
    /// [`VR::is_special`].
    Explicit,
}

/// A transfer syntax profile: the combination of VR model, endianness, and
/// pixel data framing that together determine how to decode and encode a
/// dataset (§4.2's profile table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSyntax {
    /// The transfer syntax UID, e.g. `1.2.840.10008.1.2.1`.
    pub uid: &'static str,
    /// A human-readable name, for logging.
    pub name: &'static str,
    vr_model: VrModel,
    endianness: Endianness,
    pixel_data: PixelDataEncoding,
}

impl TransferSyntax {
    /// Implicit VR Little Endian (`1.2.840.10008.1.2`), the default profile
    /// assumed before explicit negotiation.
    pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2",
        name: "Implicit VR Little Endian",
        vr_model: VrModel::Implicit,
        endianness: Endianness::Little,
        pixel_data: PixelDataEncoding::Native,
    };

    /// Explicit VR Little Endian (`1.2.840.10008.1.2.1`).
    pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.1",
        name: "Explicit VR Little Endian",
        vr_model: VrModel::Explicit,
        endianness: Endianness::Little,
        pixel_data: PixelDataEncoding::Native,
    };

    /// Explicit VR Big Endian (`1.2.840.10008.1.2.2`), retired but still
    /// negotiable.
    pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.2",
        name: "Explicit VR Big Endian",
        vr_model: VrModel::Explicit,
        endianness: Endianness::Big,
        pixel_data: PixelDataEncoding::Native,
    };

    /// JPEG Baseline (`1.2.840.10008.1.2.4.50`): explicit VR little endian
    /// framing with encapsulated pixel data; the compressed codestream
    /// itself is passed through opaquely (§1: non-goal).
    pub const JPEG_BASELINE: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.4.50",
        name: "JPEG Baseline",
        vr_model: VrModel::Explicit,
        endianness: Endianness::Little,
        pixel_data: PixelDataEncoding::Encapsulated,
    };

    /// JPEG Lossless, Non-Hierarchical (Process 14) (`1.2.840.10008.1.2.4.57`):
    /// explicit VR little endian framing with encapsulated pixel data.
    pub const JPEG_LOSSLESS_NON_HIERARCHICAL: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.4.57",
        name: "JPEG Lossless, Non-Hierarchical",
        vr_model: VrModel::Explicit,
        endianness: Endianness::Little,
        pixel_data: PixelDataEncoding::Encapsulated,
    };

    /// JPEG Lossless, Non-Hierarchical, First-Order Prediction (Process 14,
    /// Selection Value 1) (`1.2.840.10008.1.2.4.70`): explicit VR little
    /// endian framing with encapsulated pixel data.
    pub const JPEG_LOSSLESS_FIRST_ORDER: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.4.70",
        name: "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
        vr_model: VrModel::Explicit,
        endianness: Endianness::Little,
        pixel_data: PixelDataEncoding::Encapsulated,
    };

    /// Whether this transfer syntax's pixel data is encapsulated.
    pub fn is_encapsulated(&self) -> bool {
        self.pixel_data == PixelDataEncoding::Encapsulated
    }

    /// This transfer syntax's byte order.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Build the header decoder for this transfer syntax.
    pub fn decoder(&self) -> HeaderDecoder {
        match (self.vr_model, self.endianness) {
            (VrModel::Implicit, _) => HeaderDecoder::ImplicitLe(ImplicitLeDecoder),
            (VrModel::Explicit, Endianness::Little) => HeaderDecoder::ExplicitLe(ExplicitLeDecoder),
            (VrModel::Explicit, Endianness::Big) => HeaderDecoder::ExplicitBe(ExplicitBeDecoder),
        }
    }

    /// Build the header encoder for this transfer syntax.
    pub fn encoder(&self) -> HeaderEncoder {
        match (self.vr_model, self.endianness) {
            (VrModel::Implicit, _) => HeaderEncoder::ImplicitLe(ImplicitLeEncoder),
            (VrModel::Explicit, Endianness::Little) => HeaderEncoder::ExplicitLe(ExplicitLeEncoder),
            (VrModel::Explicit, Endianness::Big) => HeaderEncoder::ExplicitBe(ExplicitBeEncoder),
        }
    }

    /// The basic numeric decoder for this transfer syntax's endianness.
    pub fn basic_decoder(&self) -> BasicDecoder {
        BasicDecoder(self.endianness)
    }

    /// The basic numeric encoder for this transfer syntax's endianness.
    pub fn basic_encoder(&self) -> BasicEncoder {
        BasicEncoder(self.endianness)
    }
}

/// Resolve the VR an element should be treated as for header-framing
/// purposes, consulting the pixel-data-like override table *before* the
/// dictionary (§4.2): Pixel Data itself, Overlay Data, and the LUT Data
/// family are always OW/OB on the wire regardless of what a dictionary
/// might otherwise say, because their true sample width is only knowable
/// from sibling elements (Bits Allocated) that the codec layer does not
/// see.
pub fn pixel_data_like_override(tag: Tag) -> Option<VR> {
    // (7FE0,0010) PixelData.
    if tag == Tag(0x7FE0, 0x0010) {
        return Some(VR::OW);
    }
    // (60xx,3000) OverlayData, for any overlay group 0x6000..=0x60FF.
    if (0x6000..=0x60FF).contains(&tag.group()) && tag.element() == 0x3000 {
        return Some(VR::OW);
    }
    // The LUT Data family: Red/Green/Blue/Palette Color, Segmented variants.
    const LUT_DATA_TAGS: &[Tag] = &[
        Tag(0x0028, 0x1201), // Red Palette Color LUT Data
        Tag(0x0028, 0x1202), // Green Palette Color LUT Data
        Tag(0x0028, 0x1203), // Blue Palette Color LUT Data
        Tag(0x0028, 0x1221), // Segmented Red Palette Color LUT Data
        Tag(0x0028, 0x1222), // Segmented Green Palette Color LUT Data
        Tag(0x0028, 0x1223), // Segmented Blue Palette Color LUT Data
        Tag(0x0028, 0x3006), // LUT Data
    ];
    if LUT_DATA_TAGS.contains(&tag) {
        return Some(VR::OW);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_data_is_overridden() {
        assert_eq!(
            pixel_data_like_override(Tag(0x7FE0, 0x0010)),
            Some(VR::OW)
        );
        assert_eq!(
            pixel_data_like_override(Tag(0x6010, 0x3000)),
            Some(VR::OW)
        );
        assert_eq!(pixel_data_like_override(Tag(0x0010, 0x0010)), None);
    }

    #[test]
    fn jpeg_baseline_is_encapsulated() {
        assert!(TransferSyntax::JPEG_BASELINE.is_encapsulated());
        assert!(!TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.is_encapsulated());
    }
}
