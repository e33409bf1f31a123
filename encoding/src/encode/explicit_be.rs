//! Explicit VR Big Endian encoding (`1.2.840.10008.1.2.2`).

use std::io::Write;

use dicom_core::header::Header;
use dicom_core::vr::VR;

use super::explicit_le::write_explicit_vr_and_len;
use super::{item_delimitation, item_header, sequence_delimitation, BasicEncoder, Encode};
use crate::decode::Endianness;
use crate::error::Result;

/// Encoder for the Explicit VR Big Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitBeEncoder;

impl Encode for ExplicitBeEncoder {
    fn encode_header<W: Write>(&self, to: &mut W, header: &dyn Header, vr: VR) -> Result<()> {
        write_explicit_vr_and_len(to, self.basic(), header, vr)
    }

    fn encode_item_header<W: Write>(&self, to: &mut W, len: u32) -> Result<()> {
        item_header(self.basic(), to, len)
    }

    fn encode_item_delimitation<W: Write>(&self, to: &mut W) -> Result<()> {
        item_delimitation(self.basic(), to)
    }

    fn encode_sequence_delimitation<W: Write>(&self, to: &mut W) -> Result<()> {
        sequence_delimitation(self.basic(), to)
    }

    fn basic(&self) -> BasicEncoder {
        BasicEncoder(Endianness::Big)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::header::DataElementHeader;
    use dicom_core::length::Length;
    use dicom_core::tag::Tag;

    #[test]
    fn encodes_short_form_big_endian() {
        let header = DataElementHeader::new(Tag(0x0008, 0x0020), VR::DA, Length(8));
        let mut buf = Vec::new();
        ExplicitBeEncoder
            .encode_header(&mut buf, &header, VR::DA)
            .unwrap();
        assert_eq!(buf, vec![0x00, 0x08, 0x00, 0x20, b'D', b'A', 0x00, 0x08]);
    }
}
