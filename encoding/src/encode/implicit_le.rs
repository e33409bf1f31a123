//! Implicit VR Little Endian encoding: tag + 4-byte length, no VR field.

use std::io::Write;

use dicom_core::header::Header;
use dicom_core::vr::VR;

use super::{item_delimitation, item_header, sequence_delimitation, BasicEncoder, Encode};
use crate::decode::Endianness;
use crate::error::{Result, WriteIoSnafu};
use snafu::ResultExt;

/// Encoder for the Implicit VR Little Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplicitLeEncoder;

impl Encode for ImplicitLeEncoder {
    fn encode_header<W: Write>(&self, to: &mut W, header: &dyn Header, _vr: VR) -> Result<()> {
        let basic = self.basic();
        basic.encode_tag(&mut *to, header.tag())?;
        let len = header.len().0;
        basic.encode_ul(&mut *to, len).context(WriteIoSnafu)
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
        BasicEncoder(Endianness::Little)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::header::DataElementHeader;
    use dicom_core::length::Length;
    use dicom_core::tag::Tag;

    #[test]
    fn encodes_header() {
        let header = DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, Length(4));
        let mut buf = Vec::new();
        ImplicitLeEncoder
            .encode_header(&mut buf, &header, VR::PN)
            .unwrap();
        assert_eq!(buf, vec![0x10, 0x00, 0x10, 0x00, 0x04, 0x00, 0x00, 0x00]);
    }
}
