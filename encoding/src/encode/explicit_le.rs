//! Explicit VR Little Endian encoding: tag, VR code, then a 2-byte or
//! 4-byte length field depending on [`VR::is_special`].

use std::io::Write;

use dicom_core::header::Header;
use dicom_core::vr::VR;

use super::{item_delimitation, item_header, sequence_delimitation, BasicEncoder, Encode};
use crate::decode::Endianness;
use crate::error::{Result, WriteIoSnafu};
use snafu::ResultExt;

/// Encoder for the Explicit VR Little Endian transfer syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitLeEncoder;

impl Encode for ExplicitLeEncoder {
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
        BasicEncoder(Endianness::Little)
    }
}

/// Shared write-side layout for both explicit-VR profiles.
pub(super) fn write_explicit_vr_and_len<W: Write>(
    to: &mut W,
    basic: BasicEncoder,
    header: &dyn Header,
    vr: VR,
) -> Result<()> {
    basic.encode_tag(&mut *to, header.tag())?;
    to.write_all(vr.as_str().as_bytes()).context(WriteIoSnafu)?;

    let len = header.len().0;
    if vr.is_special() {
        to.write_all(&[0u8, 0u8]).context(WriteIoSnafu)?;
        basic.encode_ul(&mut *to, len).context(WriteIoSnafu)
    } else {
        basic.encode_us(&mut *to, len as u16).context(WriteIoSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::header::DataElementHeader;
    use dicom_core::length::Length;
    use dicom_core::tag::Tag;

    #[test]
    fn encodes_short_form() {
        let header = DataElementHeader::new(Tag(0x0008, 0x0020), VR::DA, Length(8));
        let mut buf = Vec::new();
        ExplicitLeEncoder
            .encode_header(&mut buf, &header, VR::DA)
            .unwrap();
        assert_eq!(buf, vec![0x08, 0x00, 0x20, 0x00, b'D', b'A', 0x08, 0x00]);
    }

    #[test]
    fn encodes_long_form() {
        let header = DataElementHeader::new(Tag(0x7FE0, 0x0010), VR::OB, Length(4));
        let mut buf = Vec::new();
        ExplicitLeEncoder
            .encode_header(&mut buf, &header, VR::OB)
            .unwrap();
        assert_eq!(
            buf,
            vec![0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0x04, 0x00, 0x00, 0x00]
        );
    }
}
