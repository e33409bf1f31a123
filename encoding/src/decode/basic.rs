//! Endianness-parametrized decoding of DICOM's fixed-width primitive wire
//! types: tags, lengths, and numeric VR payloads (§4.1).

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use dicom_core::Tag;
use std::io::Read;

use crate::error::{IoSnafu, Result};
use snafu::ResultExt;

/// Byte order, decided per transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Little endian (implicit-LE, explicit-LE, encapsulated).
    Little,
    /// Big endian (explicit-BE).
    Big,
}

/// A basic decoder for DICOM's fixed-width primitive wire types, dispatched
/// at run time over the two possible endiannesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicDecoder(pub Endianness);

impl BasicDecoder {
    /// This decoder's endianness.
    pub fn endianness(self) -> Endianness {
        self.0
    }

    /// Decode a DICOM tag: four bytes, group then element, in this
    /// decoder's endianness (§4.1 "Tag encoding").
    pub fn decode_tag<S: Read>(self, mut source: S) -> Result<Tag> {
        let (group, element) = match self.0 {
            Endianness::Little => (
                source.read_u16::<LittleEndian>(),
                source.read_u16::<LittleEndian>(),
            ),
            Endianness::Big => (
                source.read_u16::<BigEndian>(),
                source.read_u16::<BigEndian>(),
            ),
        };
        let group = group.context(IoSnafu { tag: Tag(0, 0) })?;
        let element = element.context(IoSnafu { tag: Tag(0, 0) })?;
        Ok(Tag(group, element))
    }

    /// Decode an unsigned 16-bit integer (US).
    pub fn decode_us<S: Read>(self, mut source: S) -> std::io::Result<u16> {
        match self.0 {
            Endianness::Little => source.read_u16::<LittleEndian>(),
            Endianness::Big => source.read_u16::<BigEndian>(),
        }
    }

    /// Decode an unsigned 32-bit integer (UL, and lengths).
    pub fn decode_ul<S: Read>(self, mut source: S) -> std::io::Result<u32> {
        match self.0 {
            Endianness::Little => source.read_u32::<LittleEndian>(),
            Endianness::Big => source.read_u32::<BigEndian>(),
        }
    }

    /// Decode a signed 16-bit integer (SS).
    pub fn decode_ss<S: Read>(self, mut source: S) -> std::io::Result<i16> {
        match self.0 {
            Endianness::Little => source.read_i16::<LittleEndian>(),
            Endianness::Big => source.read_i16::<BigEndian>(),
        }
    }

    /// Decode a signed 32-bit integer (SL).
    pub fn decode_sl<S: Read>(self, mut source: S) -> std::io::Result<i32> {
        match self.0 {
            Endianness::Little => source.read_i32::<LittleEndian>(),
            Endianness::Big => source.read_i32::<BigEndian>(),
        }
    }

    /// Decode a 32-bit IEEE float (FL, OF).
    pub fn decode_fl<S: Read>(self, mut source: S) -> std::io::Result<f32> {
        match self.0 {
            Endianness::Little => source.read_f32::<LittleEndian>(),
            Endianness::Big => source.read_f32::<BigEndian>(),
        }
    }

    /// Decode a 64-bit IEEE float (FD).
    pub fn decode_fd<S: Read>(self, mut source: S) -> std::io::Result<f64> {
        match self.0 {
            Endianness::Little => source.read_f64::<LittleEndian>(),
            Endianness::Big => source.read_f64::<BigEndian>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_endianness() {
        let bytes = [0x10, 0x00, 0x10, 0x00];
        let t = BasicDecoder(Endianness::Little)
            .decode_tag(&bytes[..])
            .unwrap();
        assert_eq!(t, Tag(0x0010, 0x0010));

        let bytes_be = [0x00, 0x10, 0x00, 0x10];
        let t = BasicDecoder(Endianness::Big)
            .decode_tag(&bytes_be[..])
            .unwrap();
        assert_eq!(t, Tag(0x0010, 0x0010));
    }
}
