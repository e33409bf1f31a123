//! Endianness-parametrized encoding of DICOM's fixed-width primitive wire
//! types — the write-side mirror of [`decode::basic`](crate::decode::basic).

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use dicom_core::Tag;
use std::io::Write;

use crate::decode::Endianness;
use crate::error::{Result, WriteIoSnafu};
use snafu::ResultExt;

/// A basic encoder for DICOM's fixed-width primitive wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicEncoder(pub Endianness);

impl BasicEncoder {
    /// This encoder's endianness.
    pub fn endianness(self) -> Endianness {
        self.0
    }

    /// Encode a DICOM tag: four bytes, group then element.
    pub fn encode_tag<W: Write>(self, mut to: W, tag: Tag) -> Result<()> {
        match self.0 {
            Endianness::Little => {
                to.write_u16::<LittleEndian>(tag.group()).context(WriteIoSnafu)?;
                to.write_u16::<LittleEndian>(tag.element()).context(WriteIoSnafu)?;
            }
            Endianness::Big => {
                to.write_u16::<BigEndian>(tag.group()).context(WriteIoSnafu)?;
                to.write_u16::<BigEndian>(tag.element()).context(WriteIoSnafu)?;
            }
        }
        Ok(())
    }

    /// Encode an unsigned 16-bit integer.
    pub fn encode_us<W: Write>(self, mut to: W, value: u16) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_u16::<LittleEndian>(value),
            Endianness::Big => to.write_u16::<BigEndian>(value),
        }
    }

    /// Encode an unsigned 32-bit integer (also used for lengths).
    pub fn encode_ul<W: Write>(self, mut to: W, value: u32) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_u32::<LittleEndian>(value),
            Endianness::Big => to.write_u32::<BigEndian>(value),
        }
    }

    /// Encode a signed 16-bit integer.
    pub fn encode_ss<W: Write>(self, mut to: W, value: i16) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_i16::<LittleEndian>(value),
            Endianness::Big => to.write_i16::<BigEndian>(value),
        }
    }

    /// Encode a signed 32-bit integer.
    pub fn encode_sl<W: Write>(self, mut to: W, value: i32) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_i32::<LittleEndian>(value),
            Endianness::Big => to.write_i32::<BigEndian>(value),
        }
    }

    /// Encode a 32-bit IEEE float.
    pub fn encode_fl<W: Write>(self, mut to: W, value: f32) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_f32::<LittleEndian>(value),
            Endianness::Big => to.write_f32::<BigEndian>(value),
        }
    }

    /// Encode a 64-bit IEEE float.
    pub fn encode_fd<W: Write>(self, mut to: W, value: f64) -> std::io::Result<()> {
        match self.0 {
            Endianness::Little => to.write_f64::<LittleEndian>(value),
            Endianness::Big => to.write_f64::<BigEndian>(value),
        }
    }
}
