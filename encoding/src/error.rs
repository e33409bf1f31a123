//! Errors raised by the codec (Component A).

use dicom_core::Tag;
use snafu::{Backtrace, Snafu};

/// The result type used throughout `dicom-encoding`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while decoding or encoding a primitive DICOM field.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Raised whenever a declared length would read past the end of the
    /// available buffer. Decoders never allocate beyond the declared
    /// length, so this is always caught before any over-allocation.
    #[snafu(display(
        "malformed stream: declared length {} exceeds {} remaining bytes",
        declared,
        remaining
    ))]
    MalformedStream {
        declared: u32,
        remaining: usize,
        backtrace: Backtrace,
    },

    /// Raised when a VR code read from the stream does not match any of
    /// the 27 standard codes (or the two synthetic delimiter codes).
    #[snafu(display("unrecognized VR code {:?}", code))]
    UnknownVr {
        code: [u8; 2],
        backtrace: Backtrace,
    },

    /// Raised when reading a primitive field failed at the I/O layer.
    #[snafu(display("I/O error while decoding tag {}", tag))]
    Io {
        tag: Tag,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Raised when writing a primitive field failed at the I/O layer.
    #[snafu(display("I/O error while encoding"))]
    WriteIo {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Raised when a text value could not be decoded under the active
    /// character repertoire.
    #[snafu(display("invalid text bytes for tag {}", tag))]
    InvalidText { tag: Tag, backtrace: Backtrace },
}
