//! Errors raised while walking a dataset byte stream into or out of the
//! in-memory tree (Component B, §7 `MalformedDataset`).

use dicom_core::tag::Tag;
use snafu::{Backtrace, Snafu};

/// The result type used throughout `dicom-parser`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while decoding or encoding a whole dataset.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A header or value field could not be decoded by the codec layer.
    #[snafu(display("codec error while reading tag {}", tag))]
    Codec {
        tag: Tag,
        #[snafu(backtrace)]
        source: dicom_encoding::Error,
    },

    /// An I/O failure while reading or writing the dataset byte stream.
    #[snafu(display("I/O error while reading dataset"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A structural tag (Item, ItemDelimitationItem, SequenceDelimitationItem)
    /// appeared somewhere the current nesting level does not allow it.
    #[snafu(display("tag {} is not valid in this context", tag))]
    UnexpectedStructuralTag { tag: Tag, backtrace: Backtrace },

    /// An undefined-length sequence, item, or encapsulated pixel data value
    /// ran off the end of the buffer without its closing delimiter.
    #[snafu(display("unterminated undefined-length value starting with tag {}", tag))]
    Unterminated { tag: Tag, backtrace: Backtrace },

    /// The transfer syntax given to the top-level (de)serialization entry
    /// points was not one this node's profiles cover.
    #[snafu(display("unsupported transfer syntax {}", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
}
