//! Errors raised while building, casting, or walking core DICOM value types.

use crate::tag::Tag;
use crate::value::ValueType;
use snafu::Snafu;

/// The result type used throughout `dicom-core`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the core data model.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// the data element at the current position had an unexpected tag
    #[snafu(display("unexpected tag {}, expected {}", got, expected))]
    UnexpectedTag { got: Tag, expected: Tag },

    /// a value was requested in a representation it cannot be cast to
    #[snafu(display("cannot cast value of type {:?} as {}", got, requested))]
    CastValue {
        requested: &'static str,
        got: ValueType,
    },

    /// a tag was inserted twice into the same dataset or item
    #[snafu(display("duplicate tag {} in dataset", tag))]
    DuplicateTag { tag: Tag },

    /// a sequence or item with undefined length never reached its delimiter
    #[snafu(display("unterminated undefined-length sequence or item starting with tag {}", tag))]
    UnterminatedValue { tag: Tag },
}
