//! Errors raised while composing, parsing, or dispatching DIMSE messages
//! (Component D, §4.4, §7 `MalformedDataset`/`UnknownStatus`).

use snafu::{Backtrace, Snafu};

/// The result type used throughout `dicom-dimse`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while composing, parsing, or routing a DIMSE message.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The command set could not be decoded as implicit-VR little endian
    /// (§4.4: command sets are always implicit-LE regardless of the
    /// presentation context's negotiated syntax).
    #[snafu(display("could not decode command set"))]
    MalformedCommand {
        #[snafu(backtrace)]
        source: dicom_parser::Error,
    },

    /// The command set decoded, but a required element was absent.
    #[snafu(display("command set is missing required element `{}`", field))]
    MissingCommandField { field: &'static str, backtrace: Backtrace },

    /// A command element decoded with the wrong primitive value shape
    /// (e.g. `(0000,0100)` not a single `US`).
    #[snafu(display("command element `{}` has an unexpected value representation", field))]
    UnexpectedCommandFieldShape { field: &'static str, backtrace: Backtrace },

    /// `(0000,0100)` held a value outside the known DIMSE command field set.
    #[snafu(display("unrecognized command field code {:#06x}", code))]
    UnknownCommandField { code: u16, backtrace: Backtrace },

    /// `(0000,0900)` held a value outside the status taxonomy of §4.4.
    #[snafu(display("status code {:#06x} is outside the known taxonomy", code))]
    UnknownStatus { code: u16, backtrace: Backtrace },

    /// The dataset following a command could not be decoded under the
    /// negotiated presentation context's transfer syntax.
    #[snafu(display("could not decode dataset for presentation context {}", presentation_context_id))]
    MalformedDataset {
        presentation_context_id: u8,
        #[snafu(backtrace)]
        source: dicom_parser::Error,
    },

    /// A command or dataset arrived tagged with a presentation context ID
    /// this association never negotiated.
    #[snafu(display("presentation context {} was not negotiated", id))]
    UnknownPresentationContext { id: u8, backtrace: Backtrace },

    /// No handler is registered for the affected SOP class carried by an
    /// inbound command.
    #[snafu(display("no handler registered for SOP class `{}`", sop_class_uid))]
    UnhandledSopClass { sop_class_uid: String, backtrace: Backtrace },

    /// A presentation context negotiated a transfer syntax UID this node's
    /// registry does not recognize (should not happen: negotiation only
    /// ever accepts UIDs the registry already validated).
    #[snafu(display("transfer syntax `{}` is not in the registry", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },

    /// A request command field has no corresponding response field (e.g.
    /// `C-CANCEL-RQ`), so a handler cannot be asked to answer it.
    #[snafu(display("command field has no response counterpart"))]
    NoResponseField { backtrace: Backtrace },

    /// The presentation context layer (`dicom-ul`) failed.
    #[snafu(display("upper layer error"))]
    Ul {
        #[snafu(backtrace)]
        source: dicom_ul::Error,
    },
}

impl From<dicom_ul::Error> for Error {
    fn from(source: dicom_ul::Error) -> Self {
        Error::Ul { source }
    }
}
