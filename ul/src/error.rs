//! Errors raised while reading or writing PDUs (§4.3, §7 `MalformedPdu`,
//! `AssociationRejected`, `AssociationAborted`, `ProtocolTimeout`) and while
//! driving an association through the upper layer state machine.

use snafu::{Backtrace, Snafu};

use crate::pdu::{AbortRQSource, AssociationRJResult, AssociationRJSource};

/// The result type used throughout `dicom-ul`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while decoding or encoding a single PDU.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PduError {
    #[snafu(display("PDU type {:#04x} is not recognized in this context", pdu_type))]
    UnknownPduType { pdu_type: u8, backtrace: Backtrace },

    #[snafu(display("invalid item length {} (must be >= 2)", length))]
    InvalidItemLength { length: u32 },

    #[snafu(display("incoming PDU was too large: length {}, maximum is {}", pdu_length, max_pdu_length))]
    PduTooLarge {
        pdu_length: u32,
        max_pdu_length: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("could not read PDU field `{}`", field))]
    ReadField {
        field: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("could not write PDU field `{}`", field))]
    WriteField {
        field: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("field `{}` is not valid ASCII/Latin-1 text", field))]
    InvalidText { field: &'static str, backtrace: Backtrace },

    #[snafu(display("invalid reject source or reason"))]
    InvalidRejectSourceOrReason { backtrace: Backtrace },

    #[snafu(display("invalid abort source or reason"))]
    InvalidAbortSourceOrReason { backtrace: Backtrace },

    #[snafu(display("invalid presentation context result reason"))]
    InvalidPresentationContextResultReason { backtrace: Backtrace },

    #[snafu(display("missing required field `{}`", field))]
    MissingField { field: &'static str, backtrace: Backtrace },

    #[snafu(display("no PDU available"))]
    NoPduAvailable { backtrace: Backtrace },
}

/// Errors produced while driving an association to completion.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A PDU could not be read off, or written to, the transport.
    #[snafu(display("PDU error"))]
    Pdu {
        #[snafu(backtrace)]
        source: PduError,
    },

    /// An I/O failure on the underlying transport, outside of PDU framing.
    #[snafu(display("I/O error on association transport"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The peer rejected the association request.
    #[snafu(display("association rejected: {:?} ({:?})", result, source))]
    Rejected {
        result: AssociationRJResult,
        source: AssociationRJSource,
    },

    /// The peer aborted the association.
    #[snafu(display("association aborted by peer: {:?}", source))]
    Aborted { source: AbortRQSource },

    /// A PDU arrived that the state machine does not accept in the current
    /// state (§4.3.2, `AA-8`).
    #[snafu(display("unexpected PDU {} in state {}", pdu_name, state))]
    UnexpectedPdu {
        pdu_name: &'static str,
        state: &'static str,
        backtrace: Backtrace,
    },

    /// The ARTIM timer elapsed before the expected PDU arrived (§4.3.4).
    #[snafu(display("ARTIM timer expired waiting for a PDU"))]
    ArtimTimeout { backtrace: Backtrace },

    /// The connection closed before an association reached a stable state.
    #[snafu(display("connection closed unexpectedly"))]
    ConnectionClosed { backtrace: Backtrace },

    /// A presentation data value arrived for a presentation context ID that
    /// was never accepted.
    #[snafu(display("presentation context {} was not accepted", id))]
    UnknownPresentationContext { id: u8, backtrace: Backtrace },
}

impl From<PduError> for Error {
    fn from(source: PduError) -> Self {
        Error::Pdu { source }
    }
}
