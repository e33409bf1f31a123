//! The DICOM Upper Layer protocol (Component C, §4.3): PDU framing, the
//! pure association state machine, the ARTIM timer, and the runtime that
//! wires the machine to a generic byte transport.
//!
//! - The [`pdu`] module is the wire format: the [`Pdu`](pdu::Pdu) tagged
//!   union and its reader/writer (§4.3.1, §6).
//! - The [`statemachine`] module is the pure `(State, Event) ->
//!   (State, Vec<Action>)` function (§4.3.2); it knows nothing about
//!   sockets, timers, or queues.
//! - The [`timer`] module is the ARTIM deadline (§4.3.3).
//! - The [`association`] module is the runtime: it owns a transport, drives
//!   the state machine, maintains the write queue (§4.3.4), and fragments
//!   P-DATA-TF messages (§4.3.5).

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod association;
pub mod error;
pub mod pdu;
pub mod statemachine;
pub mod timer;

pub use association::client::{ClientAssociation, ClientAssociationOptions};
pub use association::server::{ServerAssociation, ServerAssociationOptions};
pub use association::{Association, NegotiatedContext};
pub use error::{Error, Result};
pub use pdu::{read_pdu, write_pdu, Pdu};

/// The implementation class UID this node identifies itself with in the
/// `User-Information` item of association requests/responses.
///
/// A real deployment should mint its own; this one only needs to be
/// syntactically valid and stable within one build.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.10008000000000000000000000000000000001";

/// The implementation version name this node identifies itself with.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DICOM-CORE-RS_001";
