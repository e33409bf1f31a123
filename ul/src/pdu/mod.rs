//! The PDU type (§4.3.1, §6): a tagged union over the seven protocol data
//! unit kinds the upper layer exchanges, plus the variable-length items
//! nested inside `A-ASSOCIATE-RQ`/`-AC`.
//!
//! Encoding and decoding are kept in separate modules ([`reader`],
//! [`writer`]) so that this module stays a plain data description, matching
//! how the rest of this protocol stack separates wire format from model.

pub mod reader;
pub mod writer;

pub use reader::read_pdu;
pub use writer::write_pdu;

/// One protocol data unit exchanged over an association (§4.3.1).
#[derive(Clone, Debug, PartialEq)]
pub enum Pdu {
    AssociationRQ(AssociationRQ),
    AssociationAC(AssociationAC),
    AssociationRJ(AssociationRJ),
    PData { data: Vec<PDataValue> },
    ReleaseRQ,
    ReleaseRP,
    AbortRQ { source: AbortRQSource },
    /// A PDU type this node does not recognize; the body is kept verbatim so
    /// that it can at least be logged or re-framed.
    Unknown { pdu_type: u8, data: Vec<u8> },
}

impl Pdu {
    /// A short, human-readable name for the PDU's variant, for log lines and
    /// `UnexpectedPdu` error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Pdu::AssociationRQ(_) => "A-ASSOCIATE-RQ",
            Pdu::AssociationAC(_) => "A-ASSOCIATE-AC",
            Pdu::AssociationRJ(_) => "A-ASSOCIATE-RJ",
            Pdu::PData { .. } => "P-DATA-TF",
            Pdu::ReleaseRQ => "A-RELEASE-RQ",
            Pdu::ReleaseRP => "A-RELEASE-RP",
            Pdu::AbortRQ { .. } => "A-ABORT",
            Pdu::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssociationRQ {
    pub protocol_version: u16,
    pub calling_ae_title: String,
    pub called_ae_title: String,
    pub application_context_name: String,
    pub presentation_contexts: Vec<PresentationContextProposed>,
    pub user_variables: Vec<UserVariableItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssociationAC {
    pub protocol_version: u16,
    pub application_context_name: String,
    pub called_ae_title: String,
    pub calling_ae_title: String,
    pub presentation_contexts: Vec<PresentationContextResult>,
    pub user_variables: Vec<UserVariableItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssociationRJ {
    pub result: AssociationRJResult,
    pub source: AssociationRJSource,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AssociationRJResult {
    Permanent,
    Transient,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AssociationRJSource {
    ServiceUser(AssociationRJServiceUserReason),
    ServiceProviderAcse(AssociationRJServiceProviderAcseReason),
    ServiceProviderPresentation(AssociationRJServiceProviderPresentationReason),
}

impl AssociationRJSource {
    pub(crate) fn from_wire(source: u8, reason: u8) -> Option<Self> {
        Some(match source {
            1 => AssociationRJSource::ServiceUser(match reason {
                1 => AssociationRJServiceUserReason::NoReasonGiven,
                2 => AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                3 => AssociationRJServiceUserReason::CallingAeTitleNotRecognized,
                7 => AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
                other => AssociationRJServiceUserReason::Reserved(other),
            }),
            2 => AssociationRJSource::ServiceProviderAcse(match reason {
                1 => AssociationRJServiceProviderAcseReason::NoReasonGiven,
                2 => AssociationRJServiceProviderAcseReason::ProtocolVersionNotSupported,
                _ => return None,
            }),
            3 => AssociationRJSource::ServiceProviderPresentation(match reason {
                1 => AssociationRJServiceProviderPresentationReason::TemporaryCongestion,
                2 => AssociationRJServiceProviderPresentationReason::LocalLimitExceeded,
                other => AssociationRJServiceProviderPresentationReason::Reserved(other),
            }),
            _ => return None,
        })
    }

    pub(crate) fn to_wire(self) -> (u8, u8) {
        match self {
            AssociationRJSource::ServiceUser(reason) => (
                1,
                match reason {
                    AssociationRJServiceUserReason::NoReasonGiven => 1,
                    AssociationRJServiceUserReason::ApplicationContextNameNotSupported => 2,
                    AssociationRJServiceUserReason::CallingAeTitleNotRecognized => 3,
                    AssociationRJServiceUserReason::CalledAeTitleNotRecognized => 7,
                    AssociationRJServiceUserReason::Reserved(v) => v,
                },
            ),
            AssociationRJSource::ServiceProviderAcse(reason) => (
                2,
                match reason {
                    AssociationRJServiceProviderAcseReason::NoReasonGiven => 1,
                    AssociationRJServiceProviderAcseReason::ProtocolVersionNotSupported => 2,
                },
            ),
            AssociationRJSource::ServiceProviderPresentation(reason) => (
                3,
                match reason {
                    AssociationRJServiceProviderPresentationReason::TemporaryCongestion => 1,
                    AssociationRJServiceProviderPresentationReason::LocalLimitExceeded => 2,
                    AssociationRJServiceProviderPresentationReason::Reserved(v) => v,
                },
            ),
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AssociationRJServiceUserReason {
    NoReasonGiven,
    ApplicationContextNameNotSupported,
    CallingAeTitleNotRecognized,
    CalledAeTitleNotRecognized,
    Reserved(u8),
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AssociationRJServiceProviderAcseReason {
    NoReasonGiven,
    ProtocolVersionNotSupported,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AssociationRJServiceProviderPresentationReason {
    TemporaryCongestion,
    LocalLimitExceeded,
    Reserved(u8),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PresentationContextProposed {
    pub id: u8,
    pub abstract_syntax: String,
    pub transfer_syntaxes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PresentationContextResult {
    pub id: u8,
    pub reason: PresentationContextResultReason,
    pub transfer_syntax: String,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum PresentationContextResultReason {
    Acceptance,
    UserRejection,
    NoReason,
    AbstractSyntaxNotSupported,
    TransferSyntaxesNotSupported,
}

impl PresentationContextResultReason {
    pub(crate) fn from_wire(v: u8) -> Option<Self> {
        Some(match v {
            0 => PresentationContextResultReason::Acceptance,
            1 => PresentationContextResultReason::UserRejection,
            2 => PresentationContextResultReason::NoReason,
            3 => PresentationContextResultReason::AbstractSyntaxNotSupported,
            4 => PresentationContextResultReason::TransferSyntaxesNotSupported,
            _ => return None,
        })
    }

    pub(crate) fn to_wire(self) -> u8 {
        match self {
            PresentationContextResultReason::Acceptance => 0,
            PresentationContextResultReason::UserRejection => 1,
            PresentationContextResultReason::NoReason => 2,
            PresentationContextResultReason::AbstractSyntaxNotSupported => 3,
            PresentationContextResultReason::TransferSyntaxesNotSupported => 4,
        }
    }

    /// Whether this presentation context was accepted (§4.3.6).
    pub fn is_acceptance(self) -> bool {
        matches!(self, PresentationContextResultReason::Acceptance)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UserVariableItem {
    MaxLength(u32),
    ImplementationClassUid(String),
    ImplementationVersionName(String),
    Unknown(u8, Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PDataValue {
    pub presentation_context_id: u8,
    pub value_type: PDataValueType,
    pub is_last: bool,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum PDataValueType {
    Command,
    Data,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AbortRQSource {
    ServiceUser,
    ServiceProvider(AbortRQServiceProviderReason),
    Reserved,
}

impl AbortRQSource {
    pub(crate) fn from_wire(source: u8, reason: u8) -> Option<Self> {
        Some(match source {
            0 => AbortRQSource::ServiceUser,
            1 => AbortRQSource::Reserved,
            2 => AbortRQSource::ServiceProvider(match reason {
                0 => AbortRQServiceProviderReason::ReasonNotSpecified,
                1 => AbortRQServiceProviderReason::UnrecognizedPdu,
                2 => AbortRQServiceProviderReason::UnexpectedPdu,
                4 => AbortRQServiceProviderReason::UnrecognizedPduParameter,
                5 => AbortRQServiceProviderReason::UnexpectedPduParameter,
                6 => AbortRQServiceProviderReason::InvalidPduParameter,
                _ => AbortRQServiceProviderReason::ReasonNotSpecified,
            }),
            _ => return None,
        })
    }

    pub(crate) fn to_wire(self) -> (u8, u8) {
        match self {
            AbortRQSource::ServiceUser => (0, 0),
            AbortRQSource::Reserved => (1, 0),
            AbortRQSource::ServiceProvider(reason) => (
                2,
                match reason {
                    AbortRQServiceProviderReason::ReasonNotSpecified => 0,
                    AbortRQServiceProviderReason::UnrecognizedPdu => 1,
                    AbortRQServiceProviderReason::UnexpectedPdu => 2,
                    AbortRQServiceProviderReason::UnrecognizedPduParameter => 4,
                    AbortRQServiceProviderReason::UnexpectedPduParameter => 5,
                    AbortRQServiceProviderReason::InvalidPduParameter => 6,
                },
            ),
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum AbortRQServiceProviderReason {
    ReasonNotSpecified,
    UnrecognizedPdu,
    UnexpectedPdu,
    UnrecognizedPduParameter,
    UnexpectedPduParameter,
    InvalidPduParameter,
}

/// An item read from an `A-ASSOCIATE-RQ`/`-AC` variable field, before it has
/// been sorted into the caller's accumulators. Exists only inside
/// [`reader`]; never part of the public [`Pdu`] shape.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PduVariableItem {
    Unknown(u8),
    ApplicationContext(String),
    PresentationContextProposed(PresentationContextProposed),
    PresentationContextResult(PresentationContextResult),
    UserVariables(Vec<UserVariableItem>),
}
