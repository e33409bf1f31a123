//! The acceptor (SCP) side of an association: [`ServerAssociationOptions`]
//! negotiates presentation contexts against a locally configured set of
//! abstract/transfer syntaxes and drives the `AE-5..AE-7` transitions;
//! [`ServerAssociation`] is the resulting live association.

use std::borrow::Cow;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::ResultExt;

use crate::association::pdata::{fragment, Reassembler};
use crate::association::{event_for_pdu, unexpected_pdu_abort, NegotiatedContext, Runtime};
use crate::error::{PduSnafu, Result};
use crate::pdu::{
    reader::DEFAULT_MAX_PDU, write_pdu, AbortRQServiceProviderReason, AssociationAC,
    AssociationRJ, AssociationRJResult, AssociationRJServiceUserReason, AssociationRJSource, Pdu,
    PresentationContextResult, PresentationContextResultReason, UserVariableItem,
};
use crate::statemachine::{Event, Role};
use crate::timer::DEFAULT_TIMEOUT;

/// Common interface for application entity access control policies,
/// consulted during `AE-6` before a presentation context is even looked at.
///
/// Implementations include [`AcceptAny`] and [`AcceptCalledAeTitle`]; a
/// caller may supply any other policy.
pub trait AccessControl {
    /// Decide whether to grant the requesting node clearance. `Ok(())`
    /// accepts; an `Err` carries the service-user rejection reason to send
    /// back in the `A-ASSOCIATE-RJ`.
    fn check_access(
        &self,
        this_ae_title: &str,
        calling_ae_title: &str,
        called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason>;
}

/// Accepts every incoming association request, regardless of AE titles.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AcceptAny;

impl AccessControl for AcceptAny {
    fn check_access(
        &self,
        _this_ae_title: &str,
        _calling_ae_title: &str,
        _called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason> {
        Ok(())
    }
}

/// Accepts an association only when the called AE title matches this
/// node's own.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AcceptCalledAeTitle;

impl AccessControl for AcceptCalledAeTitle {
    fn check_access(
        &self,
        this_ae_title: &str,
        _calling_ae_title: &str,
        called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason> {
        if this_ae_title == called_ae_title {
            Ok(())
        } else {
            Err(AssociationRJServiceUserReason::CalledAeTitleNotRecognized)
        }
    }
}

/// Builds and negotiates a server-side (SCP) association (§4.3.6).
///
/// Reusable across connections: each call to [`Self::establish`] or
/// [`Self::establish_with`] runs one independent negotiation.
///
/// ```no_run
/// # use dicom_ul::ServerAssociationOptions;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ServerAssociationOptions::new()
///     .ae_title("THIS-SCP")
///     .with_supported_abstract_syntax("1.2.840.10008.1.1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServerAssociationOptions<A = AcceptAny> {
    access_control: A,
    ae_title: Cow<'static, str>,
    application_context_name: Cow<'static, str>,
    supported_abstract_syntaxes: Vec<Cow<'static, str>>,
    max_pdu_length: u32,
    artim_timeout: Duration,
}

impl Default for ServerAssociationOptions<AcceptAny> {
    fn default() -> Self {
        ServerAssociationOptions {
            access_control: AcceptAny,
            ae_title: "THIS-SCP".into(),
            application_context_name: "1.2.840.10008.3.1.1.1".into(),
            supported_abstract_syntaxes: Vec::new(),
            max_pdu_length: DEFAULT_MAX_PDU,
            artim_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ServerAssociationOptions<AcceptAny> {
    /// Start from the default option set: accepts any AE title and every
    /// transfer syntax in the built-in registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: AccessControl> ServerAssociationOptions<A> {
    /// Switch to a different access control policy.
    pub fn access_control<P: AccessControl>(self, access_control: P) -> ServerAssociationOptions<P> {
        ServerAssociationOptions {
            access_control,
            ae_title: self.ae_title,
            application_context_name: self.application_context_name,
            supported_abstract_syntaxes: self.supported_abstract_syntaxes,
            max_pdu_length: self.max_pdu_length,
            artim_timeout: self.artim_timeout,
        }
    }

    /// Only accept requests whose called AE title matches [`Self::ae_title`].
    pub fn accept_called_ae_title(self) -> ServerAssociationOptions<AcceptCalledAeTitle> {
        self.access_control(AcceptCalledAeTitle)
    }

    /// Set this node's AE title. Default `"THIS-SCP"`.
    pub fn ae_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.ae_title = title.into();
        self
    }

    /// Declare an abstract syntax this node provides. A proposed
    /// presentation context whose abstract syntax is not in this list (when
    /// non-empty) is rejected with `AbstractSyntaxNotSupported`; an empty
    /// list accepts any abstract syntax.
    pub fn with_supported_abstract_syntax(mut self, uid: impl Into<Cow<'static, str>>) -> Self {
        self.supported_abstract_syntaxes.push(uid.into());
        self
    }

    /// Override this node's advertised maximum PDU length. Default 16384.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = value;
        self
    }

    /// Override the ARTIM timeout (§4.3.3). Default 10s.
    pub fn artim_timeout(mut self, value: Duration) -> Self {
        self.artim_timeout = value;
        self
    }

    /// Accept a pending TCP connection and negotiate an association on it.
    pub fn establish(self, socket: TcpStream) -> Result<ServerAssociation<TcpStream>> {
        self.establish_with(socket)
    }

    /// Negotiate an association over an already-accepted transport
    /// (allows TLS or any other `Read + Write` stream, per §1's transport
    /// non-goal).
    pub fn establish_with<T: Read + Write>(self, mut transport: T) -> Result<ServerAssociation<T>> {
        let registry = TransferSyntaxRegistry;

        let mut runtime = Runtime::new(Role::Acceptor, self.artim_timeout);
        // AE-5: a connection has already been accepted by the time this
        // runs, so TRANS_CONN_INDIC fires immediately and starts ARTIM.
        runtime.apply(Event::TransportConnectIndication, || {
            unreachable!("AE-5 sends no abort")
        })?;

        let request = crate::pdu::read_pdu(&mut transport, self.max_pdu_length)?;
        runtime.apply(event_for_pdu(&request), unexpected_pdu_abort)?;

        let rq = match request {
            Pdu::AssociationRQ(rq) => rq,
            other => {
                return crate::error::UnexpectedPduSnafu {
                    pdu_name: other.name(),
                    state: "Sta2",
                }
                .fail()
            }
        };

        if let Err(reason) =
            self.access_control
                .check_access(&self.ae_title, &rq.calling_ae_title, &rq.called_ae_title)
        {
            let rj = Pdu::AssociationRJ(AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(reason),
            });
            runtime.apply(Event::AAssociateReject, || unreachable!("AE-8 sends no abort"))?;
            write_pdu(&mut transport, &rj).context(PduSnafu)?;
            return crate::error::RejectedSnafu {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(reason),
            }
            .fail();
        }

        let peer_max_pdu = rq
            .user_variables
            .iter()
            .find_map(|v| match v {
                UserVariableItem::MaxLength(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(DEFAULT_MAX_PDU);

        let mut accepted = Vec::new();
        let result_contexts: Vec<PresentationContextResult> = rq
            .presentation_contexts
            .iter()
            .map(|pc| {
                let abstract_syntax_supported = self.supported_abstract_syntaxes.is_empty()
                    || self
                        .supported_abstract_syntaxes
                        .iter()
                        .any(|uid| uid.as_ref() == pc.abstract_syntax);

                if !abstract_syntax_supported {
                    return PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::AbstractSyntaxNotSupported,
                        transfer_syntax: String::new(),
                    };
                }

                let chosen = pc
                    .transfer_syntaxes
                    .iter()
                    .find(|uid| registry.get(uid).is_some());

                match chosen {
                    Some(ts) => {
                        accepted.push(NegotiatedContext {
                            id: pc.id,
                            abstract_syntax_uid: pc.abstract_syntax.clone(),
                            transfer_syntax_uid: ts.clone(),
                        });
                        PresentationContextResult {
                            id: pc.id,
                            reason: PresentationContextResultReason::Acceptance,
                            transfer_syntax: ts.clone(),
                        }
                    }
                    None => PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::TransferSyntaxesNotSupported,
                        transfer_syntax: String::new(),
                    },
                }
            })
            .collect();

        let ac = Pdu::AssociationAC(AssociationAC {
            protocol_version: rq.protocol_version,
            application_context_name: self.application_context_name.to_string(),
            called_ae_title: rq.called_ae_title.clone(),
            calling_ae_title: rq.calling_ae_title.clone(),
            presentation_contexts: result_contexts,
            user_variables: vec![
                UserVariableItem::MaxLength(self.max_pdu_length),
                UserVariableItem::ImplementationClassUid(
                    crate::IMPLEMENTATION_CLASS_UID.to_string(),
                ),
                UserVariableItem::ImplementationVersionName(
                    crate::IMPLEMENTATION_VERSION_NAME.to_string(),
                ),
            ],
        });
        runtime.apply(Event::AAssociateAccept, || unreachable!("AE-7 sends no abort"))?;
        write_pdu(&mut transport, &ac).context(PduSnafu)?;

        Ok(ServerAssociation {
            transport,
            runtime,
            calling_ae_title: rq.calling_ae_title,
            called_ae_title: rq.called_ae_title,
            presentation_contexts: accepted,
            max_pdu_length: self.max_pdu_length,
            peer_max_pdu_length: peer_max_pdu,
            reassembler: Reassembler::new(),
        })
    }
}

/// A live association from the acceptor's point of view, past negotiation
/// and ready for data transfer (`Sta6`).
#[derive(Debug)]
pub struct ServerAssociation<T> {
    transport: T,
    runtime: Runtime,
    calling_ae_title: String,
    called_ae_title: String,
    presentation_contexts: Vec<NegotiatedContext>,
    max_pdu_length: u32,
    peer_max_pdu_length: u32,
    reassembler: Reassembler,
}

impl<T: Read + Write> ServerAssociation<T> {
    /// The AE title the requestor identified itself with.
    pub fn calling_ae_title(&self) -> &str {
        &self.calling_ae_title
    }

    /// The AE title the requestor addressed this node as.
    pub fn called_ae_title(&self) -> &str {
        &self.called_ae_title
    }

    /// The presentation contexts accepted during negotiation.
    pub fn presentation_contexts(&self) -> &[NegotiatedContext] {
        &self.presentation_contexts
    }

    /// The maximum PDU length the peer advertised; every outbound
    /// P-DATA-TF this node emits respects this bound (§8 universal
    /// invariant).
    pub fn peer_max_pdu_length(&self) -> u32 {
        self.peer_max_pdu_length
    }

    /// Send a DIMSE message (command set plus optional dataset) on the
    /// given presentation context, fragmenting per §4.3.5.
    pub fn send_message(
        &mut self,
        presentation_context_id: u8,
        command: &[u8],
        dataset: Option<&[u8]>,
    ) -> Result<()> {
        for pdu in fragment(presentation_context_id, command, dataset, self.peer_max_pdu_length) {
            self.runtime
                .apply(Event::PDataRequest, || unreachable!("DT-1 sends no abort"))?;
            write_pdu(&mut self.transport, &pdu).context(PduSnafu)?;
        }
        Ok(())
    }

    /// Receive the next command set.
    pub fn receive_command(&mut self) -> Result<(u8, Vec<u8>)> {
        let result = self
            .reassembler
            .receive_command(&mut self.transport, self.max_pdu_length)?;
        self.runtime
            .apply(Event::RecvPData, || unreachable!("AR-6/DT-2 send no abort"))?;
        Ok(result)
    }

    /// Receive the dataset that follows a command set just received via
    /// [`Self::receive_command`]. Only call this when the command
    /// indicated a dataset is present.
    pub fn receive_dataset(&mut self) -> Result<Vec<u8>> {
        self.reassembler
            .receive_dataset(&mut self.transport, self.max_pdu_length)
    }

    /// Wait for, and consume, the peer's `A-RELEASE-RQ`, then answer it
    /// (`AR-2`/`AR-4`). This is the usual way an SCP drives the release
    /// handshake once it has finished replying to the requestor.
    pub fn wait_for_release(mut self) -> Result<()> {
        let request = crate::pdu::read_pdu(&mut self.transport, self.max_pdu_length)?;
        self.runtime.apply(event_for_pdu(&request), unexpected_pdu_abort)?;
        match request {
            Pdu::ReleaseRQ => {
                self.runtime
                    .apply(Event::AReleaseResponse, || unreachable!("AR-4 sends no abort"))?;
                write_pdu(&mut self.transport, &Pdu::ReleaseRP).context(PduSnafu)?;
                Ok(())
            }
            other => crate::error::UnexpectedPduSnafu {
                pdu_name: other.name(),
                state: "Sta6",
            }
            .fail(),
        }
    }

    /// Abort the association immediately (`AA-1`), without waiting for
    /// a release handshake.
    pub fn abort(mut self) -> Result<()> {
        self.runtime.apply(Event::AAbortRequest, || {
            crate::association::protocol_abort(AbortRQServiceProviderReason::ReasonNotSpecified)
        })?;
        while let Some(pdu) = self.runtime.next_to_write() {
            write_pdu(&mut self.transport, &pdu).context(PduSnafu)?;
        }
        Ok(())
    }
}

impl<T: Read + Write> crate::association::Association for ServerAssociation<T> {
    fn presentation_contexts(&self) -> &[NegotiatedContext] {
        ServerAssociation::presentation_contexts(self)
    }

    fn peer_max_pdu_length(&self) -> u32 {
        ServerAssociation::peer_max_pdu_length(self)
    }

    fn send_message(
        &mut self,
        presentation_context_id: u8,
        command: &[u8],
        dataset: Option<&[u8]>,
    ) -> Result<()> {
        ServerAssociation::send_message(self, presentation_context_id, command, dataset)
    }

    fn receive_command(&mut self) -> Result<(u8, Vec<u8>)> {
        ServerAssociation::receive_command(self)
    }

    fn receive_dataset(&mut self) -> Result<Vec<u8>> {
        ServerAssociation::receive_dataset(self)
    }
}
