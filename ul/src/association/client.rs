//! The requestor (SCU) side of an association: [`ClientAssociationOptions`]
//! proposes presentation contexts and drives the `AE-1..AE-4` transitions
//! to `Sta6`; [`ClientAssociation`] is the resulting live association.

use std::borrow::Cow;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use snafu::ResultExt;

use crate::association::pdata::{fragment, Reassembler};
use crate::association::{event_for_pdu, unexpected_pdu_abort, NegotiatedContext, Runtime};
use crate::error::{IoSnafu, PduSnafu, RejectedSnafu, Result, UnexpectedPduSnafu};
use crate::pdu::{
    reader::DEFAULT_MAX_PDU, write_pdu, AbortRQServiceProviderReason, AssociationRQ, Pdu,
    PresentationContextProposed, UserVariableItem,
};
use crate::statemachine::{Event, Role};
use crate::timer::DEFAULT_TIMEOUT;

/// Builds and establishes a client-side (SCU) association (§4.3.6).
///
/// ```no_run
/// # use dicom_ul::ClientAssociationOptions;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let association = ClientAssociationOptions::new()
///     .calling_ae_title("THIS-SCU")
///     .called_ae_title("ANY-SCP")
///     .with_presentation_context("1.2.840.10008.1.1", vec!["1.2.840.10008.1.2"])
///     .establish("127.0.0.1:104")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientAssociationOptions {
    calling_ae_title: Cow<'static, str>,
    called_ae_title: Cow<'static, str>,
    application_context_name: Cow<'static, str>,
    presentation_contexts: Vec<(Cow<'static, str>, Vec<Cow<'static, str>>)>,
    protocol_version: u16,
    max_pdu_length: u32,
    artim_timeout: Duration,
}

impl Default for ClientAssociationOptions {
    fn default() -> Self {
        ClientAssociationOptions {
            calling_ae_title: "THIS-SCU".into(),
            called_ae_title: "ANY-SCP".into(),
            application_context_name: "1.2.840.10008.3.1.1.1".into(),
            presentation_contexts: Vec::new(),
            protocol_version: 1,
            max_pdu_length: DEFAULT_MAX_PDU,
            artim_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientAssociationOptions {
    /// Start from the default option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calling (this node's) AE title. Default `"THIS-SCU"`.
    pub fn calling_ae_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.calling_ae_title = title.into();
        self
    }

    /// Set the called (peer's) AE title. Default `"ANY-SCP"`.
    pub fn called_ae_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.called_ae_title = title.into();
        self
    }

    /// Propose one presentation context: an abstract syntax UID paired
    /// with the transfer syntax UIDs this node is willing to use for it,
    /// in preference order. IDs are assigned in proposal order (§6: odd,
    /// monotonic).
    pub fn with_presentation_context(
        mut self,
        abstract_syntax_uid: impl Into<Cow<'static, str>>,
        transfer_syntax_uids: Vec<impl Into<Cow<'static, str>>>,
    ) -> Self {
        self.presentation_contexts.push((
            abstract_syntax_uid.into(),
            transfer_syntax_uids.into_iter().map(Into::into).collect(),
        ));
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

    /// Connect to `address` over TCP and negotiate an association.
    pub fn establish<A: ToSocketAddrs>(self, address: A) -> Result<ClientAssociation<TcpStream>> {
        let socket = TcpStream::connect(address).context(IoSnafu)?;
        self.establish_with(socket)
    }

    /// Negotiate an association over an already-connected transport
    /// (allows TLS or any other `Read + Write` stream to be supplied by
    /// the caller, per §1's transport non-goal).
    pub fn establish_with<T: Read + Write>(self, mut transport: T) -> Result<ClientAssociation<T>> {
        let presentation_contexts: Vec<_> = self
            .presentation_contexts
            .iter()
            .enumerate()
            .map(|(i, (abstract_syntax, transfer_syntaxes))| PresentationContextProposed {
                id: (2 * i + 1) as u8,
                abstract_syntax: abstract_syntax.to_string(),
                transfer_syntaxes: transfer_syntaxes.iter().map(|ts| ts.to_string()).collect(),
            })
            .collect();

        let mut runtime = Runtime::new(Role::Requestor, self.artim_timeout);
        // AE-1: this call issues the transport connect; by the time we get
        // here the socket is already open (or `establish` just made it so),
        // so TRANS_CONN_CONF follows immediately.
        runtime.apply(Event::AAssociateRequest, || unreachable!("AE-1 sends no abort"))?;
        runtime.apply(Event::TransportConnectConfirm, || {
            unreachable!("AE-2 sends no abort")
        })?;

        let rq = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: self.protocol_version,
            calling_ae_title: self.calling_ae_title.to_string(),
            called_ae_title: self.called_ae_title.to_string(),
            application_context_name: self.application_context_name.to_string(),
            presentation_contexts: presentation_contexts.clone(),
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
        write_pdu(&mut transport, &rq).context(PduSnafu)?;

        let response = crate::pdu::read_pdu(&mut transport, self.max_pdu_length)?;
        runtime.apply(event_for_pdu(&response), unexpected_pdu_abort)?;

        match response {
            Pdu::AssociationAC(ac) => {
                let peer_max_pdu = ac
                    .user_variables
                    .iter()
                    .find_map(|v| match v {
                        UserVariableItem::MaxLength(n) => Some(*n),
                        _ => None,
                    })
                    .unwrap_or(DEFAULT_MAX_PDU);

                let accepted: Vec<NegotiatedContext> = ac
                    .presentation_contexts
                    .iter()
                    .filter(|pc| pc.reason.is_acceptance())
                    .filter_map(|pc| {
                        presentation_contexts
                            .iter()
                            .find(|p| p.id == pc.id)
                            .map(|p| NegotiatedContext {
                                id: pc.id,
                                abstract_syntax_uid: p.abstract_syntax.clone(),
                                transfer_syntax_uid: pc.transfer_syntax.clone(),
                            })
                    })
                    .collect();

                Ok(ClientAssociation {
                    transport,
                    runtime,
                    presentation_contexts: accepted,
                    max_pdu_length: self.max_pdu_length,
                    peer_max_pdu_length: peer_max_pdu,
                    reassembler: Reassembler::new(),
                })
            }
            Pdu::AssociationRJ(rj) => RejectedSnafu {
                result: rj.result,
                source: rj.source,
            }
            .fail(),
            other => UnexpectedPduSnafu {
                pdu_name: other.name(),
                state: "Sta5",
            }
            .fail(),
        }
    }
}

/// A live association from the requestor's point of view, past
/// negotiation and ready for data transfer (`Sta6`).
#[derive(Debug)]
pub struct ClientAssociation<T> {
    transport: T,
    runtime: Runtime,
    presentation_contexts: Vec<NegotiatedContext>,
    max_pdu_length: u32,
    peer_max_pdu_length: u32,
    reassembler: Reassembler,
}

impl<T: Read + Write> ClientAssociation<T> {
    /// The presentation contexts accepted by the peer.
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

    /// Receive the next command set. Drives `RECV_P_DATA_TF` once for the
    /// call (every PDV consumed keeps the state machine in `Sta6`/`Sta7`
    /// with no side effect, so one representative transition suffices).
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

    /// Gracefully release the association (`AR-1`/`AR-3`).
    pub fn release(mut self) -> Result<()> {
        self.runtime
            .apply(Event::AReleaseRequest, || unreachable!("AR-1 sends no abort"))?;
        write_pdu(&mut self.transport, &Pdu::ReleaseRQ).context(PduSnafu)?;

        let response = crate::pdu::read_pdu(&mut self.transport, self.max_pdu_length)?;
        self.runtime.apply(event_for_pdu(&response), unexpected_pdu_abort)?;
        match response {
            Pdu::ReleaseRP => Ok(()),
            other => UnexpectedPduSnafu {
                pdu_name: other.name(),
                state: "Sta7",
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

impl<T: Read + Write> crate::association::Association for ClientAssociation<T> {
    fn presentation_contexts(&self) -> &[NegotiatedContext] {
        ClientAssociation::presentation_contexts(self)
    }

    fn peer_max_pdu_length(&self) -> u32 {
        ClientAssociation::peer_max_pdu_length(self)
    }

    fn send_message(
        &mut self,
        presentation_context_id: u8,
        command: &[u8],
        dataset: Option<&[u8]>,
    ) -> Result<()> {
        ClientAssociation::send_message(self, presentation_context_id, command, dataset)
    }

    fn receive_command(&mut self) -> Result<(u8, Vec<u8>)> {
        ClientAssociation::receive_command(self)
    }

    fn receive_dataset(&mut self) -> Result<Vec<u8>> {
        ClientAssociation::receive_dataset(self)
    }
}
