//! The association runtime: wires the pure state machine
//! ([`crate::statemachine`]) to a concrete transport, maintains the write
//! queue (§4.3.4), and drives the ARTIM timer (§4.3.3).
//!
//! This module is split the way the state machine separates local
//! primitives from peer PDUs: [`client`] drives the requestor path
//! (`A_ASSOCIATE_RQ` onward), [`server`] drives the acceptor path
//! (`TRANS_CONN_INDIC` onward), and both funnel through the shared
//! [`pdata`] fragmentation/reassembly helpers once `Sta6` is reached.

pub mod client;
pub mod pdata;
pub mod server;

use std::collections::VecDeque;

use crate::pdu::{AbortRQSource, Pdu};
use crate::statemachine::{self, Action, Event, Role, State};
use crate::timer::ArtimTimer;

/// The data-transfer surface common to both ends of an established
/// association (`Sta6`), once negotiation is done: [`client::ClientAssociation`]
/// and [`server::ServerAssociation`] both implement it, so a layer above
/// (such as a DIMSE command dispatcher) can be generic over which side of
/// the association it is driving.
pub trait Association {
    /// The presentation contexts negotiated for this association.
    fn presentation_contexts(&self) -> &[NegotiatedContext];

    /// The maximum PDU length the peer advertised.
    fn peer_max_pdu_length(&self) -> u32;

    /// Send a DIMSE message (command set plus optional dataset) on the
    /// given presentation context, fragmenting per §4.3.5.
    fn send_message(
        &mut self,
        presentation_context_id: u8,
        command: &[u8],
        dataset: Option<&[u8]>,
    ) -> crate::error::Result<()>;

    /// Receive the next command set, returning its presentation context ID
    /// alongside the concatenated bytes.
    fn receive_command(&mut self) -> crate::error::Result<(u8, Vec<u8>)>;

    /// Receive the dataset that follows a command set just received via
    /// [`Self::receive_command`]. Only valid when that command indicated a
    /// dataset is present.
    fn receive_dataset(&mut self) -> crate::error::Result<Vec<u8>>;
}

/// One presentation context this association negotiated successfully: an
/// accepted `(abstract syntax, transfer syntax)` pairing under a
/// particular presentation-context ID (§4.3.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedContext {
    pub id: u8,
    pub abstract_syntax_uid: String,
    pub transfer_syntax_uid: String,
}

/// The write queue plus the bookkeeping the `AA-*`/`AR-*` actions need
/// (§4.3.4): a FIFO of outbound PDUs, with abort insertions going to the
/// front exactly once per trigger.
#[derive(Debug, Default)]
pub(crate) struct WriteQueue {
    queue: VecDeque<Pdu>,
}

impl WriteQueue {
    fn push_back(&mut self, pdu: Pdu) {
        self.queue.push_back(pdu);
    }

    fn push_front(&mut self, pdu: Pdu) {
        self.queue.push_front(pdu);
    }

    fn pop_front(&mut self) -> Option<Pdu> {
        self.queue.pop_front()
    }

    /// Discard every pending write (used when a `close` request drains the
    /// queue, §5 "Cancellation").
    fn drain(&mut self) {
        self.queue.clear();
    }
}

/// Shared state-machine bookkeeping used by both [`client::ClientAssociation`]
/// and [`server::ServerAssociation`]: the current `Sta1..Sta13` state, the
/// write queue, and the ARTIM timer. Driving `event` through this runs the
/// pure transition and carries out every resulting [`Action`] against the
/// fields here; the only action this type cannot itself perform is writing
/// to the transport (`SendAbort` queues a PDU; flushing the queue is left
/// to the caller, which owns the transport).
#[derive(Debug)]
pub(crate) struct Runtime {
    state: State,
    role: Role,
    artim: ArtimTimer,
    write_queue: WriteQueue,
    ignore_next_pdu: bool,
}

impl Runtime {
    fn new(role: Role, artim_timeout: std::time::Duration) -> Self {
        Runtime {
            state: State::Sta1,
            role,
            artim: ArtimTimer::new(artim_timeout),
            write_queue: WriteQueue::default(),
            ignore_next_pdu: false,
        }
    }

    fn state(&self) -> State {
        self.state
    }

    /// Drive `event` through the pure transition function and apply the
    /// resulting actions against this runtime's own fields. PDU actions
    /// (`SendAbort`) enqueue `abort_pdu` rather than writing anything,
    /// since the runtime does not own the transport.
    fn apply(&mut self, event: Event, abort_pdu: impl FnOnce() -> Pdu) -> statemachine::Result<()> {
        let (next, actions) = statemachine::transition(self.state, event, self.role)?;
        self.state = next;
        let mut abort_pdu = Some(abort_pdu);
        for action in actions {
            match action {
                Action::SendAbort => {
                    let pdu = (abort_pdu.take().expect("at most one SendAbort per transition"))();
                    self.write_queue.push_front(pdu);
                }
                Action::StartArtim => self.artim.start(),
                Action::StopArtim => self.artim.stop(),
                Action::CloseConnection => {}
                Action::IgnoreNextPdu => self.ignore_next_pdu = true,
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, pdu: Pdu) {
        self.write_queue.push_back(pdu);
    }

    fn next_to_write(&mut self) -> Option<Pdu> {
        self.write_queue.pop_front()
    }
}

/// Build the abort PDU this node sends for an internally detected protocol
/// violation (`AA-8`, unexpected or malformed PDU): service-provider
/// sourced, reason "unexpected PDU" unless the caller says otherwise.
pub(crate) fn protocol_abort(reason: crate::pdu::AbortRQServiceProviderReason) -> Pdu {
    Pdu::AbortRQ {
        source: AbortRQSource::ServiceProvider(reason),
    }
}

/// The abort PDU used whenever a well-formed but state-machine-illegal PDU
/// arrives (`AA-8`'s default reason).
pub(crate) fn unexpected_pdu_abort() -> Pdu {
    protocol_abort(crate::pdu::AbortRQServiceProviderReason::UnexpectedPdu)
}

/// The event a just-received PDU feeds into the state machine (the
/// `RECV_*`/`UNRECOG_PDU` half of the event set, §4.3.2).
pub(crate) fn event_for_pdu(pdu: &Pdu) -> Event {
    match pdu {
        Pdu::AssociationRQ(_) => Event::RecvAssociateRequest,
        Pdu::AssociationAC(_) => Event::RecvAssociateAccept,
        Pdu::AssociationRJ(_) => Event::RecvAssociateReject,
        Pdu::PData { .. } => Event::RecvPData,
        Pdu::ReleaseRQ => Event::RecvReleaseRequest,
        Pdu::ReleaseRP => Event::RecvReleaseResponse,
        Pdu::AbortRQ { .. } => Event::RecvAbort,
        Pdu::Unknown { .. } => Event::UnrecognizedPdu,
    }
}
