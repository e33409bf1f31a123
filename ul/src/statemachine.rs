//! The association state machine (§4.3.2, DICOM PS3.8 table 9-10): a pure
//! `(State, Event) -> (State, Vec<Action>)` function, kept free of I/O so it
//! can be driven by any transport and unit-tested without a socket.
//!
//! State and event names follow the standard's own `Sta1`..`Sta13` and the
//! action names follow its `AE-*`/`AA-*`/`AR-*`/`DT-*` numbering, so that a
//! reader cross-referencing the standard's table 9-10 can match names
//! directly.

/// One of the 13 states an association can be in.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum State {
    /// Idle.
    Sta1,
    /// Awaiting local transport connection to open (requestor).
    Sta2,
    /// Awaiting local A-ASSOCIATE response primitive (acceptor).
    Sta3,
    /// Awaiting transport connection opening to complete (requestor).
    Sta4,
    /// Awaiting A-ASSOCIATE-AC or -RJ PDU (requestor).
    Sta5,
    /// Association established, data transfer ready.
    Sta6,
    /// Awaiting A-RELEASE-RP PDU (release requestor).
    Sta7,
    /// Awaiting local A-RELEASE response primitive (release acceptor).
    Sta8,
    /// Release collision: requestor, awaiting local response.
    Sta9,
    /// Release collision: acceptor, awaiting A-RELEASE-RP PDU.
    Sta10,
    /// Release collision: requestor, awaiting A-RELEASE-RP PDU.
    Sta11,
    /// Release collision: acceptor, awaiting local response.
    Sta12,
    /// Awaiting transport connection close.
    Sta13,
}

/// Which end of the association this node is playing, needed to resolve
/// the `AR-8` fork (release collision resolves differently for the
/// requestor than for the acceptor).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Role {
    Requestor,
    Acceptor,
}

/// An event driving the state machine: either a local primitive issued by
/// this node, or a PDU/transport condition observed from the outside.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Event {
    AAssociateRequest,
    TransportConnectConfirm,
    RecvAssociateAccept,
    RecvAssociateReject,
    TransportConnectIndication,
    RecvAssociateRequest,
    AAssociateAccept,
    AAssociateReject,
    PDataRequest,
    RecvPData,
    AReleaseRequest,
    RecvReleaseRequest,
    RecvReleaseResponse,
    AReleaseResponse,
    AAbortRequest,
    RecvAbort,
    TransportConnectionClosed,
    ArtimExpired,
    UnrecognizedPdu,
}

/// A side effect the caller must carry out after a transition. The state
/// machine itself is pure; it only describes what should happen.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Action {
    /// Send an A-ABORT PDU.
    SendAbort,
    /// Start the ARTIM timer (§4.3.4).
    StartArtim,
    /// Stop the ARTIM timer.
    StopArtim,
    /// Close the transport connection.
    CloseConnection,
    /// Silently discard the next PDU received on this connection (the peer
    /// is expected to send one final, now-irrelevant PDU before closing).
    IgnoreNextPdu,
}

/// The event was not valid for the current state (table 9-10 has no entry
/// for this `(state, event)` pair); this is itself a protocol error the
/// caller should usually turn into an `AA-1`/`AA-8`-style abort.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct InvalidTransition;

/// Compute the next state and the actions to carry out for `event` observed
/// in `state`. `role` only matters for the `AR-8` release-collision fork.
pub fn transition(state: State, event: Event, role: Role) -> Result<(State, Vec<Action>), InvalidTransition> {
    use Action::*;
    use Event::*;
    use State::*;

    let (next, actions): (State, Vec<Action>) = match (event, state) {
        // AE-1: issue TRANSPORT CONNECT, next Sta4
        (AAssociateRequest, Sta1) => (Sta4, vec![]),
        // AE-2: send A-ASSOCIATE-RQ PDU, next Sta5
        (TransportConnectConfirm, Sta4) => (Sta5, vec![]),
        // AE-3: issue A-ASSOCIATE confirmation (accept), next Sta6
        (RecvAssociateAccept, Sta5) => (Sta6, vec![]),
        // AE-4: issue A-ASSOCIATE confirmation (reject), next Sta1
        (RecvAssociateReject, Sta5) => (Sta1, vec![CloseConnection]),
        // AE-5: issue transport connection response, start ARTIM, next Sta2
        (TransportConnectIndication, Sta1) => (Sta2, vec![StartArtim]),
        // AE-6: stop ARTIM, issue A-ASSOCIATE indication, next Sta3
        (RecvAssociateRequest, Sta2) => (Sta3, vec![StopArtim]),
        // AE-7: send A-ASSOCIATE-AC PDU, next Sta6
        (AAssociateAccept, Sta3) => (Sta6, vec![]),
        // AE-8: send A-ASSOCIATE-RJ PDU, start ARTIM, next Sta13
        (AAssociateReject, Sta3) => (Sta13, vec![StartArtim]),

        // DT-1/DT-2: send/recv P-DATA-TF PDU, stay in Sta6
        (PDataRequest, Sta6) => (Sta6, vec![]),
        (RecvPData, Sta6) => (Sta6, vec![]),

        // AR-1: send A-RELEASE-RQ PDU, next Sta7
        (AReleaseRequest, Sta6) => (Sta7, vec![]),
        // AR-2: issue A-RELEASE indication, next Sta8
        (RecvReleaseRequest, Sta6) => (Sta8, vec![]),
        // AR-3: issue A-RELEASE confirmation, close connection, next Sta1
        (RecvReleaseResponse, Sta7) => (Sta1, vec![CloseConnection]),
        (RecvReleaseResponse, Sta11) => (Sta1, vec![CloseConnection]),
        // AR-4: send A-RELEASE-RP PDU, start ARTIM, next Sta13
        (AReleaseResponse, Sta8) => (Sta13, vec![StartArtim]),
        (AReleaseResponse, Sta12) => (Sta13, vec![StartArtim]),
        // AR-5: stop ARTIM, next Sta1
        (TransportConnectionClosed, Sta13) => (Sta1, vec![StopArtim]),
        // AR-6: issue P-DATA indication, next Sta7
        (RecvPData, Sta7) => (Sta7, vec![]),
        // AR-7: send P-DATA-TF PDU, next Sta8
        (PDataRequest, Sta8) => (Sta8, vec![]),
        // AR-8: issue A-RELEASE indication (collision), next Sta9 (requestor) or Sta10 (acceptor)
        (RecvReleaseRequest, Sta7) => (
            if role == Role::Requestor { Sta9 } else { Sta10 },
            vec![],
        ),
        // AR-9: send A-RELEASE-RP PDU (collision), next Sta11
        (AReleaseResponse, Sta9) => (Sta11, vec![]),
        // AR-10: issue A-RELEASE confirmation (collision), next Sta12
        (RecvReleaseResponse, Sta10) => (Sta12, vec![]),

        // AA-1: send A-ABORT PDU, next Sta13
        (RecvAssociateAccept, Sta2) => (Sta13, vec![SendAbort]),
        (RecvAssociateReject, Sta2) => (Sta13, vec![SendAbort]),
        (RecvPData, Sta2) => (Sta13, vec![SendAbort]),
        (RecvReleaseRequest, Sta2) => (Sta13, vec![SendAbort]),
        (RecvReleaseResponse, Sta2) => (Sta13, vec![SendAbort]),
        (UnrecognizedPdu, Sta2) => (Sta13, vec![SendAbort]),
        (AAbortRequest, Sta2) => (Sta13, vec![SendAbort]),

        // AA-2: stop ARTIM, close connection, next Sta1
        (RecvAbort, Sta2) => (Sta1, vec![StopArtim, CloseConnection]),
        (RecvAbort, Sta13) => (Sta1, vec![StopArtim, CloseConnection]),
        (ArtimExpired, Sta2) => (Sta1, vec![StopArtim, CloseConnection]),
        (ArtimExpired, Sta13) => (Sta1, vec![StopArtim, CloseConnection]),

        // AA-3: close connection, next Sta1 (any active state but Sta2/Sta13)
        (RecvAbort, Sta3) | (RecvAbort, Sta4) | (RecvAbort, Sta5) | (RecvAbort, Sta6)
        | (RecvAbort, Sta7) | (RecvAbort, Sta8) | (RecvAbort, Sta9) | (RecvAbort, Sta10)
        | (RecvAbort, Sta11) | (RecvAbort, Sta12) => (Sta1, vec![CloseConnection]),

        // AA-4: stop ARTIM, next Sta1
        (TransportConnectionClosed, Sta3) | (TransportConnectionClosed, Sta4)
        | (TransportConnectionClosed, Sta5) | (TransportConnectionClosed, Sta6)
        | (TransportConnectionClosed, Sta7) | (TransportConnectionClosed, Sta8)
        | (TransportConnectionClosed, Sta9) | (TransportConnectionClosed, Sta10)
        | (TransportConnectionClosed, Sta11) | (TransportConnectionClosed, Sta12) => {
            (Sta1, vec![StopArtim])
        }

        // AA-5: stop ARTIM, next Sta1
        (TransportConnectionClosed, Sta2) => (Sta1, vec![StopArtim]),

        // AA-6: ignore next PDU, close connection, next Sta13
        (RecvAssociateAccept, Sta13) | (RecvAssociateReject, Sta13) | (RecvPData, Sta13)
        | (RecvReleaseRequest, Sta13) | (RecvReleaseResponse, Sta13) | (UnrecognizedPdu, Sta13) => {
            (Sta13, vec![IgnoreNextPdu, CloseConnection])
        }

        // AA-7: send A-ABORT PDU, next Sta13 (local abort, or recv a second
        // request while already aborting)
        (RecvAssociateRequest, Sta13) => (Sta13, vec![SendAbort]),
        (AAbortRequest, Sta3) => (Sta13, vec![SendAbort]),

        // AA-8: send A-ABORT PDU, start ARTIM, next Sta13
        (RecvAssociateAccept, Sta3) | (RecvAssociateAccept, Sta6) | (RecvAssociateAccept, Sta7)
        | (RecvAssociateAccept, Sta8) | (RecvAssociateAccept, Sta9) | (RecvAssociateAccept, Sta10)
        | (RecvAssociateAccept, Sta11) | (RecvAssociateAccept, Sta12) => (Sta13, vec![SendAbort, StartArtim]),
        (RecvAssociateReject, Sta3) | (RecvAssociateReject, Sta6) | (RecvAssociateReject, Sta7)
        | (RecvAssociateReject, Sta8) | (RecvAssociateReject, Sta9) | (RecvAssociateReject, Sta10)
        | (RecvAssociateReject, Sta11) | (RecvAssociateReject, Sta12) => (Sta13, vec![SendAbort, StartArtim]),
        (RecvAssociateRequest, Sta3) | (RecvAssociateRequest, Sta5) | (RecvAssociateRequest, Sta6)
        | (RecvAssociateRequest, Sta7) | (RecvAssociateRequest, Sta8) | (RecvAssociateRequest, Sta9)
        | (RecvAssociateRequest, Sta10) | (RecvAssociateRequest, Sta11) | (RecvAssociateRequest, Sta12) => {
            (Sta13, vec![SendAbort, StartArtim])
        }
        (RecvPData, Sta3) | (RecvPData, Sta5) | (RecvPData, Sta8) | (RecvPData, Sta9)
        | (RecvPData, Sta10) | (RecvPData, Sta11) | (RecvPData, Sta12) => (Sta13, vec![SendAbort, StartArtim]),
        (RecvReleaseRequest, Sta3) | (RecvReleaseRequest, Sta5) | (RecvReleaseRequest, Sta8)
        | (RecvReleaseRequest, Sta9) | (RecvReleaseRequest, Sta10) | (RecvReleaseRequest, Sta11)
        | (RecvReleaseRequest, Sta12) => (Sta13, vec![SendAbort, StartArtim]),
        (RecvReleaseResponse, Sta3) | (RecvReleaseResponse, Sta5) | (RecvReleaseResponse, Sta6)
        | (RecvReleaseResponse, Sta8) | (RecvReleaseResponse, Sta9) | (RecvReleaseResponse, Sta12) => {
            (Sta13, vec![SendAbort, StartArtim])
        }
        (UnrecognizedPdu, Sta3) | (UnrecognizedPdu, Sta5) | (UnrecognizedPdu, Sta6)
        | (UnrecognizedPdu, Sta7) | (UnrecognizedPdu, Sta8) | (UnrecognizedPdu, Sta9)
        | (UnrecognizedPdu, Sta10) | (UnrecognizedPdu, Sta11) | (UnrecognizedPdu, Sta12) => {
            (Sta13, vec![SendAbort, StartArtim])
        }
        (AAbortRequest, Sta4) | (AAbortRequest, Sta5) | (AAbortRequest, Sta6) | (AAbortRequest, Sta7)
        | (AAbortRequest, Sta8) | (AAbortRequest, Sta9) | (AAbortRequest, Sta10)
        | (AAbortRequest, Sta11) | (AAbortRequest, Sta12) => (Sta13, vec![SendAbort]),

        _ => return Err(InvalidTransition),
    };

    Ok((next, actions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requestor_happy_path_reaches_data_transfer() {
        let role = Role::Requestor;
        let (s, _) = transition(State::Sta1, Event::AAssociateRequest, role).unwrap();
        assert_eq!(s, State::Sta4);
        let (s, _) = transition(s, Event::TransportConnectConfirm, role).unwrap();
        assert_eq!(s, State::Sta5);
        let (s, _) = transition(s, Event::RecvAssociateAccept, role).unwrap();
        assert_eq!(s, State::Sta6);
    }

    #[test]
    fn acceptor_happy_path_reaches_data_transfer() {
        let role = Role::Acceptor;
        let (s, actions) = transition(State::Sta1, Event::TransportConnectIndication, role).unwrap();
        assert_eq!(s, State::Sta2);
        assert_eq!(actions, vec![Action::StartArtim]);
        let (s, actions) = transition(s, Event::RecvAssociateRequest, role).unwrap();
        assert_eq!(s, State::Sta3);
        assert_eq!(actions, vec![Action::StopArtim]);
        let (s, _) = transition(s, Event::AAssociateAccept, role).unwrap();
        assert_eq!(s, State::Sta6);
    }

    #[test]
    fn orderly_release_closes_connection() {
        let role = Role::Requestor;
        let (s, _) = transition(State::Sta6, Event::AReleaseRequest, role).unwrap();
        assert_eq!(s, State::Sta7);
        let (s, actions) = transition(s, Event::RecvReleaseResponse, role).unwrap();
        assert_eq!(s, State::Sta1);
        assert_eq!(actions, vec![Action::CloseConnection]);
    }

    #[test]
    fn release_collision_resolves_by_role() {
        let (s, _) = transition(State::Sta7, Event::RecvReleaseRequest, Role::Requestor).unwrap();
        assert_eq!(s, State::Sta9);
        let (s, _) = transition(State::Sta7, Event::RecvReleaseRequest, Role::Acceptor).unwrap();
        assert_eq!(s, State::Sta10);
    }

    #[test]
    fn unexpected_pdu_in_data_transfer_aborts() {
        let (s, actions) =
            transition(State::Sta6, Event::RecvAssociateAccept, Role::Requestor).unwrap();
        assert_eq!(s, State::Sta13);
        assert_eq!(actions, vec![Action::SendAbort, Action::StartArtim]);
    }

    #[test]
    fn undefined_transition_is_rejected() {
        assert_eq!(
            transition(State::Sta1, Event::RecvPData, Role::Requestor),
            Err(InvalidTransition)
        );
    }

    #[test]
    fn artim_expiry_closes_from_either_waiting_state() {
        let (s, actions) = transition(State::Sta2, Event::ArtimExpired, Role::Acceptor).unwrap();
        assert_eq!(s, State::Sta1);
        assert_eq!(actions, vec![Action::StopArtim, Action::CloseConnection]);
        let (s, actions) = transition(State::Sta13, Event::ArtimExpired, Role::Requestor).unwrap();
        assert_eq!(s, State::Sta1);
        assert_eq!(actions, vec![Action::StopArtim, Action::CloseConnection]);
    }
}
