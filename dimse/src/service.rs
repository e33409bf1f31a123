//! The service loop that ties the command layer to an established
//! [`Association`] (§4.4): per-association state (presentation-context-id
//! to transfer-syntax map, monotonic request message-ids), inbound dispatch
//! to the [`HandlerRegistry`], and response emission.
//!
//! This is the only module in the crate that talks to `dicom-ul` directly;
//! [`command`], [`message`], [`status`] and [`registry`] know nothing about
//! the transport or the association runtime.

use std::collections::HashMap;

use dicom_core::dataset::InMemDataSet;
use dicom_encoding::transfer_syntax::TransferSyntax;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use dicom_ul::association::Association;

use crate::command::{Command, CommandField};
use crate::error::{NoResponseFieldSnafu, Result, UnknownPresentationContextSnafu, UnsupportedTransferSyntaxSnafu};
use crate::message::{decode_command, decode_dataset, encode_command, encode_dataset};
use crate::registry::HandlerRegistry;
use crate::status::Status;
use snafu::OptionExt;

/// Per-association DIMSE state layered atop an established [`Association`]:
/// the presentation-context-id to transfer-syntax map negotiation left
/// behind, and the monotonic counter this node's own requests draw message
/// ids from (§4.4 "message-id correlation").
pub struct DimseService<'a, A: Association> {
    association: &'a mut A,
    transfer_syntaxes: HashMap<u8, &'static TransferSyntax>,
    next_message_id: u16,
}

impl<'a, A: Association> std::fmt::Debug for DimseService<'a, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimseService")
            .field("presentation_contexts", &self.transfer_syntaxes.keys().collect::<Vec<_>>())
            .field("next_message_id", &self.next_message_id)
            .finish()
    }
}

impl<'a, A: Association> DimseService<'a, A> {
    /// Build a service atop an already-negotiated association, resolving
    /// each accepted presentation context's transfer syntax UID against the
    /// built-in registry.
    pub fn new(association: &'a mut A) -> Result<Self> {
        let registry = TransferSyntaxRegistry;
        let mut transfer_syntaxes = HashMap::new();
        for pc in association.presentation_contexts() {
            let ts = registry
                .get(&pc.transfer_syntax_uid)
                .context(UnsupportedTransferSyntaxSnafu {
                    uid: pc.transfer_syntax_uid.clone(),
                })?;
            transfer_syntaxes.insert(pc.id, ts);
        }
        Ok(DimseService {
            association,
            transfer_syntaxes,
            next_message_id: 1,
        })
    }

    fn transfer_syntax(&self, id: u8) -> Result<&'static TransferSyntax> {
        self.transfer_syntaxes
            .get(&id)
            .copied()
            .context(UnknownPresentationContextSnafu { id })
    }

    /// Assign the next monotonic request message id (§4.4).
    fn assign_message_id(&mut self) -> u16 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1).max(1);
        id
    }

    /// Send a request command (assigning it a fresh message id) plus an
    /// optional dataset, and block for the matching response, reading
    /// further dataset fragments the caller asks for via the returned
    /// dataset decode.
    ///
    /// `command_field`/`affected_sop_class_uid` identify the operation;
    /// `dataset` is encoded under the presentation context's negotiated
    /// transfer syntax before being handed to the Upper Layer.
    pub fn send_request(
        &mut self,
        presentation_context_id: u8,
        command_field: CommandField,
        affected_sop_class_uid: impl Into<String>,
        dataset: Option<&InMemDataSet>,
    ) -> Result<(Command, Option<InMemDataSet>)> {
        let message_id = self.assign_message_id();
        let mut command = Command::request(
            command_field,
            affected_sop_class_uid,
            message_id,
            dataset.is_some(),
        );
        let dataset_bytes = match dataset {
            Some(ds) => {
                let ts = self.transfer_syntax(presentation_context_id)?;
                Some(encode_dataset(ds, ts, presentation_context_id)?)
            }
            None => None,
        };
        command.data_set_present = dataset_bytes.is_some();

        self.association.send_message(
            presentation_context_id,
            &encode_command(&command),
            dataset_bytes.as_deref(),
        )?;

        self.receive_response(presentation_context_id)
    }

    /// Block for the next response on `presentation_context_id`, decoding
    /// its dataset (if any) under the negotiated transfer syntax.
    fn receive_response(&mut self, presentation_context_id: u8) -> Result<(Command, Option<InMemDataSet>)> {
        let (pc_id, command_bytes) = self.association.receive_command()?;
        if pc_id != presentation_context_id {
            return UnknownPresentationContextSnafu { id: pc_id }.fail();
        }
        let command = decode_command(&command_bytes)?;
        let dataset = if command.data_set_present {
            let ts = self.transfer_syntax(pc_id)?;
            let bytes = self.association.receive_dataset()?;
            Some(decode_dataset(&bytes, ts, pc_id)?)
        } else {
            None
        };
        Ok((command, dataset))
    }

    /// Receive and dispatch exactly one inbound request to `registry`
    /// (§4.4's full inbound cycle): decode the command set (always
    /// implicit-LE), decode its dataset if present under the negotiated
    /// transfer syntax, dispatch to the handler registered for the
    /// affected SOP class, then compose and send the response the handler
    /// returned.
    ///
    /// Returns the request command that was served, for logging/auditing
    /// by the caller.
    pub fn serve_one(&mut self, registry: &mut HandlerRegistry) -> Result<Command> {
        let (pc_id, command_bytes) = self.association.receive_command()?;
        let request = decode_command(&command_bytes)?;

        let request_dataset = if request.data_set_present {
            let ts = self.transfer_syntax(pc_id)?;
            let bytes = self.association.receive_dataset()?;
            Some(decode_dataset(&bytes, ts, pc_id)?)
        } else {
            None
        };

        let sop_class_uid = request.affected_sop_class_uid.clone().unwrap_or_default();
        let (status, response_dataset) = match registry.dispatch(&sop_class_uid, &request, request_dataset) {
            Ok(outcome) => outcome,
            Err(_) => (
                Status::Failure(Status::PROCESSING_FAILURE),
                None,
            ),
        };

        let response_field = request
            .command_field
            .and_then(CommandField::response_field)
            .context(NoResponseFieldSnafu)?;

        let mut response = Command::response_to(&request, response_field, status, response_dataset.is_some());
        if let Status::Failure(_) = status {
            response.error_comment = Some("processing failure".to_string());
        }

        let response_dataset_bytes = match &response_dataset {
            Some(ds) => {
                let ts = self.transfer_syntax(pc_id)?;
                Some(encode_dataset(ds, ts, pc_id)?)
            }
            None => None,
        };

        self.association.send_message(
            pc_id,
            &encode_command(&response),
            response_dataset_bytes.as_deref(),
        )?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandField;
    use dicom_ul::association::NegotiatedContext;
    use dicom_ul::error::Result as UlResult;
    use std::collections::VecDeque;

    /// An in-memory stand-in for an [`Association`], driving a fixed script
    /// of command/dataset byte strings without any real transport.
    struct FakeAssociation {
        contexts: Vec<NegotiatedContext>,
        peer_max_pdu: u32,
        inbound: VecDeque<(u8, Vec<u8>)>,
        inbound_datasets: VecDeque<Vec<u8>>,
        sent: Vec<(u8, Vec<u8>, Option<Vec<u8>>)>,
    }

    impl Association for FakeAssociation {
        fn presentation_contexts(&self) -> &[NegotiatedContext] {
            &self.contexts
        }

        fn peer_max_pdu_length(&self) -> u32 {
            self.peer_max_pdu
        }

        fn send_message(&mut self, presentation_context_id: u8, command: &[u8], dataset: Option<&[u8]>) -> UlResult<()> {
            self.sent.push((presentation_context_id, command.to_vec(), dataset.map(|d| d.to_vec())));
            Ok(())
        }

        fn receive_command(&mut self) -> UlResult<(u8, Vec<u8>)> {
            Ok(self.inbound.pop_front().expect("test provided a command"))
        }

        fn receive_dataset(&mut self) -> UlResult<Vec<u8>> {
            Ok(self.inbound_datasets.pop_front().expect("test provided a dataset"))
        }
    }

    fn echo_context() -> NegotiatedContext {
        NegotiatedContext {
            id: 1,
            abstract_syntax_uid: dicom_dictionary_std::sop_uids::VERIFICATION.to_string(),
            transfer_syntax_uid: "1.2.840.10008.1.2".to_string(),
        }
    }

    #[test]
    fn serve_one_dispatches_and_responds() {
        let rq = Command::c_echo_rq(5);
        let command_bytes = encode_command(&rq);

        let mut association = FakeAssociation {
            contexts: vec![echo_context()],
            peer_max_pdu: 16384,
            inbound: VecDeque::from([(1, command_bytes)]),
            inbound_datasets: VecDeque::new(),
            sent: Vec::new(),
        };

        let mut service = DimseService::new(&mut association).unwrap();
        let mut registry = HandlerRegistry::new();
        registry.register(
            dicom_dictionary_std::sop_uids::VERIFICATION,
            |_cmd: &Command, _ds: Option<InMemDataSet>| (Status::Success, None),
        );

        let served = service.serve_one(&mut registry).unwrap();
        assert_eq!(served.command_field, Some(CommandField::CEchoRq));

        assert_eq!(association.sent.len(), 1);
        let (pc_id, response_bytes, dataset) = &association.sent[0];
        assert_eq!(*pc_id, 1);
        assert!(dataset.is_none());
        let response = decode_command(response_bytes).unwrap();
        assert_eq!(response.command_field, Some(CommandField::CEchoRsp));
        assert_eq!(response.message_id_being_responded_to, Some(5));
        assert_eq!(response.status, Some(Status::Success));
    }

    #[test]
    fn serve_one_reports_failure_for_unregistered_sop_class() {
        let rq = Command::request(CommandField::CStoreRq, "1.2.840.10008.5.1.4.1.1.7", 3, false);
        let command_bytes = encode_command(&rq);

        let mut association = FakeAssociation {
            contexts: vec![NegotiatedContext {
                id: 1,
                abstract_syntax_uid: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                transfer_syntax_uid: "1.2.840.10008.1.2".to_string(),
            }],
            peer_max_pdu: 16384,
            inbound: VecDeque::from([(1, command_bytes)]),
            inbound_datasets: VecDeque::new(),
            sent: Vec::new(),
        };

        let mut service = DimseService::new(&mut association).unwrap();
        let mut registry = HandlerRegistry::new();

        service.serve_one(&mut registry).unwrap();
        let (_, response_bytes, _) = &association.sent[0];
        let response = decode_command(response_bytes).unwrap();
        assert_eq!(response.status, Some(Status::Failure(Status::PROCESSING_FAILURE)));
    }
}
