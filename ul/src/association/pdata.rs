//! P-DATA-TF fragmentation and reassembly (§4.3.5).
//!
//! Encoding is a pure function: given a command-set byte string, an
//! optional dataset byte string, a presentation context ID, and the
//! negotiated maximum PDU length, it returns the exact sequence of
//! [`Pdu::PData`] PDUs to write. Decoding is the [`Reassembler`], which
//! pulls PDVs off a transport one P-DATA-TF PDU at a time and hands back
//! one fully reassembled command or dataset byte string at a time — it is
//! the caller's job (the DIMSE layer, which alone knows whether a command
//! carries a following dataset) to decide whether to ask for a dataset
//! after the command completes.

use std::collections::VecDeque;
use std::io::Read;

use crate::error::{Result, UnexpectedPduSnafu};
use crate::pdu::{read_pdu, PDataValue, PDataValueType, Pdu};

/// Bytes of PDU framing overhead per P-DATA-TF PDU carrying exactly one
/// PDV: 6-byte PDU header + 4-byte PDV length + 1-byte presentation
/// context ID + 1-byte message control header (§4.3.5 "fragment budget").
const PDV_FRAGMENT_OVERHEAD: u32 = 12;

/// Split a DIMSE message into the P-DATA-TF PDUs that carry it (§4.3.5
/// encode): the command set as a single, unfragmented PDV (`bit0=1,
/// bit1=1`), followed by the dataset — if any — chunked into
/// `max_pdu_length - 12`-byte PDVs (`bit0=0`), with `bit1` set only on the
/// final one.
///
/// `max_pdu_length` is the *peer's* advertised maximum (the budget this
/// node must respect when writing to them), and must be at least 12 plus
/// one byte; association negotiation guarantees at least 4096 (§6).
pub(crate) fn fragment(
    presentation_context_id: u8,
    command: &[u8],
    dataset: Option<&[u8]>,
    max_pdu_length: u32,
) -> Vec<Pdu> {
    let budget = max_pdu_length.saturating_sub(PDV_FRAGMENT_OVERHEAD).max(1) as usize;

    let mut pdus = Vec::new();

    pdus.push(Pdu::PData {
        data: vec![PDataValue {
            presentation_context_id,
            value_type: PDataValueType::Command,
            is_last: true,
            data: command.to_vec(),
        }],
    });

    if let Some(dataset) = dataset {
        if dataset.is_empty() {
            pdus.push(Pdu::PData {
                data: vec![PDataValue {
                    presentation_context_id,
                    value_type: PDataValueType::Data,
                    is_last: true,
                    data: Vec::new(),
                }],
            });
        } else {
            let mut offset = 0;
            while offset < dataset.len() {
                let end = (offset + budget).min(dataset.len());
                let is_last = end == dataset.len();
                pdus.push(Pdu::PData {
                    data: vec![PDataValue {
                        presentation_context_id,
                        value_type: PDataValueType::Data,
                        is_last,
                        data: dataset[offset..end].to_vec(),
                    }],
                });
                offset = end;
            }
        }
    }

    pdus
}

/// Reassembles one command-set byte string and, on request, one dataset
/// byte string, out of the PDVs carried by a stream of P-DATA-TF PDUs.
///
/// Holds any PDVs read past the end of the fragment the caller asked for
/// (e.g. the first dataset PDV, read while still draining the command
/// stream's PDU) so the next call picks up where this one left off.
#[derive(Debug, Default)]
pub(crate) struct Reassembler {
    pending: VecDeque<PDataValue>,
}

impl Reassembler {
    pub(crate) fn new() -> Self {
        Reassembler::default()
    }

    fn next_pdv<R: Read>(&mut self, transport: &mut R, max_pdu_length: u32) -> Result<PDataValue> {
        if self.pending.is_empty() {
            let pdu = read_pdu(transport, max_pdu_length)?;
            match pdu {
                Pdu::PData { data } => self.pending.extend(data),
                other => {
                    return UnexpectedPduSnafu {
                        pdu_name: other.name(),
                        state: "Sta6",
                    }
                    .fail()
                }
            }
        }
        Ok(self.pending.pop_front().expect("just ensured non-empty"))
    }

    /// Pull PDVs of the given `wanted` type until one arrives with
    /// `is_last`, concatenating their payloads. Only the *next* PDV is
    /// required to match `wanted` — this node only starts collecting a
    /// dataset once the command stream has fully completed, so the first
    /// dataset PDV is always the next one pending.
    fn collect<R: Read>(
        &mut self,
        transport: &mut R,
        max_pdu_length: u32,
        wanted: PDataValueType,
    ) -> Result<(u8, Vec<u8>)> {
        let mut bytes = Vec::new();
        let mut presentation_context_id = None;
        loop {
            let pdv = self.next_pdv(transport, max_pdu_length)?;
            debug_assert_eq!(
                pdv.value_type, wanted,
                "reassembler asked for the wrong PDV stream"
            );
            presentation_context_id.get_or_insert(pdv.presentation_context_id);
            bytes.extend(pdv.data);
            if pdv.is_last {
                break;
            }
        }
        Ok((presentation_context_id.unwrap_or(0), bytes))
    }

    /// Reassemble the next command set, returning its presentation context
    /// ID alongside the concatenated bytes.
    pub(crate) fn receive_command<R: Read>(
        &mut self,
        transport: &mut R,
        max_pdu_length: u32,
    ) -> Result<(u8, Vec<u8>)> {
        self.collect(transport, max_pdu_length, PDataValueType::Command)
    }

    /// Reassemble the dataset that follows the command set just received.
    /// Only valid to call when the command indicated a dataset is present
    /// (`(0000,0800)` != `0x0101`); calling it otherwise consumes the next
    /// message's command PDVs as if they were dataset bytes.
    pub(crate) fn receive_dataset<R: Read>(
        &mut self,
        transport: &mut R,
        max_pdu_length: u32,
    ) -> Result<Vec<u8>> {
        self.collect(transport, max_pdu_length, PDataValueType::Data)
            .map(|(_, bytes)| bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::pdu::write_pdu;

    #[test]
    fn fragments_command_as_single_pdv() {
        let command = vec![0u8; 40];
        let pdus = fragment(1, &command, None, 128);
        assert_eq!(pdus.len(), 1);
        match &pdus[0] {
            Pdu::PData { data } => {
                assert_eq!(data.len(), 1);
                assert_eq!(data[0].value_type, PDataValueType::Command);
                assert!(data[0].is_last);
                assert_eq!(data[0].data.len(), 40);
            }
            _ => panic!("expected PData"),
        }
    }

    #[test]
    fn fragments_dataset_per_scenario_7() {
        // §8 scenario 7: max-PDU=128, 40-byte command, 300-byte dataset.
        let command = vec![0u8; 40];
        let dataset = vec![0u8; 300];
        let pdus = fragment(1, &command, Some(&dataset), 128);

        // one command PDU, then ceil(300/116) = 3 dataset PDUs
        assert_eq!(pdus.len(), 4);
        let sizes: Vec<usize> = pdus[1..]
            .iter()
            .map(|p| match p {
                Pdu::PData { data } => data[0].data.len(),
                _ => panic!("expected PData"),
            })
            .collect();
        assert_eq!(sizes, vec![116, 116, 68]);

        for (i, pdu) in pdus[1..].iter().enumerate() {
            match pdu {
                Pdu::PData { data } => {
                    assert_eq!(data[0].value_type, PDataValueType::Data);
                    assert_eq!(data[0].is_last, i == 2);
                }
                _ => panic!("expected PData"),
            }
        }
    }

    #[test]
    fn reassembles_fragmented_dataset() {
        let command = vec![1u8; 10];
        let dataset = vec![2u8; 50];
        let pdus = fragment(7, &command, Some(&dataset), 32);

        let mut wire = Vec::new();
        for pdu in &pdus {
            write_pdu(&mut wire, pdu).unwrap();
        }

        let mut cursor = Cursor::new(wire);
        let mut reassembler = Reassembler::new();
        let (pc_id, got_command) = reassembler.receive_command(&mut cursor, 32).unwrap();
        assert_eq!(pc_id, 7);
        assert_eq!(got_command, command);

        let got_dataset = reassembler.receive_dataset(&mut cursor, 32).unwrap();
        assert_eq!(got_dataset, dataset);
    }

    #[test]
    fn command_without_dataset_leaves_stream_clean() {
        let command = vec![9u8; 5];
        let pdus = fragment(3, &command, None, 64);
        let mut wire = Vec::new();
        for pdu in &pdus {
            write_pdu(&mut wire, pdu).unwrap();
        }
        let mut cursor = Cursor::new(wire);
        let mut reassembler = Reassembler::new();
        let (_, got) = reassembler.receive_command(&mut cursor, 64).unwrap();
        assert_eq!(got, command);
        assert!(reassembler.pending.is_empty());
    }
}
