//! Wire (de)serialization of a whole DIMSE message: the command set, always
//! implicit-VR little endian, plus an optional dataset under whatever
//! transfer syntax the presentation context negotiated (§4.4).

use dicom_core::dataset::InMemDataSet;
use dicom_dictionary_std::StandardDataDictionary;
use dicom_encoding::transfer_syntax::TransferSyntax;
use dicom_parser::{read_dataset, write_dataset};
use snafu::ResultExt;

use crate::command::Command;
use crate::error::{MalformedCommandSnafu, MalformedDatasetSnafu, Result};

const COMMAND_TS: TransferSyntax = TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN;

/// Encode a command set to its implicit-LE wire bytes.
pub fn encode_command(command: &Command) -> Vec<u8> {
    let dataset = command.to_dataset();
    let mut bytes = Vec::new();
    // The command dataset is built entirely from fixed-shape primitive
    // values this module controls, so encoding cannot fail.
    write_dataset(&dataset, &COMMAND_TS, &mut bytes).expect("command set is always well-formed");
    bytes
}

/// Decode a command set from its implicit-LE wire bytes.
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let dataset = read_dataset(bytes, &COMMAND_TS, &StandardDataDictionary).context(MalformedCommandSnafu)?;
    Command::from_dataset(&dataset)
}

/// Encode a dataset under the presentation context's negotiated transfer
/// syntax.
pub fn encode_dataset(dataset: &InMemDataSet, ts: &TransferSyntax, presentation_context_id: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_dataset(dataset, ts, &mut bytes).context(MalformedDatasetSnafu { presentation_context_id })?;
    Ok(bytes)
}

/// Decode a dataset under the presentation context's negotiated transfer
/// syntax, using the built-in standard dictionary.
pub fn decode_dataset(bytes: &[u8], ts: &TransferSyntax, presentation_context_id: u8) -> Result<InMemDataSet> {
    read_dataset(bytes, ts, &StandardDataDictionary).context(MalformedDatasetSnafu { presentation_context_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandField;
    use crate::status::Status;

    #[test]
    fn echo_command_round_trips() {
        let rq = Command::c_echo_rq(7);
        let bytes = encode_command(&rq);
        let decoded = decode_command(&bytes).unwrap();
        assert_eq!(decoded.command_field, Some(CommandField::CEchoRq));
        assert_eq!(decoded.message_id, Some(7));
        assert!(!decoded.data_set_present);
        assert_eq!(
            decoded.affected_sop_class_uid.as_deref(),
            Some(dicom_dictionary_std::sop_uids::VERIFICATION)
        );
    }

    #[test]
    fn echo_response_round_trips() {
        let rq = Command::c_echo_rq(9);
        let rsp = Command::c_echo_rsp(&rq, Status::Success);
        let bytes = encode_command(&rsp);
        let decoded = decode_command(&bytes).unwrap();
        assert_eq!(decoded.command_field, Some(CommandField::CEchoRsp));
        assert_eq!(decoded.message_id_being_responded_to, Some(9));
        assert_eq!(decoded.status, Some(Status::Success));
    }
}
