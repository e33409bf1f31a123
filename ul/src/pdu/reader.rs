//! Decoding PDUs and their variable items off a byte stream (§4.3.1, §6).
//!
//! Every multi-byte integer on the wire is big-endian; text fields (AE
//! titles, UIDs) are the default ISO-IR 6 repertoire, trimmed of leading and
//! trailing space/NUL padding.

use std::io::{Cursor, ErrorKind, Read};

use byteordered::byteorder::{BigEndian, ReadBytesExt};
use snafu::{ensure, OptionExt, ResultExt};

use super::*;
use crate::error::{
    InvalidAbortSourceOrReasonSnafu, InvalidItemLengthSnafu, InvalidPresentationContextResultReasonSnafu,
    InvalidRejectSourceOrReasonSnafu, InvalidTextSnafu, MissingFieldSnafu, NoPduAvailableSnafu,
    PduTooLargeSnafu, ReadFieldSnafu,
};
use crate::error::PduError as Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The minimum PDU size a conforming peer must accept, per the standard.
pub const MINIMUM_PDU_SIZE: u32 = 4_096;

/// The maximum PDU size a conforming peer must accept, per the standard.
pub const MAXIMUM_PDU_SIZE: u32 = 131_072;

/// A reasonable default for the maximum length this node will accept,
/// advertised in its own `Maximum-length-received` sub-item.
pub const DEFAULT_MAX_PDU: u32 = 16_384;

fn ascii_field(field: &'static str, bytes: &[u8]) -> Result<String> {
    ensure!(bytes.is_ascii(), InvalidTextSnafu { field });
    let text = std::str::from_utf8(bytes).expect("checked ascii above");
    Ok(text.trim_matches(|c| c == ' ' || c == '\0').to_string())
}

fn read_n<R: Read>(reader: &mut R, field: &'static str, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).context(ReadFieldSnafu { field })?;
    Ok(buf)
}

/// Read one whole PDU from `reader`. `max_pdu_length` is this node's own
/// advertised limit; a PDU declaring a larger length is rejected rather than
/// silently truncated or over-allocated from an attacker-controlled length
/// field.
pub fn read_pdu<R: Read>(reader: &mut R, max_pdu_length: u32) -> Result<Pdu> {
    let mut type_byte = [0u8; 1];
    if let Err(e) = reader.read_exact(&mut type_byte) {
        ensure!(e.kind() != ErrorKind::UnexpectedEof, NoPduAvailableSnafu);
        return Err(e).context(ReadFieldSnafu { field: "PDU-type" });
    }
    let pdu_type = type_byte[0];

    reader
        .read_u8()
        .context(ReadFieldSnafu { field: "reserved" })?;

    let pdu_length = reader
        .read_u32::<BigEndian>()
        .context(ReadFieldSnafu { field: "PDU-length" })?;

    ensure!(
        pdu_length <= max_pdu_length.max(MAXIMUM_PDU_SIZE),
        PduTooLargeSnafu {
            pdu_length,
            max_pdu_length
        }
    );

    let body = read_n(reader, "PDU body", pdu_length as usize)?;
    let mut cursor = Cursor::new(body);

    match pdu_type {
        0x01 => read_association_rq(&mut cursor).map(Pdu::AssociationRQ),
        0x02 => read_association_ac(&mut cursor).map(Pdu::AssociationAC),
        0x03 => read_association_rj(&mut cursor).map(Pdu::AssociationRJ),
        0x04 => read_p_data(&mut cursor).map(|data| Pdu::PData { data }),
        0x05 => Ok(Pdu::ReleaseRQ),
        0x06 => Ok(Pdu::ReleaseRP),
        0x07 => read_abort(&mut cursor).map(|source| Pdu::AbortRQ { source }),
        _ => Ok(Pdu::Unknown {
            pdu_type,
            data: cursor.into_inner(),
        }),
    }
}

fn read_association_rq(cursor: &mut Cursor<Vec<u8>>) -> Result<AssociationRQ> {
    let protocol_version = cursor
        .read_u16::<BigEndian>()
        .context(ReadFieldSnafu { field: "Protocol-version" })?;
    cursor
        .read_u16::<BigEndian>()
        .context(ReadFieldSnafu { field: "reserved" })?;

    let called_ae_title = ascii_field("Called-AE-title", &read_n(cursor, "Called-AE-title", 16)?)?;
    let calling_ae_title = ascii_field("Calling-AE-title", &read_n(cursor, "Calling-AE-title", 16)?)?;
    read_n(cursor, "reserved", 32)?;

    let mut application_context_name = None;
    let mut presentation_contexts = Vec::new();
    let mut user_variables = Vec::new();

    while cursor.position() < cursor.get_ref().len() as u64 {
        match read_pdu_variable(cursor)? {
            PduVariableItem::ApplicationContext(v) => application_context_name = Some(v),
            PduVariableItem::PresentationContextProposed(v) => presentation_contexts.push(v),
            PduVariableItem::UserVariables(v) => user_variables = v,
            PduVariableItem::PresentationContextResult(_) | PduVariableItem::Unknown(_) => {}
        }
    }

    Ok(AssociationRQ {
        protocol_version,
        calling_ae_title,
        called_ae_title,
        application_context_name: application_context_name
            .context(MissingFieldSnafu { field: "Application-context-name" })?,
        presentation_contexts,
        user_variables,
    })
}

fn read_association_ac(cursor: &mut Cursor<Vec<u8>>) -> Result<AssociationAC> {
    let protocol_version = cursor
        .read_u16::<BigEndian>()
        .context(ReadFieldSnafu { field: "Protocol-version" })?;
    cursor
        .read_u16::<BigEndian>()
        .context(ReadFieldSnafu { field: "reserved" })?;

    let called_ae_title = ascii_field("Called-AE-title", &read_n(cursor, "Called-AE-title", 16)?)?;
    let calling_ae_title = ascii_field("Calling-AE-title", &read_n(cursor, "Calling-AE-title", 16)?)?;
    read_n(cursor, "reserved", 32)?;

    let mut application_context_name = None;
    let mut presentation_contexts = Vec::new();
    let mut user_variables = Vec::new();

    while cursor.position() < cursor.get_ref().len() as u64 {
        match read_pdu_variable(cursor)? {
            PduVariableItem::ApplicationContext(v) => application_context_name = Some(v),
            PduVariableItem::PresentationContextResult(v) => presentation_contexts.push(v),
            PduVariableItem::UserVariables(v) => user_variables = v,
            PduVariableItem::PresentationContextProposed(_) | PduVariableItem::Unknown(_) => {}
        }
    }

    Ok(AssociationAC {
        protocol_version,
        application_context_name: application_context_name
            .context(MissingFieldSnafu { field: "Application-context-name" })?,
        called_ae_title,
        calling_ae_title,
        presentation_contexts,
        user_variables,
    })
}

fn read_association_rj(cursor: &mut Cursor<Vec<u8>>) -> Result<AssociationRJ> {
    cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "reserved" })?;
    let result = match cursor.read_u8().context(ReadFieldSnafu { field: "Result" })? {
        1 => AssociationRJResult::Permanent,
        2 => AssociationRJResult::Transient,
        _ => return InvalidRejectSourceOrReasonSnafu.fail(),
    };
    let source_byte = cursor.read_u8().context(ReadFieldSnafu { field: "Source" })?;
    let reason_byte = cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "Reason/Diag" })?;
    let source = AssociationRJSource::from_wire(source_byte, reason_byte)
        .context(InvalidRejectSourceOrReasonSnafu)?;

    Ok(AssociationRJ { result, source })
}

fn read_p_data(cursor: &mut Cursor<Vec<u8>>) -> Result<Vec<PDataValue>> {
    let mut values = Vec::new();
    while cursor.position() < cursor.get_ref().len() as u64 {
        let item_length = cursor
            .read_u32::<BigEndian>()
            .context(ReadFieldSnafu { field: "Item-length" })?;
        ensure!(item_length >= 2, InvalidItemLengthSnafu { length: item_length });

        let presentation_context_id = cursor
            .read_u8()
            .context(ReadFieldSnafu { field: "Presentation-context-ID" })?;
        let header = cursor
            .read_u8()
            .context(ReadFieldSnafu { field: "Message-Control-Header" })?;
        let value_type = if header & 0x01 != 0 {
            PDataValueType::Command
        } else {
            PDataValueType::Data
        };
        let is_last = header & 0x02 != 0;
        let data = read_n(cursor, "Presentation-data-value", (item_length - 2) as usize)?;

        values.push(PDataValue {
            presentation_context_id,
            value_type,
            is_last,
            data,
        });
    }
    Ok(values)
}

fn read_abort(cursor: &mut Cursor<Vec<u8>>) -> Result<AbortRQSource> {
    read_n(cursor, "reserved", 2)?;
    let source_byte = cursor.read_u8().context(ReadFieldSnafu { field: "Source" })?;
    let reason_byte = cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "Reason/Diag" })?;
    AbortRQSource::from_wire(source_byte, reason_byte).context(InvalidAbortSourceOrReasonSnafu)
}

fn read_pdu_variable(cursor: &mut Cursor<Vec<u8>>) -> Result<PduVariableItem> {
    let item_type = cursor.read_u8().context(ReadFieldSnafu { field: "Item-type" })?;
    cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "reserved" })?;
    let item_length = cursor
        .read_u16::<BigEndian>()
        .context(ReadFieldSnafu { field: "Item-length" })?;
    let body = read_n(cursor, "item body", item_length as usize)?;
    let mut item_cursor = Cursor::new(body);

    match item_type {
        0x10 => Ok(PduVariableItem::ApplicationContext(ascii_field(
            "Application-context-name",
            item_cursor.get_ref(),
        )?)),
        0x20 => read_presentation_context_proposed(&mut item_cursor)
            .map(PduVariableItem::PresentationContextProposed),
        0x21 => read_presentation_context_result(&mut item_cursor)
            .map(PduVariableItem::PresentationContextResult),
        0x50 => read_user_variables(&mut item_cursor).map(PduVariableItem::UserVariables),
        _ => Ok(PduVariableItem::Unknown(item_type)),
    }
}

fn read_presentation_context_proposed(
    cursor: &mut Cursor<Vec<u8>>,
) -> Result<PresentationContextProposed> {
    let id = cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "Presentation-context-ID" })?;
    read_n(cursor, "reserved", 3)?;

    let mut abstract_syntax = None;
    let mut transfer_syntaxes = Vec::new();

    while cursor.position() < cursor.get_ref().len() as u64 {
        let item_type = cursor.read_u8().context(ReadFieldSnafu { field: "Item-type" })?;
        cursor
            .read_u8()
            .context(ReadFieldSnafu { field: "reserved" })?;
        let item_length = cursor
            .read_u16::<BigEndian>()
            .context(ReadFieldSnafu { field: "Item-length" })?;
        let text = ascii_field(
            "Abstract/Transfer-syntax-name",
            &read_n(cursor, "Abstract/Transfer-syntax-name", item_length as usize)?,
        )?;
        match item_type {
            0x30 => abstract_syntax = Some(text),
            0x40 => transfer_syntaxes.push(text),
            _ => {}
        }
    }

    Ok(PresentationContextProposed {
        id,
        abstract_syntax: abstract_syntax.context(MissingFieldSnafu { field: "Abstract-syntax-name" })?,
        transfer_syntaxes,
    })
}

fn read_presentation_context_result(cursor: &mut Cursor<Vec<u8>>) -> Result<PresentationContextResult> {
    let id = cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "Presentation-context-ID" })?;
    cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "reserved" })?;
    let reason_byte = cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "Result/Reason" })?;
    let reason = PresentationContextResultReason::from_wire(reason_byte)
        .context(InvalidPresentationContextResultReasonSnafu)?;
    cursor
        .read_u8()
        .context(ReadFieldSnafu { field: "reserved" })?;

    let mut transfer_syntax = None;
    while cursor.position() < cursor.get_ref().len() as u64 {
        let item_type = cursor.read_u8().context(ReadFieldSnafu { field: "Item-type" })?;
        cursor
            .read_u8()
            .context(ReadFieldSnafu { field: "reserved" })?;
        let item_length = cursor
            .read_u16::<BigEndian>()
            .context(ReadFieldSnafu { field: "Item-length" })?;
        let text = ascii_field(
            "Transfer-syntax-name",
            &read_n(cursor, "Transfer-syntax-name", item_length as usize)?,
        )?;
        if item_type == 0x40 {
            transfer_syntax = Some(text);
        }
    }

    Ok(PresentationContextResult {
        id,
        reason,
        transfer_syntax: transfer_syntax.context(MissingFieldSnafu { field: "Transfer-syntax-name" })?,
    })
}

fn read_user_variables(cursor: &mut Cursor<Vec<u8>>) -> Result<Vec<UserVariableItem>> {
    let mut items = Vec::new();
    while cursor.position() < cursor.get_ref().len() as u64 {
        let item_type = cursor.read_u8().context(ReadFieldSnafu { field: "Item-type" })?;
        cursor
            .read_u8()
            .context(ReadFieldSnafu { field: "reserved" })?;
        let item_length = cursor
            .read_u16::<BigEndian>()
            .context(ReadFieldSnafu { field: "Item-length" })?;

        match item_type {
            0x51 => {
                let value = cursor
                    .read_u32::<BigEndian>()
                    .context(ReadFieldSnafu { field: "Maximum-length-received" })?;
                items.push(UserVariableItem::MaxLength(value));
            }
            0x52 => {
                let text = ascii_field(
                    "Implementation-class-uid",
                    &read_n(cursor, "Implementation-class-uid", item_length as usize)?,
                )?;
                items.push(UserVariableItem::ImplementationClassUid(text));
            }
            0x55 => {
                let text = ascii_field(
                    "Implementation-version-name",
                    &read_n(cursor, "Implementation-version-name", item_length as usize)?,
                )?;
                items.push(UserVariableItem::ImplementationVersionName(text));
            }
            _ => {
                let data = read_n(cursor, "unknown user item", item_length as usize)?;
                items.push(UserVariableItem::Unknown(item_type, data));
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::writer::write_pdu;

    #[test]
    fn round_trips_association_rq() {
        let pdu = Pdu::AssociationRQ(AssociationRQ {
            protocol_version: 1,
            calling_ae_title: "SCU".to_string(),
            called_ae_title: "SCP".to_string(),
            application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
            presentation_contexts: vec![PresentationContextProposed {
                id: 1,
                abstract_syntax: "1.2.840.10008.1.1".to_string(),
                transfer_syntaxes: vec!["1.2.840.10008.1.2".to_string()],
            }],
            user_variables: vec![UserVariableItem::MaxLength(16_384)],
        });

        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &pdu).unwrap();
        let back = read_pdu(&mut Cursor::new(bytes), MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(back, pdu);
    }

    #[test]
    fn round_trips_release_and_abort() {
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &Pdu::ReleaseRQ).unwrap();
        assert_eq!(read_pdu(&mut Cursor::new(bytes), MAXIMUM_PDU_SIZE).unwrap(), Pdu::ReleaseRQ);

        let abort = Pdu::AbortRQ {
            source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::InvalidPduParameter),
        };
        let mut bytes = Vec::new();
        write_pdu(&mut bytes, &abort).unwrap();
        assert_eq!(read_pdu(&mut Cursor::new(bytes), MAXIMUM_PDU_SIZE).unwrap(), abort);
    }

    #[test]
    fn rejects_oversized_pdu() {
        let mut bytes = vec![0x04, 0x00];
        bytes.extend_from_slice(&(MAXIMUM_PDU_SIZE + 1).to_be_bytes());
        let err = read_pdu(&mut Cursor::new(bytes), MINIMUM_PDU_SIZE).unwrap_err();
        assert!(matches!(err, Error::PduTooLarge { .. }));
    }
}
