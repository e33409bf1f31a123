//! Encoding PDUs and their variable items to a byte stream (§4.3.1, §6): the
//! write-side mirror of [`reader`](super::reader).
//!
//! Every chunk that is preceded by its own length field is built into a
//! scratch buffer first so the length can be measured before it is written,
//! mirroring how the reader frames each item by its declared length.

use std::io::Write;

use byteordered::byteorder::{BigEndian, WriteBytesExt};
use snafu::ResultExt;

use super::*;
use crate::error::{InvalidTextSnafu, WriteFieldSnafu};
use crate::error::PduError as Error;

pub type Result<T> = std::result::Result<T, Error>;

fn ascii_bytes(field: &'static str, text: &str) -> Result<Vec<u8>> {
    snafu::ensure!(text.is_ascii(), InvalidTextSnafu { field });
    Ok(text.as_bytes().to_vec())
}

fn fixed_ae_title(field: &'static str, text: &str) -> Result<[u8; 16]> {
    let bytes = ascii_bytes(field, text)?;
    snafu::ensure!(bytes.len() <= 16, InvalidTextSnafu { field });
    let mut out = [b' '; 16];
    out[..bytes.len()].copy_from_slice(&bytes);
    Ok(out)
}

/// Build one sub-item's body, then write it preceded by a 1-byte item type,
/// a reserved byte, and a 2-byte length.
fn write_item<W: Write>(out: &mut W, item_type: u8, body: &[u8]) -> Result<()> {
    out.write_u8(item_type).context(WriteFieldSnafu { field: "Item-type" })?;
    out.write_u8(0).context(WriteFieldSnafu { field: "reserved" })?;
    out.write_u16::<BigEndian>(body.len() as u16)
        .context(WriteFieldSnafu { field: "Item-length" })?;
    out.write_all(body).context(WriteFieldSnafu { field: "item body" })?;
    Ok(())
}

/// Write a whole PDU to `out`, framed with its 1-byte type, reserved byte,
/// and 4-byte length.
pub fn write_pdu<W: Write>(out: &mut W, pdu: &Pdu) -> Result<()> {
    let mut body = Vec::new();
    let pdu_type = match pdu {
        Pdu::AssociationRQ(rq) => {
            write_association_rq(&mut body, rq)?;
            0x01
        }
        Pdu::AssociationAC(ac) => {
            write_association_ac(&mut body, ac)?;
            0x02
        }
        Pdu::AssociationRJ(rj) => {
            write_association_rj(&mut body, rj)?;
            0x03
        }
        Pdu::PData { data } => {
            write_p_data(&mut body, data)?;
            0x04
        }
        Pdu::ReleaseRQ => {
            body.extend_from_slice(&[0; 4]);
            0x05
        }
        Pdu::ReleaseRP => {
            body.extend_from_slice(&[0; 4]);
            0x06
        }
        Pdu::AbortRQ { source } => {
            write_abort(&mut body, *source)?;
            0x07
        }
        Pdu::Unknown { pdu_type, data } => {
            body.extend_from_slice(data);
            *pdu_type
        }
    };

    out.write_u8(pdu_type).context(WriteFieldSnafu { field: "PDU-type" })?;
    out.write_u8(0).context(WriteFieldSnafu { field: "reserved" })?;
    out.write_u32::<BigEndian>(body.len() as u32)
        .context(WriteFieldSnafu { field: "PDU-length" })?;
    out.write_all(&body).context(WriteFieldSnafu { field: "PDU body" })?;
    Ok(())
}

fn write_association_rq<W: Write>(out: &mut W, rq: &AssociationRQ) -> Result<()> {
    out.write_u16::<BigEndian>(rq.protocol_version)
        .context(WriteFieldSnafu { field: "Protocol-version" })?;
    out.write_u16::<BigEndian>(0)
        .context(WriteFieldSnafu { field: "reserved" })?;
    out.write_all(&fixed_ae_title("Called-AE-title", &rq.called_ae_title)?)
        .context(WriteFieldSnafu { field: "Called-AE-title" })?;
    out.write_all(&fixed_ae_title("Calling-AE-title", &rq.calling_ae_title)?)
        .context(WriteFieldSnafu { field: "Calling-AE-title" })?;
    out.write_all(&[0; 32]).context(WriteFieldSnafu { field: "reserved" })?;

    write_item(out, 0x10, &ascii_bytes("Application-context-name", &rq.application_context_name)?)?;
    for pc in &rq.presentation_contexts {
        write_presentation_context_proposed(out, pc)?;
    }
    write_user_variables(out, &rq.user_variables)?;
    Ok(())
}

fn write_association_ac<W: Write>(out: &mut W, ac: &AssociationAC) -> Result<()> {
    out.write_u16::<BigEndian>(ac.protocol_version)
        .context(WriteFieldSnafu { field: "Protocol-version" })?;
    out.write_u16::<BigEndian>(0)
        .context(WriteFieldSnafu { field: "reserved" })?;
    out.write_all(&fixed_ae_title("Called-AE-title", &ac.called_ae_title)?)
        .context(WriteFieldSnafu { field: "Called-AE-title" })?;
    out.write_all(&fixed_ae_title("Calling-AE-title", &ac.calling_ae_title)?)
        .context(WriteFieldSnafu { field: "Calling-AE-title" })?;
    out.write_all(&[0; 32]).context(WriteFieldSnafu { field: "reserved" })?;

    write_item(out, 0x10, &ascii_bytes("Application-context-name", &ac.application_context_name)?)?;
    for pc in &ac.presentation_contexts {
        write_presentation_context_result(out, pc)?;
    }
    write_user_variables(out, &ac.user_variables)?;
    Ok(())
}

fn write_association_rj<W: Write>(out: &mut W, rj: &AssociationRJ) -> Result<()> {
    out.write_u8(0).context(WriteFieldSnafu { field: "reserved" })?;
    out.write_u8(match rj.result {
        AssociationRJResult::Permanent => 1,
        AssociationRJResult::Transient => 2,
    })
    .context(WriteFieldSnafu { field: "Result" })?;
    let (source, reason) = rj.source.to_wire();
    out.write_u8(source).context(WriteFieldSnafu { field: "Source" })?;
    out.write_u8(reason).context(WriteFieldSnafu { field: "Reason/Diag" })?;
    Ok(())
}

fn write_p_data<W: Write>(out: &mut W, values: &[PDataValue]) -> Result<()> {
    for value in values {
        let mut item_body = Vec::with_capacity(2 + value.data.len());
        item_body.push(value.presentation_context_id);
        let mut header = 0u8;
        if let PDataValueType::Command = value.value_type {
            header |= 0x01;
        }
        if value.is_last {
            header |= 0x02;
        }
        item_body.push(header);
        item_body.extend_from_slice(&value.data);

        out.write_u32::<BigEndian>(item_body.len() as u32)
            .context(WriteFieldSnafu { field: "Item-length" })?;
        out.write_all(&item_body)
            .context(WriteFieldSnafu { field: "Presentation-data-value" })?;
    }
    Ok(())
}

fn write_abort<W: Write>(out: &mut W, source: AbortRQSource) -> Result<()> {
    out.write_all(&[0, 0]).context(WriteFieldSnafu { field: "reserved" })?;
    let (s, r) = source.to_wire();
    out.write_u8(s).context(WriteFieldSnafu { field: "Source" })?;
    out.write_u8(r).context(WriteFieldSnafu { field: "Reason/Diag" })?;
    Ok(())
}

fn write_presentation_context_proposed<W: Write>(
    out: &mut W,
    pc: &PresentationContextProposed,
) -> Result<()> {
    let mut body = Vec::new();
    body.write_u8(pc.id).context(WriteFieldSnafu { field: "Presentation-context-ID" })?;
    body.extend_from_slice(&[0; 3]);

    let abstract_item = {
        let mut v = Vec::new();
        write_item(&mut v, 0x30, &ascii_bytes("Abstract-syntax-name", &pc.abstract_syntax)?)?;
        v
    };
    body.extend_from_slice(&abstract_item);
    for ts in &pc.transfer_syntaxes {
        let mut v = Vec::new();
        write_item(&mut v, 0x40, &ascii_bytes("Transfer-syntax-name", ts)?)?;
        body.extend_from_slice(&v);
    }
    write_item(out, 0x20, &body)
}

fn write_presentation_context_result<W: Write>(
    out: &mut W,
    pc: &PresentationContextResult,
) -> Result<()> {
    let mut body = Vec::new();
    body.write_u8(pc.id).context(WriteFieldSnafu { field: "Presentation-context-ID" })?;
    body.push(0);
    body.push(pc.reason.to_wire());
    body.push(0);

    let mut ts_item = Vec::new();
    write_item(&mut ts_item, 0x40, &ascii_bytes("Transfer-syntax-name", &pc.transfer_syntax)?)?;
    body.extend_from_slice(&ts_item);
    write_item(out, 0x21, &body)
}

fn write_user_variables<W: Write>(out: &mut W, items: &[UserVariableItem]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut body = Vec::new();
    for item in items {
        match item {
            UserVariableItem::MaxLength(len) => {
                let mut v = Vec::new();
                v.write_u32::<BigEndian>(*len).context(WriteFieldSnafu { field: "Maximum-length-received" })?;
                write_item(&mut body, 0x51, &v)?;
            }
            UserVariableItem::ImplementationClassUid(uid) => {
                write_item(&mut body, 0x52, &ascii_bytes("Implementation-class-uid", uid)?)?;
            }
            UserVariableItem::ImplementationVersionName(name) => {
                write_item(&mut body, 0x55, &ascii_bytes("Implementation-version-name", name)?)?;
            }
            UserVariableItem::Unknown(item_type, data) => {
                write_item(&mut body, *item_type, data)?;
            }
        }
    }
    write_item(out, 0x50, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_ae_title_to_16_bytes() {
        let title = fixed_ae_title("Called-AE-title", "SCP").unwrap();
        assert_eq!(&title, b"SCP             ");
    }

    #[test]
    fn writes_release_rq_with_zeroed_body() {
        let mut out = Vec::new();
        write_pdu(&mut out, &Pdu::ReleaseRQ).unwrap();
        assert_eq!(out, vec![0x05, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00]);
    }
}
