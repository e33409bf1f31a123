//! The DIMSE command set (§4.4): the structured view of the elements
//! carried in group `0000`, always encoded implicit-VR little endian
//! regardless of the dataset's negotiated transfer syntax.

use dicom_core::dataset::{DataSetBuilder, InMemDataSet};
use dicom_core::header::DataElement;
use dicom_core::tag::Tag;
use dicom_core::value::PrimitiveValue;
use dicom_core::vr::VR;

use crate::error::{Error, MissingCommandFieldSnafu, Result, UnexpectedCommandFieldShapeSnafu, UnknownCommandFieldSnafu};
use crate::status::Status;
use snafu::OptionExt;

pub const COMMAND_GROUP_LENGTH: Tag = Tag(0x0000, 0x0000);
pub const AFFECTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0002);
pub const REQUESTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0003);
pub const COMMAND_FIELD: Tag = Tag(0x0000, 0x0100);
pub const MESSAGE_ID: Tag = Tag(0x0000, 0x0110);
pub const MESSAGE_ID_BEING_RESPONDED_TO: Tag = Tag(0x0000, 0x0120);
pub const MOVE_DESTINATION: Tag = Tag(0x0000, 0x0600);
pub const PRIORITY: Tag = Tag(0x0000, 0x0700);
pub const COMMAND_DATA_SET_TYPE: Tag = Tag(0x0000, 0x0800);
pub const STATUS: Tag = Tag(0x0000, 0x0900);
pub const ERROR_COMMENT: Tag = Tag(0x0000, 0x0902);
pub const AFFECTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1000);
pub const REQUESTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1001);
pub const MOVE_ORIGINATOR_AE_TITLE: Tag = Tag(0x0000, 0x1030);
pub const MOVE_ORIGINATOR_MESSAGE_ID: Tag = Tag(0x0000, 0x1031);

/// The DIMSE-service-group selector carried in `(0000,0100)` (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandField {
    CStoreRq,
    CStoreRsp,
    CGetRq,
    CGetRsp,
    CFindRq,
    CFindRsp,
    CMoveRq,
    CMoveRsp,
    CEchoRq,
    CEchoRsp,
    CCancelRq,
    NEventReportRq,
    NEventReportRsp,
    NGetRq,
    NGetRsp,
    NSetRq,
    NSetRsp,
    NActionRq,
    NActionRsp,
    NCreateRq,
    NCreateRsp,
    NDeleteRq,
    NDeleteRsp,
}

impl CommandField {
    /// Decode the wire value of `(0000,0100)`.
    pub fn from_code(code: u16) -> Result<Self> {
        Ok(match code {
            0x0001 => CommandField::CStoreRq,
            0x8001 => CommandField::CStoreRsp,
            0x0010 => CommandField::CGetRq,
            0x8010 => CommandField::CGetRsp,
            0x0020 => CommandField::CFindRq,
            0x8020 => CommandField::CFindRsp,
            0x0021 => CommandField::CMoveRq,
            0x8021 => CommandField::CMoveRsp,
            0x0030 => CommandField::CEchoRq,
            0x8030 => CommandField::CEchoRsp,
            0x0FFF => CommandField::CCancelRq,
            0x0100 => CommandField::NEventReportRq,
            0x8100 => CommandField::NEventReportRsp,
            0x0110 => CommandField::NGetRq,
            0x8110 => CommandField::NGetRsp,
            0x0120 => CommandField::NSetRq,
            0x8120 => CommandField::NSetRsp,
            0x0130 => CommandField::NActionRq,
            0x8130 => CommandField::NActionRsp,
            0x0140 => CommandField::NCreateRq,
            0x8140 => CommandField::NCreateRsp,
            0x0150 => CommandField::NDeleteRq,
            0x8150 => CommandField::NDeleteRsp,
            other => return UnknownCommandFieldSnafu { code: other }.fail(),
        })
    }

    /// The wire value of `(0000,0100)`.
    pub fn code(self) -> u16 {
        match self {
            CommandField::CStoreRq => 0x0001,
            CommandField::CStoreRsp => 0x8001,
            CommandField::CGetRq => 0x0010,
            CommandField::CGetRsp => 0x8010,
            CommandField::CFindRq => 0x0020,
            CommandField::CFindRsp => 0x8020,
            CommandField::CMoveRq => 0x0021,
            CommandField::CMoveRsp => 0x8021,
            CommandField::CEchoRq => 0x0030,
            CommandField::CEchoRsp => 0x8030,
            CommandField::CCancelRq => 0x0FFF,
            CommandField::NEventReportRq => 0x0100,
            CommandField::NEventReportRsp => 0x8100,
            CommandField::NGetRq => 0x0110,
            CommandField::NGetRsp => 0x8110,
            CommandField::NSetRq => 0x0120,
            CommandField::NSetRsp => 0x8120,
            CommandField::NActionRq => 0x0130,
            CommandField::NActionRsp => 0x8130,
            CommandField::NCreateRq => 0x0140,
            CommandField::NCreateRsp => 0x8140,
            CommandField::NDeleteRq => 0x0150,
            CommandField::NDeleteRsp => 0x8150,
        }
    }

    /// Whether this command field is a response (high bit of the code set).
    pub fn is_response(self) -> bool {
        self.code() & 0x8000 != 0
    }

    /// The response command field that answers this request field (e.g.
    /// `CEchoRq` -> `CEchoRsp`). `None` for fields that are already
    /// responses, and for `C-CANCEL-RQ` (which has no response).
    pub fn response_field(self) -> Option<CommandField> {
        Some(match self {
            CommandField::CStoreRq => CommandField::CStoreRsp,
            CommandField::CGetRq => CommandField::CGetRsp,
            CommandField::CFindRq => CommandField::CFindRsp,
            CommandField::CMoveRq => CommandField::CMoveRsp,
            CommandField::CEchoRq => CommandField::CEchoRsp,
            CommandField::NEventReportRq => CommandField::NEventReportRsp,
            CommandField::NGetRq => CommandField::NGetRsp,
            CommandField::NSetRq => CommandField::NSetRsp,
            CommandField::NActionRq => CommandField::NActionRsp,
            CommandField::NCreateRq => CommandField::NCreateRsp,
            CommandField::NDeleteRq => CommandField::NDeleteRsp,
            CommandField::CCancelRq
            | CommandField::CStoreRsp
            | CommandField::CGetRsp
            | CommandField::CFindRsp
            | CommandField::CMoveRsp
            | CommandField::CEchoRsp
            | CommandField::NEventReportRsp
            | CommandField::NGetRsp
            | CommandField::NSetRsp
            | CommandField::NActionRsp
            | CommandField::NCreateRsp
            | CommandField::NDeleteRsp => return None,
        })
    }
}

/// The structured view of one command set (§4.4): the subset of group
/// `0000` elements this node reads and writes. Fields not relevant to a
/// given service/direction are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Command {
    pub command_field: Option<CommandField>,
    pub affected_sop_class_uid: Option<String>,
    pub requested_sop_class_uid: Option<String>,
    pub affected_sop_instance_uid: Option<String>,
    pub requested_sop_instance_uid: Option<String>,
    pub message_id: Option<u16>,
    pub message_id_being_responded_to: Option<u16>,
    pub data_set_present: bool,
    pub status: Option<Status>,
    pub priority: Option<u16>,
    pub move_destination: Option<String>,
    pub move_originator_ae_title: Option<String>,
    pub move_originator_message_id: Option<u16>,
    pub error_comment: Option<String>,
}

impl Command {
    /// Start building a request command set for `affected_sop_class_uid`,
    /// assigning it the next `message_id` and marking whether a dataset
    /// follows.
    pub fn request(
        command_field: CommandField,
        affected_sop_class_uid: impl Into<String>,
        message_id: u16,
        data_set_present: bool,
    ) -> Self {
        Command {
            command_field: Some(command_field),
            affected_sop_class_uid: Some(affected_sop_class_uid.into()),
            message_id: Some(message_id),
            data_set_present,
            ..Default::default()
        }
    }

    /// Start building a response command set answering `request`, with the
    /// given status and whether a dataset follows.
    pub fn response_to(request: &Command, command_field: CommandField, status: Status, data_set_present: bool) -> Self {
        Command {
            command_field: Some(command_field),
            affected_sop_class_uid: request.affected_sop_class_uid.clone(),
            message_id_being_responded_to: request.message_id,
            data_set_present,
            status: Some(status),
            ..Default::default()
        }
    }

    /// A bare C-ECHO-RQ.
    pub fn c_echo_rq(message_id: u16) -> Self {
        Command::request(
            CommandField::CEchoRq,
            dicom_dictionary_std::sop_uids::VERIFICATION,
            message_id,
            false,
        )
    }

    /// A C-ECHO-RSP answering `request` with `status` (normally [`Status::Success`]).
    pub fn c_echo_rsp(request: &Command, status: Status) -> Self {
        Command::response_to(request, CommandField::CEchoRsp, status, false)
    }

    /// Render this command set as an [`InMemDataSet`], computing the group
    /// length element from the encoded size of every element that follows
    /// it (§4.4, `(0000,0000)`).
    pub fn to_dataset(&self) -> InMemDataSet {
        let mut builder = DataSetBuilder::new();

        if let Some(uid) = &self.affected_sop_class_uid {
            builder = builder.with(ui_element(AFFECTED_SOP_CLASS_UID, uid));
        }
        if let Some(uid) = &self.requested_sop_class_uid {
            builder = builder.with(ui_element(REQUESTED_SOP_CLASS_UID, uid));
        }
        if let Some(field) = self.command_field {
            builder = builder.with(DataElement::new_primitive(COMMAND_FIELD, VR::US, field.code()));
        }
        if let Some(id) = self.message_id {
            builder = builder.with(DataElement::new_primitive(MESSAGE_ID, VR::US, id));
        }
        if let Some(id) = self.message_id_being_responded_to {
            builder = builder.with(DataElement::new_primitive(MESSAGE_ID_BEING_RESPONDED_TO, VR::US, id));
        }
        if let Some(destination) = &self.move_destination {
            builder = builder.with(ae_element(MOVE_DESTINATION, destination));
        }
        if let Some(priority) = self.priority {
            builder = builder.with(DataElement::new_primitive(PRIORITY, VR::US, priority));
        }
        builder = builder.with(DataElement::new_primitive(
            COMMAND_DATA_SET_TYPE,
            VR::US,
            if self.data_set_present { 0x0001u16 } else { 0x0101u16 },
        ));
        if let Some(status) = self.status {
            builder = builder.with(DataElement::new_primitive(STATUS, VR::US, status.code()));
        }
        if let Some(comment) = &self.error_comment {
            builder = builder.with(DataElement::new_primitive(ERROR_COMMENT, VR::LO, comment.clone()));
        }
        if let Some(uid) = &self.affected_sop_instance_uid {
            builder = builder.with(ui_element(AFFECTED_SOP_INSTANCE_UID, uid));
        }
        if let Some(uid) = &self.requested_sop_instance_uid {
            builder = builder.with(ui_element(REQUESTED_SOP_INSTANCE_UID, uid));
        }
        if let Some(title) = &self.move_originator_ae_title {
            builder = builder.with(ae_element(MOVE_ORIGINATOR_AE_TITLE, title));
        }
        if let Some(id) = self.move_originator_message_id {
            builder = builder.with(DataElement::new_primitive(MOVE_ORIGINATOR_MESSAGE_ID, VR::US, id));
        }

        let mut dataset = builder.build();
        let group_length = encoded_implicit_vr_length(&dataset);
        dataset.insert(DataElement::new_primitive(COMMAND_GROUP_LENGTH, VR::UL, group_length));
        dataset
    }

    /// Parse a command set out of a decoded [`InMemDataSet`] (always
    /// decoded implicit-LE by the caller, §4.4).
    pub fn from_dataset(dataset: &InMemDataSet) -> Result<Self> {
        let command_field = CommandField::from_code(get_u16(dataset, COMMAND_FIELD, "CommandField")?)?;
        let data_set_type = get_u16(dataset, COMMAND_DATA_SET_TYPE, "CommandDataSetType")?;

        Ok(Command {
            command_field: Some(command_field),
            affected_sop_class_uid: get_opt_str(dataset, AFFECTED_SOP_CLASS_UID),
            requested_sop_class_uid: get_opt_str(dataset, REQUESTED_SOP_CLASS_UID),
            affected_sop_instance_uid: get_opt_str(dataset, AFFECTED_SOP_INSTANCE_UID),
            requested_sop_instance_uid: get_opt_str(dataset, REQUESTED_SOP_INSTANCE_UID),
            message_id: get_opt_u16(dataset, MESSAGE_ID),
            message_id_being_responded_to: get_opt_u16(dataset, MESSAGE_ID_BEING_RESPONDED_TO),
            data_set_present: data_set_type != 0x0101,
            status: get_opt_u16(dataset, STATUS).map(Status::from_code).transpose()?,
            priority: get_opt_u16(dataset, PRIORITY),
            move_destination: get_opt_str(dataset, MOVE_DESTINATION),
            move_originator_ae_title: get_opt_str(dataset, MOVE_ORIGINATOR_AE_TITLE),
            move_originator_message_id: get_opt_u16(dataset, MOVE_ORIGINATOR_MESSAGE_ID),
            error_comment: get_opt_str(dataset, ERROR_COMMENT),
        })
    }
}

fn ui_element(tag: Tag, uid: &str) -> DataElement<InMemDataSet> {
    DataElement::new_primitive(tag, VR::UI, pad_even(uid, '\0'))
}

fn ae_element(tag: Tag, value: &str) -> DataElement<InMemDataSet> {
    DataElement::new_primitive(tag, VR::AE, pad_even(value, ' '))
}

/// DICOM values are even-length; string VRs pad with the VR-specific
/// padding character (NUL for UI, space for most others, §6).
fn pad_even(value: &str, pad: char) -> String {
    let mut owned = value.to_string();
    if owned.len() % 2 != 0 {
        owned.push(pad);
    }
    owned
}

/// Sum of each element's encoded byte length under implicit-VR little
/// endian (8-byte tag+length header, plus the value bytes) — the exact
/// quantity `(0000,0000)` must hold (§4.4).
fn encoded_implicit_vr_length(dataset: &InMemDataSet) -> u32 {
    let mut total = 0u32;
    for element in dataset.iter() {
        if element.tag() == COMMAND_GROUP_LENGTH {
            continue;
        }
        total += 8 + element_value_len(element);
    }
    total
}

fn element_value_len(element: &DataElement<InMemDataSet>) -> u32 {
    match element.value().primitive() {
        Some(PrimitiveValue::Str(s)) => even_len(s.len()) as u32,
        Some(PrimitiveValue::Strs(c)) => {
            let joined_len: usize = c.iter().map(String::len).sum::<usize>() + c.len().saturating_sub(1);
            even_len(joined_len) as u32
        }
        Some(PrimitiveValue::U8(c)) => c.len() as u32,
        Some(PrimitiveValue::U16(c)) => (c.len() * 2) as u32,
        Some(PrimitiveValue::I16(c)) => (c.len() * 2) as u32,
        Some(PrimitiveValue::U32(c)) => (c.len() * 4) as u32,
        Some(PrimitiveValue::I32(c)) => (c.len() * 4) as u32,
        Some(PrimitiveValue::F32(c)) => (c.len() * 4) as u32,
        Some(PrimitiveValue::F64(c)) => (c.len() * 8) as u32,
        Some(PrimitiveValue::Tags(c)) => (c.len() * 4) as u32,
        Some(PrimitiveValue::Empty) | None => 0,
    }
}

/// Round a value's unpadded byte length up to the next even number, matching
/// the padding `encode_value` applies to odd-length values on the wire.
fn even_len(len: usize) -> usize {
    (len + 1) & !1
}

fn get_opt_u16(dataset: &InMemDataSet, tag: Tag) -> Option<u16> {
    match dataset.get(tag)?.value().primitive()? {
        PrimitiveValue::U16(c) if c.len() == 1 => Some(c[0]),
        _ => None,
    }
}

fn get_u16(dataset: &InMemDataSet, tag: Tag, field: &'static str) -> Result<u16> {
    let element = dataset.get(tag).context(MissingCommandFieldSnafu { field })?;
    match element.value().primitive() {
        Some(PrimitiveValue::U16(c)) if c.len() == 1 => Ok(c[0]),
        _ => UnexpectedCommandFieldShapeSnafu { field }.fail(),
    }
}

fn get_opt_str(dataset: &InMemDataSet, tag: Tag) -> Option<String> {
    let strings = dataset.get(tag)?.value().primitive()?.strings()?;
    strings.first().map(|s| s.trim_end_matches(['\0', ' ']).to_string())
}
