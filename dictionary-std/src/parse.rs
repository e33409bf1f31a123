//! Parser for the dictionary line format named in §6: one entry per line,
//! semicolon-separated, `(gggg,eeee); VR[ VR2[ VR3]]; message-field;
//! keyword; vm; RET?`.
//!
//! This is the documented shape of the external dictionary collaborator
//! (§1: out of scope, replaced freely); the core never depends on this
//! module directly, only on the [`DataDictionary`](dicom_core::dictionary::DataDictionary)
//! trait that [`crate::StandardDataDictionary`] implements over a table
//! built from it.

use dicom_core::tag::Tag;
use dicom_core::vr::VR;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("malformed dictionary line: {:?}", line))]
    Malformed { line: String },
    #[snafu(display("malformed tag field {:?} in line {:?}", field, line))]
    Tag { field: String, line: String },
    #[snafu(display("unrecognized VR {:?} in line {:?}", vr, line))]
    Vr { vr: String, line: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One parsed line of the dictionary file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub tag: Tag,
    pub vrs: Vec<VR>,
    pub message_field: String,
    pub keyword: String,
    pub vm: String,
    pub retired: bool,
}

/// Parse one line of the dictionary file format. Blank lines and lines
/// starting with `#` are not entries and must be filtered by the caller
/// before invoking this function.
pub fn parse_line(line: &str) -> Result<ParsedEntry> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(Error::Malformed {
            line: line.to_string(),
        });
    }

    let tag = parse_tag(fields[0], line)?;
    let vrs = fields[1]
        .split_whitespace()
        .map(|code| {
            code.parse::<VR>().map_err(|_| Error::Vr {
                vr: code.to_string(),
                line: line.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let message_field = fields[2].to_string();
    let keyword = fields[3].to_string();
    let vm = fields.get(4).copied().unwrap_or("1").to_string();
    let retired = fields.get(5).map(|f| f.eq_ignore_ascii_case("RET")).unwrap_or(false);

    Ok(ParsedEntry {
        tag,
        vrs,
        message_field,
        keyword,
        vm,
        retired,
    })
}

fn parse_tag(field: &str, line: &str) -> Result<Tag> {
    let inner = field
        .strip_prefix('(')
        .and_then(|f| f.strip_suffix(')'))
        .ok_or_else(|| Error::Tag {
            field: field.to_string(),
            line: line.to_string(),
        })?;
    let (group, elem) = inner.split_once(',').ok_or_else(|| Error::Tag {
        field: field.to_string(),
        line: line.to_string(),
    })?;
    let group = u16::from_str_radix(group.trim(), 16).map_err(|_| Error::Tag {
        field: field.to_string(),
        line: line.to_string(),
    })?;
    let elem = u16::from_str_radix(elem.trim(), 16).map_err(|_| Error::Tag {
        field: field.to_string(),
        line: line.to_string(),
    })?;
    Ok(Tag(group, elem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_line() {
        let entry = parse_line("(0010,0010); PN; Patient's Name; PatientName; 1;").unwrap();
        assert_eq!(entry.tag, Tag(0x0010, 0x0010));
        assert_eq!(entry.vrs, vec![VR::PN]);
        assert_eq!(entry.keyword, "PatientName");
        assert!(!entry.retired);
    }

    #[test]
    fn parses_multi_vr_and_retired_marker() {
        let entry = parse_line("(0028,0106); US SS; Smallest Image Pixel Value; SmallestImagePixelValue; 1; RET").unwrap();
        assert_eq!(entry.vrs, vec![VR::US, VR::SS]);
        assert!(entry.retired);
    }

    #[test]
    fn rejects_malformed_tag() {
        assert!(parse_line("0010,0010; PN; x; y; 1").is_err());
    }
}
