//! The run-time attribute dictionary: a lazily built table indexed by tag,
//! behind the [`DataDictionary`] trait that `dicom-core` depends on (§1).

use std::collections::HashMap;

use dicom_core::dictionary::{DataDictionary, DictionaryEntry, UNKNOWN_ENTRY};
use dicom_core::tag::Tag;
use once_cell::sync::Lazy;

use crate::entries::TABLE_TEXT;
use crate::parse::parse_line;

static TABLE: Lazy<HashMap<Tag, DictionaryEntry>> = Lazy::new(build_table);

fn build_table() -> HashMap<Tag, DictionaryEntry> {
    let mut table = HashMap::new();
    for line in TABLE_TEXT.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = parse_line(line).unwrap_or_else(|e| panic!("built-in dictionary corrupt: {e}"));
        let entry = DictionaryEntry {
            keyword: Box::leak(parsed.keyword.into_boxed_str()),
            vrs: Box::leak(parsed.vrs.into_boxed_slice()),
            vm: Box::leak(parsed.vm.into_boxed_str()),
        };
        table.insert(parsed.tag, entry);
    }
    table
}

/// Access the singleton standard dictionary table directly, bypassing the
/// [`StandardDataDictionary`] unit type.
pub fn registry() -> &'static HashMap<Tag, DictionaryEntry> {
    &TABLE
}

/// A [`DataDictionary`] backed by this crate's built-in table, initialized
/// lazily on first use.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    fn by_tag(&self, tag: Tag) -> DictionaryEntry {
        registry().get(&tag).cloned().unwrap_or(UNKNOWN_ENTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::vr::VR;

    #[test]
    fn resolves_known_tag() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x0010, 0x0010));
        assert_eq!(entry.keyword, "PatientName");
        assert_eq!(entry.primary_vr(), VR::PN);
    }

    #[test]
    fn unknown_tag_returns_sentinel() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x9999, 0x9999));
        assert_eq!(entry.primary_vr(), VR::UN);
    }

    #[test]
    fn command_group_tags_are_present() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.by_tag(Tag(0x0000, 0x0100)).keyword, "CommandField");
        assert_eq!(dict.by_tag(Tag(0x0000, 0x0900)).keyword, "Status");
    }
}
