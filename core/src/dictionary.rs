//! The narrow interface onto the data dictionary collaborator (§1: out of
//! scope, replaced freely). The core only depends on this trait, never on a
//! concrete dictionary implementation.

use crate::tag::Tag;
use crate::vr::VR;

/// A single dictionary entry: the VR(s) a tag is permitted to carry, its
/// keyword, and its value multiplicity constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The attribute's keyword (e.g. `"PatientName"`).
    pub keyword: &'static str,
    /// The VR(s) this tag may be encoded with; the first is preferred.
    pub vrs: &'static [VR],
    /// The value multiplicity constraint, as a string token from the
    /// dictionary file format (e.g. `"1"`, `"1-n"`, `"2"`).
    pub vm: &'static str,
}

impl DictionaryEntry {
    /// The preferred VR for this entry, used when the same tag is resolved
    /// through the dictionary for implicit VR decoding.
    pub fn primary_vr(&self) -> VR {
        self.vrs.first().copied().unwrap_or(VR::UN)
    }
}

/// The sentinel entry returned for a tag with no known dictionary entry
/// (§6: "Unknown tags return a sentinel entry with VR=UN and no
/// constraints").
pub const UNKNOWN_ENTRY: DictionaryEntry = DictionaryEntry {
    keyword: "Unknown",
    vrs: &[VR::UN],
    vm: "1-n",
};

/// A lookup table from tag to dictionary entry.
///
/// This is the entire surface this crate requires from the data
/// dictionary: everything else (file parsing, standard table loading) lives
/// in the external `dicom-dictionary-std` collaborator.
pub trait DataDictionary {
    /// Resolve a tag to its dictionary entry, or the sentinel unknown entry.
    fn by_tag(&self, tag: Tag) -> DictionaryEntry;
}

/// A dictionary that always returns the sentinel unknown entry. Useful in
/// tests and wherever implicit VR decoding is known not to be needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDictionary;

impl DataDictionary for StubDictionary {
    fn by_tag(&self, _tag: Tag) -> DictionaryEntry {
        UNKNOWN_ENTRY
    }
}
