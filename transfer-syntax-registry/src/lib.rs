//! The registry mapping a transfer syntax UID, as negotiated during
//! association establishment, to the [`TransferSyntax`] profile that knows
//! how to frame its data elements (§4.2, §6).
//!
//! Six transfer syntaxes are known: the three the codec fully understands
//! (implicit-LE, explicit-LE, explicit-BE) and three whose pixel data is
//! encapsulated and passed through opaquely, per this node's non-goal of
//! compressed-syntax transcoding (§1).

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

use std::collections::HashMap;
use std::fmt;

use dicom_encoding::TransferSyntax;
use lazy_static::lazy_static;

/// Every transfer syntax UID this node recognizes during presentation
/// context negotiation, in no particular order.
pub const KNOWN_TRANSFER_SYNTAXES: &[TransferSyntax] = &[
    TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN,
    TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN,
    TransferSyntax::EXPLICIT_VR_BIG_ENDIAN,
    TransferSyntax::JPEG_BASELINE,
    TransferSyntax::JPEG_LOSSLESS_NON_HIERARCHICAL,
    TransferSyntax::JPEG_LOSSLESS_FIRST_ORDER,
];

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, TransferSyntax> = KNOWN_TRANSFER_SYNTAXES
        .iter()
        .map(|ts| (ts.uid, *ts))
        .collect();
}

/// Zero-sized handle onto the built-in transfer syntax registry.
///
/// A UID arriving off the wire may carry trailing padding (a single NUL or
/// space byte, per the even-length rule applied to UI-VR fields); lookups
/// trim it before matching.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TransferSyntaxRegistry;

impl TransferSyntaxRegistry {
    /// Resolve a transfer syntax UID to its profile, trimming any trailing
    /// NUL/space padding first.
    pub fn get(&self, uid: &str) -> Option<&'static TransferSyntax> {
        let trimmed = uid.trim_end_matches(|c: char| c == '\0' || c == ' ');
        REGISTRY.get(trimmed)
    }

    /// Iterate over every known transfer syntax.
    pub fn iter(&self) -> impl Iterator<Item = &'static TransferSyntax> {
        KNOWN_TRANSFER_SYNTAXES.iter()
    }
}

impl fmt::Display for TransferSyntaxRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("TransferSyntaxRegistry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_uids() {
        let reg = TransferSyntaxRegistry;
        assert_eq!(
            reg.get("1.2.840.10008.1.2").unwrap().uid,
            "1.2.840.10008.1.2"
        );
        assert_eq!(
            reg.get("1.2.840.10008.1.2.1\0").unwrap().uid,
            "1.2.840.10008.1.2.1"
        );
    }

    #[test]
    fn unknown_uid_is_none() {
        let reg = TransferSyntaxRegistry;
        assert!(reg.get("1.2.840.10008.1.2.4.999").is_none());
    }

    #[test]
    fn encapsulated_syntaxes_are_flagged() {
        let reg = TransferSyntaxRegistry;
        assert!(reg.get("1.2.840.10008.1.2.4.50").unwrap().is_encapsulated());
        assert!(!reg.get("1.2.840.10008.1.2.1").unwrap().is_encapsulated());
    }
}
