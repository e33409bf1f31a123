//! Value Representation (VR): the two-letter code classifying how a value
//! field is encoded on the wire.

use std::fmt;
use std::str::FromStr;

/// A value representation code.
///
/// This is a closed enumeration of the 27 standard VR codes used by this
/// system, plus two synthetic codes (`NI`, `NN`) used internally to mark
/// item/sequence delimiter placeholders that carry no value of their own.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum VR {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FL,
    FD,
    IS,
    LO,
    LT,
    OB,
    OF,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    TM,
    UI,
    UL,
    UN,
    US,
    UT,
    /// Synthetic: item / item-delimitation marker.
    NI,
    /// Synthetic: sequence-delimitation marker.
    NN,
}

impl VR {
    /// Whether this VR uses the 4-byte length field (preceded, in explicit
    /// encoding, by two reserved zero bytes), as opposed to the 2-byte
    /// length field used by regular VRs.
    ///
    /// Implicit VR encoding always uses the 4-byte length field regardless
    /// of this classification; this only matters for explicit encoding.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            VR::OB | VR::OW | VR::OF | VR::SQ | VR::UT | VR::UN | VR::NI | VR::NN
        )
    }

    /// The pad byte used to bring an odd-length value to even length.
    /// Text-like VRs pad with an ASCII space; everything else pads with NUL.
    pub fn pad_byte(self) -> u8 {
        match self {
            VR::AE | VR::AS | VR::CS | VR::DA | VR::DS | VR::DT | VR::IS | VR::LO | VR::LT
            | VR::PN | VR::SH | VR::ST | VR::TM | VR::UT => b' ',
            _ => 0,
        }
    }

    /// Whether this VR's value splits on backslash into a multi-valued
    /// string payload (as opposed to a single indivisible string, a
    /// numeric, or a structural/opaque value).
    pub fn is_multivalued_string(self) -> bool {
        matches!(
            self,
            VR::AE
                | VR::AS
                | VR::CS
                | VR::DA
                | VR::DS
                | VR::DT
                | VR::IS
                | VR::LO
                | VR::PN
                | VR::SH
                | VR::TM
                | VR::UI
        )
    }

    /// Whether this VR's value is a single, non-multivalued string (never
    /// split on backslash).
    pub fn is_single_string(self) -> bool {
        matches!(self, VR::LT | VR::ST | VR::UT)
    }

    /// The four-character code of this VR, as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            VR::AE => "AE",
            VR::AS => "AS",
            VR::AT => "AT",
            VR::CS => "CS",
            VR::DA => "DA",
            VR::DS => "DS",
            VR::DT => "DT",
            VR::FL => "FL",
            VR::FD => "FD",
            VR::IS => "IS",
            VR::LO => "LO",
            VR::LT => "LT",
            VR::OB => "OB",
            VR::OF => "OF",
            VR::OW => "OW",
            VR::PN => "PN",
            VR::SH => "SH",
            VR::SL => "SL",
            VR::SQ => "SQ",
            VR::SS => "SS",
            VR::ST => "ST",
            VR::TM => "TM",
            VR::UI => "UI",
            VR::UL => "UL",
            VR::UN => "UN",
            VR::US => "US",
            VR::UT => "UT",
            VR::NI => "NI",
            VR::NN => "NN",
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VR {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "AE" => VR::AE,
            "AS" => VR::AS,
            "AT" => VR::AT,
            "CS" => VR::CS,
            "DA" => VR::DA,
            "DS" => VR::DS,
            "DT" => VR::DT,
            "FL" => VR::FL,
            "FD" => VR::FD,
            "IS" => VR::IS,
            "LO" => VR::LO,
            "LT" => VR::LT,
            "OB" => VR::OB,
            "OF" => VR::OF,
            "OW" => VR::OW,
            "PN" => VR::PN,
            "SH" => VR::SH,
            "SL" => VR::SL,
            "SQ" => VR::SQ,
            "SS" => VR::SS,
            "ST" => VR::ST,
            "TM" => VR::TM,
            "UI" => VR::UI,
            "UL" => VR::UL,
            "UN" => VR::UN,
            "US" => VR::US,
            "UT" => VR::UT,
            "NI" => VR::NI,
            "NN" => VR::NN,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_vrs_take_four_byte_length() {
        assert!(VR::OB.is_special());
        assert!(VR::SQ.is_special());
        assert!(!VR::CS.is_special());
        assert!(!VR::US.is_special());
    }

    #[test]
    fn round_trip_str() {
        for vr in [VR::AE, VR::SQ, VR::UN, VR::NI, VR::NN] {
            assert_eq!(vr.as_str().parse::<VR>().unwrap(), vr);
        }
    }
}
