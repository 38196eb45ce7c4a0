//! Station code types.

use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code {input:?}: {reason}")]
pub struct InvalidCrs {
    input: String,
    reason: &'static str,
}

/// A valid 3-letter CRS (Computer Reservation System) station code.
///
/// CRS codes are always 3 uppercase ASCII letters. Both rail providers
/// key their boards and destination filters on them.
///
/// # Examples
///
/// ```
/// use transit_feeds::domain::Crs;
///
/// let grp = Crs::parse("GRP").unwrap();
/// assert_eq!(grp.as_str(), "GRP");
///
/// assert!(Crs::parse("grp").is_err());
/// assert_eq!(Crs::parse_normalized(" vic ").unwrap().as_str(), "VIC");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code. The input must be exactly 3 uppercase ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let invalid = |reason| InvalidCrs {
            input: s.to_string(),
            reason,
        };

        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return Err(invalid("must be exactly 3 characters"));
        }
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(invalid("must be uppercase ASCII letters A-Z"));
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse user-supplied input, trimming whitespace and uppercasing first.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Crs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_crs() {
        for code in ["GRP", "VIC", "CHX", "LBG", "AAA", "ZZZ"] {
            assert!(Crs::parse(code).is_ok(), "{code} should parse");
        }
    }

    #[test]
    fn reject_lowercase() {
        assert!(Crs::parse("grp").is_err());
        assert!(Crs::parse("Grp").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(Crs::parse("").is_err());
        assert!(Crs::parse("GR").is_err());
        assert!(Crs::parse("GRPK").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(Crs::parse("G1P").is_err());
        assert!(Crs::parse("G-P").is_err());
        assert!(Crs::parse("GÖP").is_err());
    }

    #[test]
    fn normalized_parse_trims_and_uppercases() {
        assert_eq!(Crs::parse_normalized(" chx\n").unwrap().as_str(), "CHX");
        assert!(Crs::parse_normalized("ch").is_err());
    }

    #[test]
    fn error_mentions_input() {
        let err = Crs::parse("london").unwrap_err();
        assert!(err.to_string().contains("\"london\""));
    }

    #[test]
    fn display_debug_and_serialize() {
        let crs = Crs::parse("VIC").unwrap();
        assert_eq!(crs.to_string(), "VIC");
        assert_eq!(format!("{crs:?}"), "Crs(VIC)");
        assert_eq!(serde_json::to_string(&crs).unwrap(), "\"VIC\"");
    }
}
