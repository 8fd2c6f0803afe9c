use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// Six-character alphanumeric UniProt accession as it appears in ENZYME
/// `DR` lines. The shape matches the token the flat-file parser extracts,
/// so nothing the parser emits is rejected downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Accession(String);

impl Accession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Accession {
    type Err = LinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let is_valid = normalized.len() == 6
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit());
        if !is_valid {
            return Err(LinkError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accession_valid() {
        let acc: Accession = "p00330".parse().unwrap();
        assert_eq!(acc.as_str(), "P00330");

        // Any 6-char alphanumeric token the flat-file parser extracts is
        // accepted, leading digit included.
        let acc: Accession = "0A1B2C".parse().unwrap();
        assert_eq!(acc.as_str(), "0A1B2C");
    }

    #[test]
    fn parse_accession_invalid() {
        let err = "P0033".parse::<Accession>().unwrap_err();
        assert_matches!(err, LinkError::InvalidAccession(_));

        let err = "P00-30".parse::<Accession>().unwrap_err();
        assert_matches!(err, LinkError::InvalidAccession(_));
    }
}
