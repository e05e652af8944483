//! Region code validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A validated ISO 3166-1 alpha-2 region code, stored lower-cased.
///
/// Validation happens before any store lookup or geometry work, so a bad
/// code never costs a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Parse and validate a region code.
    ///
    /// Accepts exactly two ASCII letters in either case; the stored value
    /// is lower-cased so lookups are case-insensitive.
    pub fn parse(input: &str) -> Result<Self, RegionCodeError> {
        if input.trim().is_empty() {
            return Err(RegionCodeError::Empty {
                input: input.to_string(),
            });
        }
        if input.len() != 2 || !input.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RegionCodeError::Format {
                input: input.to_string(),
            });
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = RegionCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

#[derive(Debug, Error)]
pub enum RegionCodeError {
    #[error("region code is empty: {input:?}; expected an ISO 3166-1 alpha-2 code such as 'SG'")]
    Empty { input: String },

    #[error("invalid region code {input:?}: expected exactly 2 letters (ISO 3166-1 alpha-2), e.g. 'SG' or 'fr'")]
    Format { input: String },
}
