//! Folio (invoice number) newtype
//!
//! Folios are positive integers assigned sequentially by the record store.
//! Wrapping them keeps them from being confused with menu selections and
//! other plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Invoice number, unique for the whole life of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Folio(u32);

impl Folio {
    /// The first folio handed out by an empty store
    pub const FIRST: Folio = Folio(1);

    /// Create a folio, rejecting zero
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// The folio following `count` existing records
    pub fn after_count(count: usize) -> Self {
        Self(count as u32 + 1)
    }

    /// Get the numeric value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Folio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a folio string is not a positive integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioParseError(pub String);

impl fmt::Display for FolioParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid folio '{}': expected a positive integer", self.0)
    }
}

impl std::error::Error for FolioParseError {}

impl FromStr for Folio {
    type Err = FolioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Accept "#12" as printed in listings
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Folio::new)
            .ok_or_else(|| FolioParseError(trimmed.to_string()))
    }
}
