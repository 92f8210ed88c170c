//! Effective date of a rate.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::DomainError;

const COMPACT_FORMAT: &str = "%Y%m%d";

/// The calendar date a rate applies to.
///
/// On the wire this is always the compact 8-digit `YYYYMMDD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectiveDate(NaiveDate);

impl EffectiveDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses the compact `YYYYMMDD` form.
    ///
    /// Exactly eight ASCII digits naming a real calendar day; `20250230` and
    /// `2025-01-01` are both rejected.
    pub fn parse_compact(raw: &str) -> Result<Self, DomainError> {
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidDate(raw.to_string()));
        }

        NaiveDate::parse_from_str(raw, COMPACT_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::InvalidDate(raw.to_string()))
    }

    /// Compact `YYYYMMDD` rendering.
    pub fn compact(&self) -> String {
        self.0.format(COMPACT_FORMAT).to_string()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for EffectiveDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for EffectiveDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(COMPACT_FORMAT))
    }
}

impl std::str::FromStr for EffectiveDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_compact(s)
    }
}

impl Serialize for EffectiveDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EffectiveDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_compact(&raw).map_err(serde::de::Error::custom)
    }
}
