//! Exchange rate values and records.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::currency::{CurrencyCode, CurrencyId};
use super::date::EffectiveDate;
use crate::error::DomainError;

/// Digits kept after the decimal point, matching `decimal(15,4)`.
pub const RATE_SCALE: u32 = 4;

/// Digits allowed before the decimal point (15 total minus the scale).
const RATE_INTEGER_DIGITS: u32 = 11;

/// A strictly positive rate stored with a fixed scale of four.
///
/// Construction rounds half away from zero to four places. A value that rounds
/// to zero or exceeds the column precision is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RateValue(Decimal);

impl RateValue {
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidRate(value.to_string()));
        }

        let mut normalized =
            value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(RATE_SCALE);

        if normalized.is_zero() {
            return Err(DomainError::InvalidRate(value.to_string()));
        }
        if normalized >= Decimal::from(10_i64.pow(RATE_INTEGER_DIGITS)) {
            return Err(DomainError::InvalidRate(value.to_string()));
        }

        Ok(Self(normalized))
    }

    /// Parses a plain or scientific decimal literal.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        // rust_decimal tolerates `_` separators; JSON numbers do not.
        if trimmed.contains('_') {
            return Err(DomainError::InvalidRate(raw.to_string()));
        }
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| DomainError::InvalidRate(raw.to_string()))?;

        Self::new(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RateValue {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Serialized as a string so the fixed scale survives JSON.
impl Serialize for RateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored rate for one currency on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub currency_id: CurrencyId,
    pub effective_date: EffectiveDate,
    pub rate: RateValue,
}

/// One slot of a rates page: a catalog currency and its rate on the requested
/// date, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRate {
    pub currency: CurrencyCode,
    pub rate: Option<RateValue>,
}
