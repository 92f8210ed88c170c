//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{CurrencyCode, CurrencyRate, EffectiveDate, Pagination, RateValue};

// ─────────────────────────────────────────────────────────────────────────────
// Query DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Raw paging parameters from the query string.
///
/// Kept as strings so that non-numeric input surfaces as a validation error
/// with the service's own message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default 1)
    #[param(example = "1")]
    pub page: Option<String>,
    /// Page size between 1 and 100 (default 12)
    #[param(example = "12")]
    pub limit: Option<String>,
}

/// A currency and its rate on the requested date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyRateEntry {
    #[schema(value_type = String, example = "USD")]
    pub currency: CurrencyCode,
    /// Rate with four decimal places, or null when none is recorded
    #[schema(value_type = Option<String>, example = "1.2345")]
    pub rate: Option<RateValue>,
}

impl From<CurrencyRate> for CurrencyRateEntry {
    fn from(value: CurrencyRate) -> Self {
        Self {
            currency: value.currency,
            rate: value.rate,
        }
    }
}

/// One page of the catalog with rates for a single date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatesForDateResponse {
    #[schema(value_type = String, example = "20250101")]
    pub effective_date: EffectiveDate,
    pub rates: Vec<CurrencyRateEntry>,
    pub pagination: Pagination,
}

/// Dates for which at least one rate exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableDatesResponse {
    #[schema(value_type = Vec<String>, example = json!(["20250101", "20250102"]))]
    pub dates: Vec<EffectiveDate>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Upsert DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to insert or replace one currency's rate on a date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertRateRequest {
    /// Currency code from the catalog
    #[schema(example = "USD")]
    pub currency: String,
    /// Positive rate, as a JSON number or numeric string
    #[schema(value_type = String, example = "1.2345")]
    pub value: serde_json::Value,
}

/// The stored rate after an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredRate {
    #[schema(value_type = String, example = "USD")]
    pub currency: CurrencyCode,
    #[schema(value_type = String, example = "20250101")]
    pub effective_date: EffectiveDate,
    #[schema(value_type = String, example = "1.2345")]
    pub rate: RateValue,
}

/// Response after a successful upsert.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertRateResponse {
    #[schema(example = "Rate added/updated successfully.")]
    pub message: String,
    pub data: StoredRate,
}

impl UpsertRateResponse {
    pub fn new(data: StoredRate) -> Self {
        Self {
            message: "Rate added/updated successfully.".into(),
            data,
        }
    }
}
