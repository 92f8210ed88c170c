//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::{Currency, Pagination};
use rates_types::dto::{
    AvailableDatesResponse, CurrencyRateEntry, PageQuery, RatesForDateResponse, StoredRate,
    UpsertRateRequest, UpsertRateResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Rates for the latest date that has any rate
#[utoipa::path(
    get,
    path = "/api/rates/latest",
    tag = "rates",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of the catalog with rates", body = RatesForDateResponse),
        (status = 400, description = "Invalid page or limit"),
        (status = 404, description = "No rate data available")
    )
)]
async fn latest_rates() {}

/// Rates for a given date
#[utoipa::path(
    get,
    path = "/api/rates/{date}",
    tag = "rates",
    params(
        ("date" = String, Path, description = "Effective date as YYYYMMDD", example = "20250101"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of the catalog with rates", body = RatesForDateResponse),
        (status = 400, description = "Invalid date, page or limit")
    )
)]
async fn rates_by_date() {}

/// Dates with at least one stored rate
#[utoipa::path(
    get,
    path = "/api/rates/availableDates",
    tag = "rates",
    responses(
        (status = 200, description = "Distinct dates in ascending order", body = AvailableDatesResponse)
    )
)]
async fn available_dates() {}

/// Insert or replace a rate
#[utoipa::path(
    post,
    path = "/api/rates/{date}",
    tag = "rates",
    params(
        ("date" = String, Path, description = "Effective date as YYYYMMDD", example = "20250101")
    ),
    request_body = UpsertRateRequest,
    responses(
        (status = 200, description = "Rate stored", body = UpsertRateResponse),
        (status = 400, description = "Invalid date or value"),
        (status = 404, description = "Currency does not exist")
    )
)]
async fn upsert_rate() {}

/// Currency catalog
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Currencies in catalog order", body = Vec<Currency>)
    )
)]
async fn list_currencies() {}

/// OpenAPI documentation for the Exchange Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exchange Rates Service API",
        version = "1.0.0",
        description = "Daily currency exchange rates: paged rate queries per date, the latest date, available dates and rate upserts.\n\nDates are written as `YYYYMMDD` and rates as decimal strings with four places.",
        license(name = "MIT"),
    ),
    paths(
        health,
        latest_rates,
        rates_by_date,
        available_dates,
        upsert_rate,
        list_currencies,
    ),
    components(
        schemas(
            RatesForDateResponse,
            CurrencyRateEntry,
            Pagination,
            AvailableDatesResponse,
            UpsertRateRequest,
            UpsertRateResponse,
            StoredRate,
            Currency,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Rate queries and upserts"),
        (name = "currencies", description = "Currency catalog"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/api/rates/latest",
            "/api/rates/{date}",
            "/api/rates/availableDates",
            "/api/currencies",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
