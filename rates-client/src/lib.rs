//! # Rates Client SDK
//!
//! A typed Rust client for the Exchange Rates API.

use rates_types::{
    AvailableDatesResponse, Currency, EffectiveDate, RatesForDateResponse, RateValue, StoredRate,
    UpsertRateRequest, UpsertRateResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Optional paging for rate listings; unset fields use the server defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Paging {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// Exchange Rates API client.
pub struct RatesClient {
    base_url: String,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Rates for the latest date holding any rate.
    pub async fn latest_rates(&self, paging: Paging) -> Result<RatesForDateResponse, ClientError> {
        self.get("/api/rates/latest", &paging.query()).await
    }

    /// Rates for a given date.
    pub async fn rates_for_date(
        &self,
        date: EffectiveDate,
        paging: Paging,
    ) -> Result<RatesForDateResponse, ClientError> {
        self.get(&format!("/api/rates/{}", date), &paging.query())
            .await
    }

    /// Every date with at least one stored rate.
    pub async fn available_dates(&self) -> Result<Vec<EffectiveDate>, ClientError> {
        let resp: AvailableDatesResponse = self.get("/api/rates/availableDates", &[]).await?;
        Ok(resp.dates)
    }

    /// Inserts or replaces one currency's rate on a date.
    pub async fn upsert_rate(
        &self,
        date: EffectiveDate,
        currency: &str,
        value: RateValue,
    ) -> Result<StoredRate, ClientError> {
        let req = UpsertRateRequest {
            currency: currency.to_string(),
            value: serde_json::Value::String(value.to_string()),
        };
        let resp: UpsertRateResponse = self.post(&format!("/api/rates/{}", date), &req).await?;
        Ok(resp.data)
    }

    /// The currency catalog.
    pub async fn currencies(&self) -> Result<Vec<Currency>, ClientError> {
        self.get("/api/currencies", &[]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
