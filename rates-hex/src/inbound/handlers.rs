//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use rates_types::{AppError, PageQuery, RateRepository, UpsertRateRequest, UpsertRateResponse};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState<R: RateRepository> {
    pub service: RateService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Rates for the most recent date holding any rate.
#[tracing::instrument(skip(state))]
pub async fn latest_rates<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.latest_rates(&query).await?;
    Ok(Json(response))
}

/// Rates for a given `YYYYMMDD` date.
#[tracing::instrument(skip(state), fields(date = %date))]
pub async fn rates_by_date<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(date): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.rates_by_date(&date, &query).await?;
    Ok(Json(response))
}

/// Every date with at least one stored rate.
#[tracing::instrument(skip(state))]
pub async fn available_dates<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.list_available_dates().await?;
    Ok(Json(response))
}

/// The currency catalog.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let currencies = state.service.list_currencies().await?;
    Ok(Json(currencies))
}

/// Insert or replace one currency's rate on a date.
///
/// Body rejections (bad JSON, missing fields) are reported in the same
/// `{error, code}` shape as every other validation failure.
#[tracing::instrument(skip(state, body), fields(date = %date))]
pub async fn upsert_rate<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(date): Path<String>,
    body: Result<Json<UpsertRateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let stored = state.service.upsert_rate(&date, req).await?;
    Ok(Json(UpsertRateResponse::new(stored)))
}
