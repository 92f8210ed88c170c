//! Rate Application Service
//!
//! Orchestrates queries and upserts through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use rates_types::{
    AppError, AvailableDatesResponse, Currency, CurrencyCode, DomainError, EffectiveDate,
    PageQuery, PageRequest, Pagination, RateRepository, RateValue, RatesForDateResponse,
    StoredRate, UpsertRateRequest,
};

/// Application service for exchange rate operations.
///
/// Generic over `R: RateRepository` - the adapter is injected at compile time.
/// Every call is a single unit of work against the store; nothing is cached
/// between requests.
pub struct RateService<R: RateRepository> {
    repo: R,
}

impl<R: RateRepository> RateService<R> {
    /// Creates a new rate service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// The most recent date holding any rate, or `None` for an empty store.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_latest_date(&self) -> Result<Option<EffectiveDate>, AppError> {
        self.repo.latest_effective_date().await.map_err(Into::into)
    }

    /// One page of the catalog with each currency's rate on `date`.
    ///
    /// The page is over currencies, not rates: a currency with no rate on
    /// `date` still takes a slot, with a null rate.
    #[tracing::instrument(skip_all, fields(date = %date, page = page.page(), limit = page.limit()))]
    pub async fn list_rates_for_date(
        &self,
        date: EffectiveDate,
        page: PageRequest,
    ) -> Result<RatesForDateResponse, AppError> {
        let rates = self
            .repo
            .list_rates_for_date(date, page.offset(), page.limit())
            .await?;
        let total = self.repo.count_currencies().await?;

        Ok(RatesForDateResponse {
            effective_date: date,
            rates: rates.into_iter().map(Into::into).collect(),
            pagination: Pagination::new(page, total),
        })
    }

    /// Validates raw paging and date input, then lists the page.
    ///
    /// Every validation failure is returned before the store is touched.
    pub async fn rates_by_date(
        &self,
        raw_date: &str,
        query: &PageQuery,
    ) -> Result<RatesForDateResponse, AppError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?;
        let date = EffectiveDate::parse_compact(raw_date)?;

        self.list_rates_for_date(date, page).await
    }

    /// Lists the page for the latest date holding any rate.
    ///
    /// Fails with not found when the store holds no rates.
    pub async fn latest_rates(&self, query: &PageQuery) -> Result<RatesForDateResponse, AppError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?;

        let date = self
            .resolve_latest_date()
            .await?
            .ok_or(DomainError::NoRateData)?;

        self.list_rates_for_date(date, page).await
    }

    /// Every date with at least one rate, each listed once.
    #[tracing::instrument(skip(self))]
    pub async fn list_available_dates(&self) -> Result<AvailableDatesResponse, AppError> {
        let dates = self.repo.list_available_dates().await?;
        Ok(AvailableDatesResponse { dates })
    }

    /// The currency catalog in catalog order.
    pub async fn list_currencies(&self) -> Result<Vec<Currency>, AppError> {
        self.repo.list_currencies().await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Upsert
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts or replaces one currency's rate on a date.
    ///
    /// Validation order: date, value, then catalog lookup. Unknown currencies
    /// are never created here.
    #[tracing::instrument(skip_all, fields(date = %raw_date, currency = %req.currency))]
    pub async fn upsert_rate(
        &self,
        raw_date: &str,
        req: UpsertRateRequest,
    ) -> Result<StoredRate, AppError> {
        let date = EffectiveDate::parse_compact(raw_date)?;
        let value = parse_rate_input(&req.value)?;
        let code = CurrencyCode::parse(&req.currency)
            .map_err(|_| DomainError::CurrencyNotFound(req.currency.clone()))?;

        let currency = self
            .repo
            .find_currency_by_code(&code)
            .await?
            .ok_or_else(|| DomainError::CurrencyNotFound(code.to_string()))?;

        let stored = self.repo.upsert_rate(currency.id, date, value).await?;
        tracing::info!(rate = %stored.rate, "rate stored");

        Ok(StoredRate {
            currency: currency.code,
            effective_date: stored.effective_date,
            rate: stored.rate,
        })
    }
}

/// Accepts a JSON number or a numeric string.
fn parse_rate_input(value: &serde_json::Value) -> Result<RateValue, DomainError> {
    match value {
        serde_json::Value::Number(n) => RateValue::parse(&n.to_string()),
        serde_json::Value::String(s) => RateValue::parse(s),
        other => Err(DomainError::InvalidRate(other.to_string())),
    }
}
