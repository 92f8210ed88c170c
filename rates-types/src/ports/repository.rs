//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite) implement this trait over the two tables
//! `currencies` and `rates`.

use crate::domain::{
    Currency, CurrencyCode, CurrencyId, CurrencyRate, EffectiveDate, Rate, RateValue,
};
use crate::error::RepoError;

/// The Rate Store port.
///
/// At most one rate exists per `(currency, effective date)`. `upsert_rate`
/// MUST enforce that with a single atomic statement so racing writers merge
/// instead of duplicating.
#[async_trait::async_trait]
pub trait RateRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Counts the currencies in the catalog.
    async fn count_currencies(&self) -> Result<u64, RepoError>;

    /// Lists the whole catalog in primary key order.
    async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError>;

    /// Finds a currency by its code.
    async fn find_currency_by_code(
        &self,
        code: &CurrencyCode,
    ) -> Result<Option<Currency>, RepoError>;

    /// Inserts codes not yet in the catalog. Returns how many were created.
    async fn register_currencies(&self, codes: &[CurrencyCode]) -> Result<u64, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// The most recent effective date holding any rate.
    async fn latest_effective_date(&self) -> Result<Option<EffectiveDate>, RepoError>;

    /// Catalog window `[offset, offset + limit)` in primary key order, each
    /// currency paired with its rate on `date` (left join).
    async fn list_rates_for_date(
        &self,
        date: EffectiveDate,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<CurrencyRate>, RepoError>;

    /// Distinct effective dates that have at least one non-null rate.
    async fn list_available_dates(&self) -> Result<Vec<EffectiveDate>, RepoError>;

    /// Inserts or replaces the rate for `(currency_id, date)` and returns the
    /// stored row.
    async fn upsert_rate(
        &self,
        currency_id: CurrencyId,
        date: EffectiveDate,
        value: RateValue,
    ) -> Result<Rate, RepoError>;
}
