//! Database row types shared by the SQLite and PostgreSQL adapters.
//!
//! Both adapters select dates as ISO `YYYY-MM-DD` text and rates as decimal
//! text, so one set of rows covers both backends.

use chrono::NaiveDate;
use sqlx::FromRow;

use rates_types::{
    Currency, CurrencyCode, CurrencyId, CurrencyRate, EffectiveDate, Rate, RateValue, RepoError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Currency row from database.
#[derive(FromRow)]
pub struct DbCurrency {
    pub id: i64,
    pub code: String,
}

/// Catalog slot joined with an optional rate.
#[derive(FromRow)]
pub struct DbCurrencyRate {
    pub code: String,
    pub rate: Option<String>,
}

/// Rate row returned by an upsert.
#[derive(FromRow)]
pub struct DbRate {
    pub currency_id: i64,
    pub effective_date: String,
    pub rate: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_date(s: &str) -> Result<EffectiveDate, RepoError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(EffectiveDate::new)
        .map_err(|e| RepoError::Database(format!("Unreadable effective_date {:?}: {}", s, e)))
}

pub fn parse_rate(s: &str) -> Result<RateValue, RepoError> {
    RateValue::parse(s).map_err(|_| RepoError::Database(format!("Unreadable rate {:?}", s)))
}

pub fn parse_code(s: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::parse(s)
        .map_err(|_| RepoError::Database(format!("Unreadable currency code {:?}", s)))
}

/// ISO form used for binding and storing dates.
pub fn iso_date(date: EffectiveDate) -> String {
    date.as_naive().format("%Y-%m-%d").to_string()
}

/// Converts a page offset to the signed integer SQL expects.
pub fn sql_offset(offset: u64) -> Result<i64, RepoError> {
    i64::try_from(offset)
        .map_err(|_| RepoError::Database(format!("Offset out of range: {}", offset)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbCurrency {
    pub fn into_domain(self) -> Result<Currency, RepoError> {
        Ok(Currency::new(CurrencyId::new(self.id), parse_code(&self.code)?))
    }
}

impl DbCurrencyRate {
    pub fn into_domain(self) -> Result<CurrencyRate, RepoError> {
        Ok(CurrencyRate {
            currency: parse_code(&self.code)?,
            rate: self.rate.as_deref().map(parse_rate).transpose()?,
        })
    }
}

impl DbRate {
    pub fn into_domain(self) -> Result<Rate, RepoError> {
        Ok(Rate {
            currency_id: CurrencyId::new(self.currency_id),
            effective_date: parse_date(&self.effective_date)?,
            rate: parse_rate(&self.rate)?,
        })
    }
}
