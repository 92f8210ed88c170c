//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use rates_types::{
    Currency, CurrencyCode, CurrencyId, CurrencyRate, EffectiveDate, Rate, RateRepository,
    RateValue, RepoError,
};

use crate::types::{DbCurrency, DbCurrencyRate, DbRate, iso_date, parse_date, sql_offset};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Safe to run more than once.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for ddl in [
            include_str!("../migrations/0001_create_currencies.sql"),
            include_str!("../migrations/0002_create_rates.sql"),
        ] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for SqliteRepo {
    async fn count_currencies(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM currencies"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> =
            sqlx::query_as(r#"SELECT id, code FROM currencies ORDER BY id ASC"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn find_currency_by_code(
        &self,
        code: &CurrencyCode,
    ) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> =
            sqlx::query_as(r#"SELECT id, code FROM currencies WHERE code = ?"#)
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn register_currencies(&self, codes: &[CurrencyCode]) -> Result<u64, RepoError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let mut created = 0;
        for code in codes {
            let result = sqlx::query(
                r#"INSERT INTO currencies (code, created_at, updated_at) VALUES (?, ?, ?)
                   ON CONFLICT (code) DO NOTHING"#,
            )
            .bind(code.as_str())
            .bind(&now)
            .bind(&now)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            created += result.rows_affected();
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(requested = codes.len(), created, "registered currencies");
        Ok(created)
    }

    async fn latest_effective_date(&self) -> Result<Option<EffectiveDate>, RepoError> {
        let latest: Option<String> =
            sqlx::query_scalar(r#"SELECT MAX(effective_date) FROM rates"#)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        latest.as_deref().map(parse_date).transpose()
    }

    async fn list_rates_for_date(
        &self,
        date: EffectiveDate,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<CurrencyRate>, RepoError> {
        let rows: Vec<DbCurrencyRate> = sqlx::query_as(
            r#"SELECT c.code AS code, r.rate AS rate
               FROM currencies c
               LEFT JOIN rates r ON r.currency_id = c.id AND r.effective_date = ?
               ORDER BY c.id ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(iso_date(date))
        .bind(i64::from(limit))
        .bind(sql_offset(offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrencyRate::into_domain).collect()
    }

    async fn list_available_dates(&self) -> Result<Vec<EffectiveDate>, RepoError> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"SELECT DISTINCT effective_date FROM rates
               WHERE rate IS NOT NULL
               ORDER BY effective_date ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.iter().map(|d| parse_date(d)).collect()
    }

    async fn upsert_rate(
        &self,
        currency_id: CurrencyId,
        date: EffectiveDate,
        value: RateValue,
    ) -> Result<Rate, RepoError> {
        let now = chrono::Utc::now().to_rfc3339();

        let row: DbRate = sqlx::query_as(
            r#"INSERT INTO rates (currency_id, effective_date, rate, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (currency_id, effective_date)
               DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at
               RETURNING currency_id, effective_date, rate"#,
        )
        .bind(currency_id.value())
        .bind(iso_date(date))
        .bind(value.to_string())
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain()
    }
}
