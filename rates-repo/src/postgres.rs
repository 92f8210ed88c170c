//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use rates_types::{
    Currency, CurrencyCode, CurrencyId, CurrencyRate, EffectiveDate, Rate, RateRepository,
    RateValue, RepoError,
};

use crate::types::{DbCurrency, DbCurrencyRate, DbRate, parse_date, sql_offset};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository. Dates are `DATE`, rates are `NUMERIC(15,4)`; both
/// are read back as text so the row types match the SQLite adapter.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currencies_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_rates_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for PostgresRepo {
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
            sqlx::query_as(r#"SELECT id, code FROM currencies WHERE code = $1"#)
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn register_currencies(&self, codes: &[CurrencyCode]) -> Result<u64, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let mut created = 0;
        for code in codes {
            let result = sqlx::query(
                r#"INSERT INTO currencies (code) VALUES ($1) ON CONFLICT (code) DO NOTHING"#,
            )
            .bind(code.as_str())
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
            sqlx::query_scalar(r#"SELECT MAX(effective_date)::TEXT FROM rates"#)
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
            r#"SELECT c.code AS code, r.rate::TEXT AS rate
               FROM currencies c
               LEFT JOIN rates r ON r.currency_id = c.id AND r.effective_date = $1
               ORDER BY c.id ASC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(date.as_naive())
        .bind(i64::from(limit))
        .bind(sql_offset(offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrencyRate::into_domain).collect()
    }

    async fn list_available_dates(&self) -> Result<Vec<EffectiveDate>, RepoError> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"SELECT DISTINCT effective_date::TEXT FROM rates
               WHERE rate IS NOT NULL
               ORDER BY 1 ASC"#,
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
        let row: DbRate = sqlx::query_as(
            r#"INSERT INTO rates (currency_id, effective_date, rate, created_at, updated_at)
               VALUES ($1, $2, $3::NUMERIC(15, 4), $4, $4)
               ON CONFLICT (currency_id, effective_date)
               DO UPDATE SET rate = EXCLUDED.rate, updated_at = EXCLUDED.updated_at
               RETURNING currency_id, effective_date::TEXT AS effective_date, rate::TEXT AS rate"#,
        )
        .bind(currency_id.value())
        .bind(date.as_naive())
        .bind(value.to_string())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain()
    }
}
