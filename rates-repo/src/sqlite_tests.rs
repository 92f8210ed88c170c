//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rates_types::{
        CurrencyCode, CurrencyId, EffectiveDate, RateRepository, RateValue, RepoError,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn codes(raw: &[&str]) -> Vec<CurrencyCode> {
        raw.iter().map(|c| CurrencyCode::parse(c).unwrap()).collect()
    }

    fn date(raw: &str) -> EffectiveDate {
        EffectiveDate::parse_compact(raw).unwrap()
    }

    fn rate(raw: &str) -> RateValue {
        RateValue::parse(raw).unwrap()
    }

    async fn seeded_repo() -> SqliteRepo {
        let repo = setup_repo().await;
        repo.register_currencies(&codes(&["USD", "EUR", "JPY"]))
            .await
            .unwrap();
        repo
    }

    async fn currency_id(repo: &SqliteRepo, code: &str) -> CurrencyId {
        repo.find_currency_by_code(&CurrencyCode::parse(code).unwrap())
            .await
            .unwrap()
            .unwrap()
            .id
    }

    async fn count_rate_rows(repo: &SqliteRepo) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM rates")
            .fetch_one(repo.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_currencies_is_idempotent() {
        let repo = setup_repo().await;

        let created = repo
            .register_currencies(&codes(&["USD", "EUR"]))
            .await
            .unwrap();
        assert_eq!(created, 2);

        let created = repo
            .register_currencies(&codes(&["EUR", "JPY"]))
            .await
            .unwrap();
        assert_eq!(created, 1);

        assert_eq!(repo.count_currencies().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_currencies_in_insertion_order() {
        let repo = seeded_repo().await;

        let currencies = repo.list_currencies().await.unwrap();
        let listed: Vec<&str> = currencies.iter().map(|c| c.code.as_str()).collect();

        assert_eq!(listed, vec!["USD", "EUR", "JPY"]);
        assert!(currencies.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_find_currency_not_found() {
        let repo = seeded_repo().await;

        let result = repo
            .find_currency_by_code(&CurrencyCode::parse("XYZ").unwrap())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_latest_effective_date_empty_store() {
        let repo = seeded_repo().await;

        assert!(repo.latest_effective_date().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_effective_date() {
        let repo = seeded_repo().await;
        let usd = currency_id(&repo, "USD").await;
        let eur = currency_id(&repo, "EUR").await;

        repo.upsert_rate(usd, date("20250102"), rate("1.1"))
            .await
            .unwrap();
        repo.upsert_rate(eur, date("20241231"), rate("0.9"))
            .await
            .unwrap();
        repo.upsert_rate(usd, date("20250110"), rate("1.2"))
            .await
            .unwrap();

        let latest = repo.latest_effective_date().await.unwrap();
        assert_eq!(latest, Some(date("20250110")));
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let repo = seeded_repo().await;
        let usd = currency_id(&repo, "USD").await;

        let first = repo
            .upsert_rate(usd, date("20250101"), rate("1.2345"))
            .await
            .unwrap();
        assert_eq!(first.rate.to_string(), "1.2345");
        assert_eq!(first.currency_id, usd);
        assert_eq!(first.effective_date, date("20250101"));

        let second = repo
            .upsert_rate(usd, date("20250101"), rate("1.3"))
            .await
            .unwrap();
        assert_eq!(second.rate.to_string(), "1.3000");

        assert_eq!(count_rate_rows(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_upsert_same_value_twice_keeps_one_row() {
        let repo = seeded_repo().await;
        let usd = currency_id(&repo, "USD").await;

        for _ in 0..2 {
            repo.upsert_rate(usd, date("20250101"), rate("1.5"))
                .await
                .unwrap();
        }

        assert_eq!(count_rate_rows(&repo).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("rates.db").display());
        let repo = Arc::new(SqliteRepo::new(&url).await.unwrap());
        repo.register_currencies(&codes(&["USD"])).await.unwrap();
        let usd = currency_id(&repo, "USD").await;

        let mut handles = Vec::new();
        for i in 1..=8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert_rate(usd, date("20250101"), rate(&format!("1.{}", i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(count_rate_rows(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_upsert_unknown_currency_id_fails() {
        let repo = seeded_repo().await;

        let result = repo
            .upsert_rate(CurrencyId::new(999), date("20250101"), rate("1.0"))
            .await;

        assert!(matches!(result, Err(RepoError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_rates_for_date_left_joins() {
        let repo = seeded_repo().await;
        let usd = currency_id(&repo, "USD").await;
        let eur = currency_id(&repo, "EUR").await;

        repo.upsert_rate(usd, date("20250101"), rate("1.2345"))
            .await
            .unwrap();
        // A rate on another date must not leak into the page.
        repo.upsert_rate(eur, date("20250102"), rate("0.95"))
            .await
            .unwrap();

        let page = repo
            .list_rates_for_date(date("20250101"), 0, 2)
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].currency.as_str(), "USD");
        assert_eq!(page[0].rate.map(|r| r.to_string()), Some("1.2345".into()));
        assert_eq!(page[1].currency.as_str(), "EUR");
        assert!(page[1].rate.is_none());
    }

    #[tokio::test]
    async fn test_list_rates_for_date_windows_do_not_overlap() {
        let repo = seeded_repo().await;

        let first = repo
            .list_rates_for_date(date("20250101"), 0, 2)
            .await
            .unwrap();
        let second = repo
            .list_rates_for_date(date("20250101"), 2, 2)
            .await
            .unwrap();
        let beyond = repo
            .list_rates_for_date(date("20250101"), 4, 2)
            .await
            .unwrap();

        let seen: Vec<String> = first
            .iter()
            .chain(second.iter())
            .map(|s| s.currency.to_string())
            .collect();
        assert_eq!(seen, vec!["USD", "EUR", "JPY"]);
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_list_available_dates_distinct() {
        let repo = seeded_repo().await;
        let usd = currency_id(&repo, "USD").await;
        let eur = currency_id(&repo, "EUR").await;

        repo.upsert_rate(usd, date("20250102"), rate("1.1"))
            .await
            .unwrap();
        repo.upsert_rate(eur, date("20250102"), rate("0.9"))
            .await
            .unwrap();
        repo.upsert_rate(usd, date("20250101"), rate("1.0"))
            .await
            .unwrap();

        let dates = repo.list_available_dates().await.unwrap();
        let compact: Vec<String> = dates.iter().map(|d| d.to_string()).collect();

        assert_eq!(compact, vec!["20250101", "20250102"]);
    }

    #[tokio::test]
    async fn test_list_available_dates_empty() {
        let repo = seeded_repo().await;

        assert!(repo.list_available_dates().await.unwrap().is_empty());
    }
}
