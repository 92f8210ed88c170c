//! Configuration loading from environment.

use std::env;
use std::net::IpAddr;

use rates_types::CurrencyCode;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rate_limit_per_minute: u32,
    /// Peers allowed to name the client through `X-Forwarded-For`
    pub trusted_proxies: Vec<IpAddr>,
    /// Codes registered in the catalog at startup, if not already present
    pub seed_currencies: Vec<CurrencyCode>,
    /// OTLP collector endpoint; span export is off when unset
    pub otel_endpoint: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT {:?}: {}", raw, e))?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rate_limit_per_minute = match lookup("RATE_LIMIT_PER_MINUTE") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid RATE_LIMIT_PER_MINUTE {:?}: {}", raw, e))?,
            None => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        let trusted_proxies = lookup("TRUSTED_PROXIES")
            .map(|raw| parse_proxies(&raw))
            .transpose()?
            .unwrap_or_default();

        let seed_currencies = lookup("SEED_CURRENCIES")
            .map(|raw| parse_codes(&raw))
            .transpose()?
            .unwrap_or_default();

        let otel_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.trim().is_empty());

        let log_json = lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            port,
            database_url,
            rate_limit_per_minute,
            trusted_proxies,
            seed_currencies,
            otel_endpoint,
            log_json,
        })
    }
}

/// Parses a comma-separated list of currency codes, skipping blanks.
fn parse_codes(raw: &str) -> anyhow::Result<Vec<CurrencyCode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| CurrencyCode::parse(s).map_err(|e| anyhow::anyhow!("SEED_CURRENCIES: {}", e)))
        .collect()
}

fn parse_proxies(raw: &str) -> anyhow::Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|e| anyhow::anyhow!("TRUSTED_PROXIES {:?}: {}", s, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite://rates.db")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.rate_limit_per_minute, 100);
        assert!(config.seed_currencies.is_empty());
        assert!(config.trusted_proxies.is_empty());
        assert!(config.otel_endpoint.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/rates"),
            ("PORT", "8080"),
            ("RATE_LIMIT_PER_MINUTE", "5"),
            ("SEED_CURRENCIES", "usd, EUR,,jpy"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
            ("LOG_FORMAT", "JSON"),
            ("TRUSTED_PROXIES", "10.0.0.1, ::1"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit_per_minute, 5);
        let codes: Vec<&str> = config.seed_currencies.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["USD", "EUR", "JPY"]);
        assert_eq!(
            config.otel_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
        assert!(config.log_json);
        assert_eq!(
            config.trusted_proxies,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(load(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("RATE_LIMIT_PER_MINUTE", "-1")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("SEED_CURRENCIES", "US-D")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("TRUSTED_PROXIES", "proxy.local")]).is_err());
    }
}
