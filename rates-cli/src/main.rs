//! Rates CLI
//!
//! Command-line interface for the Exchange Rates API.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use rates_client::{Paging, RatesClient};
use rates_types::{EffectiveDate, RateValue};

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Exchange Rates API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Exchange Rates API
    #[arg(long, env = "RATES_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rates for the latest date that has any rate
    Latest {
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Rates for a given date
    Date {
        /// Effective date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        date: EffectiveDate,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// List dates with at least one rate
    Dates,
    /// Insert or replace a rate
    Upsert {
        /// Effective date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        date: EffectiveDate,
        /// Currency code from the catalog
        #[arg(long)]
        currency: String,
        /// Positive rate, rounded to four decimal places
        #[arg(long, value_parser = parse_rate)]
        value: RateValue,
    },
    /// List the currency catalog
    Currencies,
    /// Check API health
    Health,
}

#[derive(Args)]
struct PagingArgs {
    /// Page number, starting at 1
    #[arg(long)]
    page: Option<u32>,
    /// Page size (1-100)
    #[arg(long)]
    limit: Option<u32>,
}

impl From<PagingArgs> for Paging {
    fn from(args: PagingArgs) -> Self {
        Paging::new(args.page, args.limit)
    }
}

fn parse_date(s: &str) -> Result<EffectiveDate, String> {
    EffectiveDate::parse_compact(s).map_err(|e| e.to_string())
}

fn parse_rate(s: &str) -> Result<RateValue, String> {
    RateValue::parse(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = RatesClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Latest { paging } => {
            let page = client.latest_rates(paging.into()).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }

        Commands::Date { date, paging } => {
            let page = client.rates_for_date(date, paging.into()).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }

        Commands::Dates => {
            let dates = client.available_dates().await?;
            println!("{}", serde_json::to_string_pretty(&dates)?);
        }

        Commands::Upsert {
            date,
            currency,
            value,
        } => {
            let stored = client.upsert_rate(date, &currency, value).await?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }

        Commands::Currencies => {
            let currencies = client.currencies().await?;
            println!("{}", serde_json::to_string_pretty(&currencies)?);
        }
    }

    Ok(())
}
