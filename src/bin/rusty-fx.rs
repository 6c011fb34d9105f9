//! rusty-fx CLI - query exchange rates from configured static providers
//!
//! ## Example Usage
//!
//! ```bash
//! # Latest EUR/USD rate from the default provider chain
//! rusty-fx rate EUR USD
//!
//! # Historic rate from one provider, as JSON
//! rusty-fx rate CHF USD --provider ecb --at 2024-01-02T00:00:00Z --json
//!
//! # Convert an amount
//! rusty-fx convert 250.00 GBP JPY
//!
//! # List providers
//! rusty-fx providers
//! ```

use anyhow::{Context as _, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rusty_fx::config::RatesConfig;
use rusty_fx::conversion::{ConversionQuery, ExchangeRate, ProviderRegistry};
use rusty_fx::currency::CurrencyUnit;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

/// rusty-fx: exchange rates with derived rate chains
#[derive(Parser)]
#[command(name = "rusty-fx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query exchange rates from configured providers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the exchange rate between two currencies
    Rate {
        /// Base currency code
        base: String,

        /// Term currency code
        term: String,

        /// Providers to ask, in order (default chain if omitted)
        #[arg(short = 'p', long = "provider")]
        providers: Vec<String>,

        /// Rate in effect at this RFC 3339 timestamp
        #[arg(long)]
        at: Option<String>,

        /// Print the rate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an amount between currencies
    Convert {
        /// Amount in the base currency
        amount: String,

        /// Base currency code
        base: String,

        /// Term currency code
        term: String,

        /// Providers to ask, in order (default chain if omitted)
        #[arg(short = 'p', long = "provider")]
        providers: Vec<String>,

        /// Rate in effect at this RFC 3339 timestamp
        #[arg(long)]
        at: Option<String>,
    },

    /// List registered providers
    Providers,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rusty-fx").join("config.toml"))
}

fn load_config(path: Option<&Path>) -> Result<RatesConfig> {
    if let Some(config_path) = path {
        return RatesConfig::load(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()));
    }

    match default_config_path() {
        Some(default_path) if default_path.exists() => RatesConfig::load(&default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display())),
        _ => {
            log::warn!("No configuration found, only identity rates are available");
            Ok(RatesConfig::default())
        }
    }
}

fn build_query(
    base: &str,
    term: &str,
    providers: Vec<String>,
    at: Option<&str>,
) -> Result<ConversionQuery> {
    let mut query = ConversionQuery::new(CurrencyUnit::from_str(base)?, CurrencyUnit::from_str(term)?)
        .with_providers(providers);
    if let Some(at) = at {
        let ts = DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("Invalid timestamp: {}", at))?
            .with_timezone(&Utc);
        query = query.at(ts);
    }
    Ok(query)
}

fn print_rate(rate: &ExchangeRate, verbose: bool) {
    println!(
        "{} {} = {} {}",
        "1".bold(),
        rate.base_currency().code().cyan(),
        rate.factor().to_string().green().bold(),
        rate.currency().code().cyan()
    );
    println!("  {} {}", "Provider:".bold(), rate.context());

    if rate.is_derived() {
        println!("  {}", "Derived from:".bold());
        for link in rate.exchange_rate_chain() {
            println!(
                "    {}/{} {} [{}]",
                link.base_currency(),
                link.currency(),
                link.factor(),
                link.context()
            );
        }
    } else if verbose {
        println!("  {} direct quote", "Chain:".bold());
    }
}

fn run_rate(
    registry: &ProviderRegistry,
    query: &ConversionQuery,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let rate = registry.exchange_rate_for(query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rate)?);
    } else {
        print_rate(&rate, verbose);
    }
    Ok(())
}

fn run_convert(registry: &ProviderRegistry, amount: &str, query: &ConversionQuery) -> Result<()> {
    let amount = BigDecimal::from_str(amount).with_context(|| format!("Invalid amount: {}", amount))?;
    let rate = registry.exchange_rate_for(query)?;
    let converted = rate.convert(&amount);

    println!(
        "{} {} = {} {}",
        amount,
        rate.base_currency().code().cyan(),
        converted.to_string().green().bold(),
        rate.currency().code().cyan()
    );
    println!("  {} {} ({})", "Rate:".bold(), rate.factor(), rate.context());
    Ok(())
}

fn run_providers(registry: &ProviderRegistry) -> Result<()> {
    println!("{}", "Registered providers:".bold());
    for name in registry.provider_names() {
        let provider = registry.provider(name)?;
        println!("  {} {}", name.green(), format!("({})", provider.rate_type()).dimmed());
    }
    println!(
        "{} {}",
        "Default chain:".bold(),
        registry.default_chain().join(" -> ")
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = config.build_registry()?;

    match cli.command {
        Commands::Rate {
            base,
            term,
            providers,
            at,
            json,
        } => {
            let query = build_query(&base, &term, providers, at.as_deref())?;
            run_rate(&registry, &query, json, cli.verbose)
        }
        Commands::Convert {
            amount,
            base,
            term,
            providers,
            at,
        } => {
            let query = build_query(&base, &term, providers, at.as_deref())?;
            run_convert(&registry, &amount, &query)
        }
        Commands::Providers => run_providers(&registry),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
