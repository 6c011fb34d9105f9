//! Error types for rusty_fx

use crate::currency::CurrencyUnit;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for rusty_fx
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Cannot derive an exchange rate from an empty chain")]
    EmptyChain,

    #[error("Broken rate chain at position {position}: expected base {expected}, found {found}")]
    BrokenChain {
        position: usize,
        expected: CurrencyUnit,
        found: CurrencyUnit,
    },

    #[error("Invalid factor: {0}")]
    InvalidFactor(String),

    #[error(
        "No exchange rate available for {base}/{term} (provider: {}, at: {})",
        describe_provider(.provider),
        describe_timestamp(.timestamp)
    )]
    RateUnavailable {
        base: CurrencyUnit,
        term: CurrencyUnit,
        provider: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    },

    #[error("Unknown rate provider: {0}")]
    UnknownProvider(String),

    #[error("Rate provider already registered: {0}")]
    DuplicateProvider(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl FxError {
    /// Build a `RateUnavailable` error for a currency pair
    pub fn unavailable(
        base: &CurrencyUnit,
        term: &CurrencyUnit,
        provider: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        FxError::RateUnavailable {
            base: base.clone(),
            term: term.clone(),
            provider: provider.map(str::to_string),
            timestamp,
        }
    }
}

fn describe_provider(provider: &Option<String>) -> &str {
    provider.as_deref().unwrap_or("any")
}

fn describe_timestamp(timestamp: &Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(dt) => dt.to_rfc3339(),
        None => "latest".to_string(),
    }
}

/// Result type alias for rusty_fx operations
pub type Result<T> = std::result::Result<T, FxError>;
