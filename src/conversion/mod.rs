//! Exchange rates and rate providers
//!
//! # Components
//!
//! - **context**: Rate metadata (provider name, rate type, timestamps)
//! - **exchange_rate**: The `ExchangeRate` value type, its builder, derivation
//! - **query**: Lookup requests
//! - **provider**: The `RateProvider` trait
//! - **in_memory**: Table-backed provider with forward-fill and cross rates
//! - **identity**: Same-currency-only provider
//! - **compound**: Ordered fallback over several providers
//! - **registry**: Named providers and the default lookup order
//! - **converter**: Amount conversion helpers
//!
//! # Example
//!
//! ```rust
//! use rusty_fx::conversion::{ExchangeRate, ExchangeRateBuilder, ConversionContext, RateType};
//! use bigdecimal::BigDecimal;
//! use std::str::FromStr;
//!
//! let chf_eur = ExchangeRateBuilder::new("myProvider", RateType::Deferred)
//!     .with_base_currency("CHF")
//!     .with_term_currency("EUR")
//!     .with_factor(BigDecimal::from_str("0.8").unwrap())
//!     .build()
//!     .unwrap();
//! let eur_usd = ExchangeRateBuilder::new("myProvider", RateType::Deferred)
//!     .with_base_currency("EUR")
//!     .with_term_currency("USD")
//!     .with_factor(BigDecimal::from_str("1.4").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let chf_usd = ExchangeRate::derive(
//!     &[chf_eur.clone(), eur_usd.clone()],
//!     ConversionContext::new("myProvider", RateType::Deferred),
//! )
//! .unwrap();
//!
//! assert_eq!(chf_usd.factor(), &BigDecimal::from_str("1.12").unwrap());
//! assert_eq!(chf_usd.exchange_rate_chain(), &[chf_eur, eur_usd]);
//! ```

pub mod compound;
pub mod context;
pub mod converter;
pub mod exchange_rate;
pub mod identity;
pub mod in_memory;
pub mod provider;
pub mod query;
pub mod registry;

pub use compound::CompoundRateProvider;
pub use context::{ConversionContext, RateType};
pub use converter::{convert_amount, convert_amounts, total_value, CurrencyConversion};
pub use exchange_rate::{ExchangeRate, ExchangeRateBuilder};
pub use identity::{IdentityRateProvider, IDENTITY_PROVIDER};
pub use in_memory::InMemoryRateProvider;
pub use provider::{RateProvider, ReversalPolicy};
pub use query::ConversionQuery;
pub use registry::ProviderRegistry;
