//! # rusty_fx
//!
//! Exchange-rate value types for currency conversion.
//!
//! An [`ExchangeRate`](conversion::ExchangeRate) carries a base currency, a
//! term currency, an arbitrary-precision factor and the context of the
//! provider that produced it. Rates can be composed into derived rates
//! through intermediate currencies; the derived rate keeps the chain it was
//! built from.
//!
//! Rates come from [`RateProvider`](conversion::RateProvider)s, which are
//! collected in an explicit [`ProviderRegistry`](conversion::ProviderRegistry)
//! rather than looked up from global state.
//!
//! ## Example
//!
//! ```rust
//! use rusty_fx::prelude::*;
//! use bigdecimal::BigDecimal;
//! use std::str::FromStr;
//! use std::sync::Arc;
//!
//! let ecb = InMemoryRateProvider::new("ecb", RateType::Historic)
//!     .with_reversal(ReversalPolicy::Arithmetic)
//!     .with_pivot(CurrencyUnit::new("EUR"));
//! ecb.add_rate("EUR".into(), "USD".into(), BigDecimal::from_str("1.10").unwrap(), None)
//!     .unwrap();
//! ecb.add_rate("EUR".into(), "CHF".into(), BigDecimal::from_str("0.95").unwrap(), None)
//!     .unwrap();
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(Arc::new(ecb)).unwrap();
//!
//! // No direct CHF/USD quote: derived through EUR
//! let rate = registry
//!     .exchange_rate(&CurrencyUnit::new("CHF"), &CurrencyUnit::new("USD"))
//!     .unwrap();
//! assert!(rate.is_derived());
//! assert_eq!(rate.exchange_rate_chain().len(), 2);
//! ```

pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::RatesConfig;
    pub use crate::conversion::{
        CompoundRateProvider, ConversionContext, ConversionQuery, CurrencyConversion,
        ExchangeRate, ExchangeRateBuilder, IdentityRateProvider, InMemoryRateProvider,
        ProviderRegistry, RateProvider, RateType, ReversalPolicy,
    };
    pub use crate::currency::CurrencyUnit;
    pub use crate::error::{FxError, Result};
}
