//! Amount conversion helpers
//!
//! Amounts are plain `BigDecimal` values multiplied by the rate factor; no
//! rounding is applied here.

use super::exchange_rate::ExchangeRate;
use super::provider::RateProvider;
use super::query::ConversionQuery;
use crate::currency::CurrencyUnit;
use crate::error::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;

/// Convert an amount from one currency to another
///
/// # Example
/// ```
/// use rusty_fx::conversion::{convert_amount, InMemoryRateProvider, RateType};
/// use rusty_fx::currency::CurrencyUnit;
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let provider = InMemoryRateProvider::new("static", RateType::Deferred);
/// provider
///     .add_rate("EUR".into(), "USD".into(), BigDecimal::from_str("1.2").unwrap(), None)
///     .unwrap();
///
/// let usd = convert_amount(
///     &provider,
///     &BigDecimal::from(100),
///     &CurrencyUnit::new("EUR"),
///     &CurrencyUnit::new("USD"),
///     None,
/// )
/// .unwrap();
/// assert_eq!(usd, BigDecimal::from(120));
/// ```
pub fn convert_amount<R: RateProvider + ?Sized>(
    provider: &R,
    amount: &BigDecimal,
    from: &CurrencyUnit,
    to: &CurrencyUnit,
    timestamp: Option<DateTime<Utc>>,
) -> Result<BigDecimal> {
    let mut query = ConversionQuery::new(from.clone(), to.clone());
    query.timestamp = timestamp;
    let rate = provider.exchange_rate_for(&query)?;
    Ok(rate.convert(amount))
}

/// Convert several amounts into one target currency
pub fn convert_amounts<R: RateProvider + ?Sized>(
    provider: &R,
    amounts: &[(BigDecimal, CurrencyUnit)],
    to: &CurrencyUnit,
    timestamp: Option<DateTime<Utc>>,
) -> Result<Vec<BigDecimal>> {
    amounts
        .iter()
        .map(|(amount, from)| convert_amount(provider, amount, from, to, timestamp))
        .collect()
}

/// Sum of amounts in mixed currencies, expressed in `to`
pub fn total_value<R: RateProvider + ?Sized>(
    provider: &R,
    amounts: &[(BigDecimal, CurrencyUnit)],
    to: &CurrencyUnit,
    timestamp: Option<DateTime<Utc>>,
) -> Result<BigDecimal> {
    let converted = convert_amounts(provider, amounts, to, timestamp)?;
    Ok(converted
        .iter()
        .fold(BigDecimal::zero(), |acc, amount| acc + amount))
}

/// Conversion into a fixed term currency through one provider
pub struct CurrencyConversion<'a, R: RateProvider + ?Sized> {
    provider: &'a R,
    term: CurrencyUnit,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a, R: RateProvider + ?Sized> CurrencyConversion<'a, R> {
    pub fn new(provider: &'a R, term: CurrencyUnit) -> Self {
        Self {
            provider,
            term,
            timestamp: None,
        }
    }

    /// Convert with rates in effect at `timestamp`
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn term_currency(&self) -> &CurrencyUnit {
        &self.term
    }

    /// Rate used to convert from `base`
    pub fn exchange_rate(&self, base: &CurrencyUnit) -> Result<ExchangeRate> {
        let mut query = ConversionQuery::new(base.clone(), self.term.clone());
        query.timestamp = self.timestamp;
        self.provider.exchange_rate_for(&query)
    }

    pub fn convert(&self, amount: &BigDecimal, base: &CurrencyUnit) -> Result<BigDecimal> {
        Ok(self.exchange_rate(base)?.convert(amount))
    }
}
