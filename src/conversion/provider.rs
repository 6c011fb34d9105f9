//! Rate provider trait

use super::context::RateType;
use super::exchange_rate::ExchangeRate;
use super::query::ConversionQuery;
use crate::currency::CurrencyUnit;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a provider answers requests for the reverse of a known rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversalPolicy {
    /// Only independently quoted reverse rates are returned
    #[default]
    Quoted,
    /// Missing reverse rates are computed as `1 / factor`
    Arithmetic,
}

/// Source of exchange rates
///
/// Implementations must be safe to share between threads; caching, retries
/// and any I/O are their own business.
pub trait RateProvider: Send + Sync {
    /// Unique provider name, stored in the context of every rate it returns
    fn name(&self) -> &str;

    /// Category of the rates this provider returns
    fn rate_type(&self) -> RateType;

    /// Look up the rate answering `query`
    fn exchange_rate_for(&self, query: &ConversionQuery) -> Result<ExchangeRate>;

    /// Reverse rate (term to base) for a rate obtained from this provider
    fn reversed(&self, rate: &ExchangeRate) -> Result<ExchangeRate>;

    /// Latest rate from `base` to `term`
    fn exchange_rate(&self, base: &CurrencyUnit, term: &CurrencyUnit) -> Result<ExchangeRate> {
        self.exchange_rate_for(&ConversionQuery::new(base.clone(), term.clone()))
    }

    /// Whether `query` can be answered
    fn is_available(&self, query: &ConversionQuery) -> bool {
        self.exchange_rate_for(query).is_ok()
    }

    /// Look up several pairs at once, failing on the first missing rate
    fn exchange_rates(
        &self,
        pairs: &[(CurrencyUnit, CurrencyUnit)],
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<ExchangeRate>> {
        pairs
            .iter()
            .map(|(base, term)| {
                let mut query = ConversionQuery::new(base.clone(), term.clone());
                query.timestamp = timestamp;
                self.exchange_rate_for(&query)
            })
            .collect()
    }
}
