//! Identity rate provider
//!
//! Answers only same-currency queries (factor 1). Useful as the last entry
//! of a provider chain and as a guard in single-currency setups: any
//! cross-currency lookup fails with a descriptive error.

use super::context::{ConversionContext, RateType};
use super::exchange_rate::{ExchangeRate, ExchangeRateBuilder};
use super::provider::RateProvider;
use super::query::ConversionQuery;
use crate::error::{FxError, Result};
use bigdecimal::BigDecimal;
use num_traits::One;

/// Provider name used when none is given
pub const IDENTITY_PROVIDER: &str = "identity";

/// Same-currency-only rate provider
#[derive(Debug, Clone)]
pub struct IdentityRateProvider {
    name: String,
}

impl IdentityRateProvider {
    pub fn new() -> Self {
        Self {
            name: IDENTITY_PROVIDER.to_string(),
        }
    }

    /// Create with a custom provider name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IdentityRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RateProvider for IdentityRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn rate_type(&self) -> RateType {
        RateType::Other
    }

    fn exchange_rate_for(&self, query: &ConversionQuery) -> Result<ExchangeRate> {
        if !query.is_identity() {
            return Err(FxError::unavailable(
                &query.base,
                &query.term,
                Some(&self.name),
                query.timestamp,
            ));
        }

        let mut context = ConversionContext::new(self.name.clone(), RateType::Other);
        context.timestamp = query.timestamp;
        ExchangeRateBuilder::from_context(context)
            .with_base_currency(query.base.clone())
            .with_term_currency(query.term.clone())
            .with_factor(BigDecimal::one())
            .build()
    }

    fn reversed(&self, rate: &ExchangeRate) -> Result<ExchangeRate> {
        let mut query = ConversionQuery::new(rate.currency().clone(), rate.base_currency().clone());
        query.timestamp = rate.context().timestamp;
        self.exchange_rate_for(&query)
    }

    fn is_available(&self, query: &ConversionQuery) -> bool {
        query.is_identity()
    }
}
