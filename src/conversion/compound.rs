//! Compound rate provider - first successful answer from an ordered list

use super::context::RateType;
use super::exchange_rate::ExchangeRate;
use super::provider::RateProvider;
use super::query::ConversionQuery;
use crate::error::{FxError, Result};
use std::sync::Arc;

/// Tries its providers in order and returns the first rate found
///
/// When a query names providers, only those members are asked, in the
/// query's order.
#[derive(Clone)]
pub struct CompoundRateProvider {
    name: String,
    providers: Vec<Arc<dyn RateProvider>>,
}

impl CompoundRateProvider {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        let name = format!("compound[{}]", names.join(","));
        Self { name, providers }
    }

    /// Names of the member providers, in lookup order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn candidates(&self, query: &ConversionQuery) -> Result<Vec<&Arc<dyn RateProvider>>> {
        if query.providers.is_empty() {
            return Ok(self.providers.iter().collect());
        }

        query
            .providers
            .iter()
            .map(|name| {
                self.providers
                    .iter()
                    .find(|p| p.name() == name)
                    .ok_or_else(|| FxError::UnknownProvider(name.clone()))
            })
            .collect()
    }
}

impl std::fmt::Debug for CompoundRateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundRateProvider")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl RateProvider for CompoundRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Rate type of the first member, `Other` when empty
    fn rate_type(&self) -> RateType {
        self.providers
            .first()
            .map_or(RateType::Other, |p| p.rate_type())
    }

    fn exchange_rate_for(&self, query: &ConversionQuery) -> Result<ExchangeRate> {
        for provider in self.candidates(query)? {
            match provider.exchange_rate_for(query) {
                Ok(rate) => return Ok(rate),
                Err(e) => log::debug!("{} could not answer {}: {}", provider.name(), query, e),
            }
        }

        Err(FxError::unavailable(
            &query.base,
            &query.term,
            Some(&self.name),
            query.timestamp,
        ))
    }

    /// Delegates to the member that produced `rate`, else tries all members
    fn reversed(&self, rate: &ExchangeRate) -> Result<ExchangeRate> {
        let origin = &rate.context().provider;
        if let Some(provider) = self.providers.iter().find(|p| p.name() == origin) {
            return provider.reversed(rate);
        }

        for provider in &self.providers {
            if let Ok(reversed) = provider.reversed(rate) {
                return Ok(reversed);
            }
        }

        Err(FxError::unavailable(
            rate.currency(),
            rate.base_currency(),
            Some(&self.name),
            rate.context().timestamp,
        ))
    }
}
