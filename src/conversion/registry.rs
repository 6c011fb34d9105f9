//! Provider registry
//!
//! An explicit collection of named rate providers plus a default lookup
//! order. Callers build one and pass it where rates are needed; there is no
//! process-wide provider state.

use super::compound::CompoundRateProvider;
use super::exchange_rate::ExchangeRate;
use super::provider::RateProvider;
use super::query::ConversionQuery;
use crate::currency::CurrencyUnit;
use crate::error::{FxError, Result};
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named rate providers and the default order to consult them in
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn RateProvider>>,
    /// Registration order
    order: Vec<String>,
    default_chain: Vec<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name
    pub fn register(&mut self, provider: Arc<dyn RateProvider>) -> Result<()> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(FxError::DuplicateProvider(name));
        }

        log::info!("Registered rate provider {} ({})", name, provider.rate_type());
        self.order.push(name.clone());
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Get a provider by name
    pub fn provider(&self, name: &str) -> Result<Arc<dyn RateProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| FxError::UnknownProvider(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Provider names in registration order
    pub fn provider_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Set the providers consulted when a query names none
    pub fn set_default_chain<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = names.iter().find(|name| !self.contains(name)) {
            return Err(FxError::UnknownProvider(unknown.clone()));
        }
        self.default_chain = names;
        Ok(())
    }

    /// Default lookup order; registration order unless set explicitly
    pub fn default_chain(&self) -> Vec<&str> {
        if self.default_chain.is_empty() {
            self.provider_names()
        } else {
            self.default_chain.iter().map(String::as_str).collect()
        }
    }

    /// Compound provider over the named providers, in the given order
    pub fn compound<S: AsRef<str>>(&self, names: &[S]) -> Result<CompoundRateProvider> {
        let providers = names
            .iter()
            .map(|name| self.provider(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompoundRateProvider::new(providers))
    }

    /// Compound provider over the default chain
    pub fn default_provider(&self) -> Result<CompoundRateProvider> {
        self.compound(&self.default_chain())
    }

    /// Answer a query from its named providers, or from the default chain
    pub fn exchange_rate_for(&self, query: &ConversionQuery) -> Result<ExchangeRate> {
        let provider = if query.providers.is_empty() {
            self.default_provider()?
        } else {
            self.compound(&query.providers)?
        };
        provider.exchange_rate_for(query)
    }

    /// Latest rate from `base` to `term` using the default chain
    pub fn exchange_rate(&self, base: &CurrencyUnit, term: &CurrencyUnit) -> Result<ExchangeRate> {
        self.exchange_rate_for(&ConversionQuery::new(base.clone(), term.clone()))
    }

    pub fn is_available(&self, query: &ConversionQuery) -> bool {
        self.exchange_rate_for(query).is_ok()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.order)
            .field("default_chain", &self.default_chain())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{IdentityRateProvider, InMemoryRateProvider, RateType};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn static_provider(name: &str, factor: &str) -> Arc<dyn RateProvider> {
        let p = InMemoryRateProvider::new(name, RateType::Deferred);
        p.add_rate(
            CurrencyUnit::new("EUR"),
            CurrencyUnit::new("USD"),
            BigDecimal::from_str(factor).unwrap(),
            None,
        )
        .unwrap();
        Arc::new(p)
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(static_provider("ecb", "1.10")).unwrap();
        registry.register(static_provider("imf", "1.11")).unwrap();
        registry
            .register(Arc::new(IdentityRateProvider::new()))
            .unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.provider_names(), vec!["ecb", "imf", "identity"]);
        assert_eq!(registry.provider("imf").unwrap().name(), "imf");
        assert!(matches!(
            registry.provider("nope"),
            Err(FxError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        let result = registry.register(static_provider("ecb", "2"));
        assert!(matches!(result, Err(FxError::DuplicateProvider(name)) if name == "ecb"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_default_chain() {
        let mut registry = registry();
        assert_eq!(registry.default_chain(), vec!["ecb", "imf", "identity"]);

        let rate = registry
            .exchange_rate(&CurrencyUnit::new("EUR"), &CurrencyUnit::new("USD"))
            .unwrap();
        assert_eq!(rate.context().provider, "ecb");

        registry.set_default_chain(["imf", "identity"]).unwrap();
        let rate = registry
            .exchange_rate(&CurrencyUnit::new("EUR"), &CurrencyUnit::new("USD"))
            .unwrap();
        assert_eq!(rate.context().provider, "imf");

        assert!(registry.set_default_chain(["missing"]).is_err());
        assert_eq!(registry.default_chain(), vec!["imf", "identity"]);
    }

    #[test]
    fn test_query_names_providers() {
        let registry = registry();
        let query = ConversionQuery::new("EUR", "USD").with_providers(["imf"]);
        assert_eq!(registry.exchange_rate_for(&query).unwrap().context().provider, "imf");

        let unknown = ConversionQuery::new("EUR", "USD").with_providers(["boe"]);
        assert!(matches!(
            registry.exchange_rate_for(&unknown),
            Err(FxError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_identity_fallback() {
        let registry = registry();
        let rate = registry
            .exchange_rate(&CurrencyUnit::new("JPY"), &CurrencyUnit::new("JPY"))
            .unwrap();
        assert_eq!(*rate.factor(), BigDecimal::from(1));
        assert!(!registry.is_available(&ConversionQuery::new("JPY", "GBP")));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.exchange_rate(&CurrencyUnit::new("EUR"), &CurrencyUnit::new("USD")),
            Err(FxError::RateUnavailable { .. })
        ));
    }
}
