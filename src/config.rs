//! Registry configuration
//!
//! Describes static rate providers in TOML and turns them into a
//! [`ProviderRegistry`]:
//!
//! ```toml
//! default_chain = ["ecb-static", "identity"]
//!
//! [[providers]]
//! name = "ecb-static"
//! rate_type = "historic"
//! reversal = "arithmetic"
//! pivot = "EUR"
//! csv = "rates/ecb.csv"
//!
//! [[providers.rates]]
//! base = "EUR"
//! term = "USD"
//! factor = "1.0842"
//! timestamp = "2024-01-02T00:00:00Z"
//! ```
//!
//! Factors are strings so that no precision is lost on the way in.

use crate::conversion::{
    IdentityRateProvider, InMemoryRateProvider, ProviderRegistry, RateType, ReversalPolicy,
    IDENTITY_PROVIDER,
};
use crate::currency::CurrencyUnit;
use crate::error::{FxError, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Providers consulted when a query names none; registration order if empty
    #[serde(default)]
    pub default_chain: Vec<String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// Directory relative CSV paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// One static rate provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default = "default_rate_type")]
    pub rate_type: RateType,
    #[serde(default)]
    pub reversal: ReversalPolicy,
    #[serde(default)]
    pub pivot: Option<String>,
    #[serde(default)]
    pub csv: Option<PathBuf>,
    #[serde(default)]
    pub rates: Vec<RateEntry>,
}

/// Inline quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateEntry {
    pub base: String,
    pub term: String,
    pub factor: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_rate_type() -> RateType {
    RateType::Deferred
}

impl RatesConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: RatesConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; relative CSV paths resolve against its directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Check provider names and the default chain
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(FxError::ConfigError("Provider name must not be empty".to_string()));
            }
            if !names.insert(provider.name.as_str()) {
                return Err(FxError::ConfigError(format!(
                    "Duplicate provider name: {}",
                    provider.name
                )));
            }
        }

        for name in &self.default_chain {
            if name != IDENTITY_PROVIDER && !names.contains(name.as_str()) {
                return Err(FxError::ConfigError(format!(
                    "Default chain names unknown provider: {}",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Build a registry holding every configured provider
    ///
    /// An identity provider is added unless one named `identity` is configured.
    pub fn build_registry(&self) -> Result<ProviderRegistry> {
        self.validate()?;

        let mut registry = ProviderRegistry::new();
        for provider_config in &self.providers {
            let provider = self.build_provider(provider_config)?;
            registry.register(Arc::new(provider))?;
        }

        if !registry.contains(IDENTITY_PROVIDER) {
            registry.register(Arc::new(IdentityRateProvider::new()))?;
        }

        if !self.default_chain.is_empty() {
            registry.set_default_chain(self.default_chain.iter().cloned())?;
        }

        log::info!(
            "Built provider registry: {} (default chain: {})",
            registry.provider_names().join(", "),
            registry.default_chain().join(", ")
        );
        Ok(registry)
    }

    fn build_provider(&self, config: &ProviderConfig) -> Result<InMemoryRateProvider> {
        let mut provider = InMemoryRateProvider::new(config.name.clone(), config.rate_type)
            .with_reversal(config.reversal);
        if let Some(pivot) = &config.pivot {
            provider = provider.with_pivot(CurrencyUnit::from_str(pivot)?);
        }

        if let Some(csv_path) = &config.csv {
            let path = self.resolve_path(csv_path);
            provider.load_from_path(&path).map_err(|e| {
                FxError::ConfigError(format!(
                    "Provider {}: failed to load {}: {}",
                    config.name,
                    path.display(),
                    e
                ))
            })?;
        }

        let entries = config
            .rates
            .iter()
            .map(|entry| {
                let factor = BigDecimal::from_str(&entry.factor).map_err(|e| {
                    FxError::ParseError(format!(
                        "Provider {}: invalid factor for {}/{}: {}",
                        config.name, entry.base, entry.term, e
                    ))
                })?;
                Ok((
                    CurrencyUnit::from_str(&entry.base)?,
                    CurrencyUnit::from_str(&entry.term)?,
                    factor,
                    entry.timestamp,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        provider.add_rates(entries)?;

        if provider.num_entries() == 0 {
            log::warn!("Provider {} has no rates configured", config.name);
        }
        Ok(provider)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{ConversionQuery, RateProvider};

    const SAMPLE: &str = r#"
default_chain = ["ecb", "identity"]

[[providers]]
name = "ecb"
rate_type = "historic"
reversal = "arithmetic"
pivot = "EUR"

[[providers.rates]]
base = "EUR"
term = "USD"
factor = "1.0842"
timestamp = "2024-01-02T00:00:00Z"

[[providers.rates]]
base = "EUR"
term = "CHF"
factor = "0.9305"
"#;

    #[test]
    fn test_parse_config() {
        let config = RatesConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.default_chain, vec!["ecb", "identity"]);
        assert_eq!(config.providers.len(), 1);

        let ecb = &config.providers[0];
        assert_eq!(ecb.rate_type, RateType::Historic);
        assert_eq!(ecb.reversal, ReversalPolicy::Arithmetic);
        assert_eq!(ecb.pivot.as_deref(), Some("EUR"));
        assert_eq!(ecb.rates.len(), 2);
        assert!(ecb.rates[0].timestamp.is_some());
        assert!(ecb.rates[1].timestamp.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = RatesConfig::from_toml_str("[[providers]]\nname = \"p\"\n").unwrap();
        let p = &config.providers[0];
        assert_eq!(p.rate_type, RateType::Deferred);
        assert_eq!(p.reversal, ReversalPolicy::Quoted);
        assert!(p.pivot.is_none());
        assert!(config.default_chain.is_empty());
    }

    #[test]
    fn test_build_registry() {
        let registry = RatesConfig::from_toml_str(SAMPLE)
            .unwrap()
            .build_registry()
            .unwrap();

        assert_eq!(registry.provider_names(), vec!["ecb", "identity"]);

        // USD -> CHF via the EUR pivot, inverting EUR/USD
        let rate = registry
            .exchange_rate_for(&ConversionQuery::new("USD", "CHF"))
            .unwrap();
        assert!(rate.is_derived());
        assert_eq!(rate.context().provider, "ecb");
        assert_eq!(rate.context().rate_type, RateType::Historic);
    }

    #[test]
    fn test_validation_errors() {
        let duplicate = "[[providers]]\nname = \"a\"\n[[providers]]\nname = \"a\"\n";
        assert!(matches!(
            RatesConfig::from_toml_str(duplicate),
            Err(FxError::ConfigError(_))
        ));

        let unknown_default = "default_chain = [\"b\"]\n[[providers]]\nname = \"a\"\n";
        assert!(matches!(
            RatesConfig::from_toml_str(unknown_default),
            Err(FxError::ConfigError(_))
        ));

        let bad_type = "[[providers]]\nname = \"a\"\nrate_type = \"weekly\"\n";
        assert!(matches!(
            RatesConfig::from_toml_str(bad_type),
            Err(FxError::TomlError(_))
        ));
    }

    #[test]
    fn test_rate_type_is_case_insensitive() {
        let config =
            RatesConfig::from_toml_str("[[providers]]\nname = \"a\"\nrate_type = \"Historic\"\n")
                .unwrap();
        assert_eq!(config.providers[0].rate_type, RateType::Historic);
    }

    #[test]
    fn test_bad_factor() {
        let config = RatesConfig::from_toml_str(
            "[[providers]]\nname = \"a\"\n[[providers.rates]]\nbase = \"EUR\"\nterm = \"USD\"\nfactor = \"one\"\n",
        )
        .unwrap();
        assert!(matches!(config.build_registry(), Err(FxError::ParseError(_))));
    }

    #[test]
    fn test_configured_identity_is_kept() {
        let config = RatesConfig::from_toml_str("[[providers]]\nname = \"identity\"\n").unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.provider("identity").unwrap().rate_type(), RateType::Deferred);
    }
}
