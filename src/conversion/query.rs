//! Conversion queries - what a caller asks a rate provider for

use crate::currency::CurrencyUnit;
use chrono::{DateTime, Utc};
use std::fmt;

/// Request for an exchange rate between two currencies
///
/// Without a timestamp the latest known rate is requested. A non-empty
/// provider list restricts compound lookups to those providers, tried in the
/// given order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionQuery {
    pub base: CurrencyUnit,
    pub term: CurrencyUnit,
    pub timestamp: Option<DateTime<Utc>>,
    pub providers: Vec<String>,
}

impl ConversionQuery {
    /// Query the latest rate from any provider
    pub fn new(base: impl Into<CurrencyUnit>, term: impl Into<CurrencyUnit>) -> Self {
        Self {
            base: base.into(),
            term: term.into(),
            timestamp: None,
            providers: Vec::new(),
        }
    }

    /// Ask for the rate in effect at `timestamp`
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Restrict the lookup to the named providers
    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = providers.into_iter().map(Into::into).collect();
        self
    }

    /// Same query with base and term swapped
    pub fn reversed(&self) -> Self {
        Self {
            base: self.term.clone(),
            term: self.base.clone(),
            timestamp: self.timestamp,
            providers: self.providers.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.base == self.term
    }
}

impl fmt::Display for ConversionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.term)?;
        if let Some(ts) = self.timestamp {
            write!(f, " at {}", ts.to_rfc3339())?;
        }
        if !self.providers.is_empty() {
            write!(f, " via [{}]", self.providers.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_builder() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let query = ConversionQuery::new("EUR", "USD")
            .at(ts)
            .with_providers(["ecb", "imf"]);

        assert_eq!(query.base.code(), "EUR");
        assert_eq!(query.term.code(), "USD");
        assert_eq!(query.timestamp, Some(ts));
        assert_eq!(query.providers, vec!["ecb".to_string(), "imf".to_string()]);
        assert!(!query.is_identity());
    }

    #[test]
    fn test_reversed_query() {
        let query = ConversionQuery::new("EUR", "USD").with_providers(["ecb"]);
        let rev = query.reversed();

        assert_eq!(rev.base.code(), "USD");
        assert_eq!(rev.term.code(), "EUR");
        assert_eq!(rev.providers, query.providers);
    }

    #[test]
    fn test_display() {
        let query = ConversionQuery::new("EUR", "USD").with_providers(["ecb"]);
        assert_eq!(query.to_string(), "EUR/USD via [ecb]");
    }
}
