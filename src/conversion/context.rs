//! Conversion context - provider metadata attached to every exchange rate

use crate::error::{FxError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Freshness/semantics category of a rate quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RateType {
    /// Rate published with a delay
    Deferred,
    /// Live quote
    Realtime,
    /// Rate for a past date
    Historic,
    /// Anything else (e.g. identity or synthetic rates)
    Other,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Deferred => "DEFERRED",
            RateType::Realtime => "REALTIME",
            RateType::Historic => "HISTORIC",
            RateType::Other => "OTHER",
        }
    }
}

impl FromStr for RateType {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEFERRED" => Ok(RateType::Deferred),
            "REALTIME" => Ok(RateType::Realtime),
            "HISTORIC" => Ok(RateType::Historic),
            "OTHER" => Ok(RateType::Other),
            _ => Err(FxError::ParseError(format!("Unknown rate type: {}", s))),
        }
    }
}

impl TryFrom<String> for RateType {
    type Error = FxError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata describing where a rate came from
///
/// The provider name is the first field so that the derived ordering sorts
/// contexts by provider before anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversionContext {
    /// Name of the provider that produced the rate
    pub provider: String,
    /// Rate category
    pub rate_type: RateType,
    /// When the quote was observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Start of the validity window (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window (exclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    /// Free-form provider attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ConversionContext {
    /// Create a context for a provider and rate type
    pub fn new(provider: impl Into<String>, rate_type: RateType) -> Self {
        Self {
            provider: provider.into(),
            rate_type,
            timestamp: None,
            valid_from: None,
            valid_to: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the observation timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the validity window
    pub fn with_validity(
        mut self,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Self {
        self.valid_from = valid_from;
        self.valid_to = valid_to;
        self
    }

    /// Add a provider attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get a provider attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Check whether `dt` falls inside the validity window
    ///
    /// Open bounds are unbounded. Exchange rates never call this themselves;
    /// expiry is up to providers and callers.
    pub fn is_valid_at(&self, dt: DateTime<Utc>) -> bool {
        let after_start = self.valid_from.map_or(true, |from| dt >= from);
        let before_end = self.valid_to.map_or(true, |to| dt < to);
        after_start && before_end
    }
}

impl fmt::Display for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.rate_type)?;
        if let Some(ts) = self.timestamp {
            write!(f, " @ {}", ts.to_rfc3339())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_type_parse() {
        assert_eq!("deferred".parse::<RateType>().unwrap(), RateType::Deferred);
        assert_eq!("REALTIME".parse::<RateType>().unwrap(), RateType::Realtime);
        assert_eq!(" Historic ".parse::<RateType>().unwrap(), RateType::Historic);
        assert!("weekly".parse::<RateType>().is_err());
    }

    #[test]
    fn test_rate_type_serde_matches_parse() {
        for text in ["\"historic\"", "\"Historic\"", "\"HISTORIC\""] {
            let parsed: RateType = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, RateType::Historic);
        }
        assert!(serde_json::from_str::<RateType>("\"weekly\"").is_err());
        assert_eq!(serde_json::to_string(&RateType::Realtime).unwrap(), "\"realtime\"");
    }

    #[test]
    fn test_rate_type_display() {
        assert_eq!(RateType::Deferred.to_string(), "DEFERRED");
        assert_eq!(RateType::Other.to_string(), "OTHER");
    }

    #[test]
    fn test_context_builder() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let ctx = ConversionContext::new("ecb", RateType::Historic)
            .with_timestamp(ts)
            .with_attribute("source", "eurofxref");

        assert_eq!(ctx.provider, "ecb");
        assert_eq!(ctx.timestamp, Some(ts));
        assert_eq!(ctx.attribute("source"), Some("eurofxref"));
        assert_eq!(ctx.attribute("missing"), None);
    }

    #[test]
    fn test_validity_window() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let ctx = ConversionContext::new("p", RateType::Deferred).with_validity(Some(from), Some(to));

        assert!(ctx.is_valid_at(from));
        assert!(ctx.is_valid_at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
        assert!(!ctx.is_valid_at(to));
        assert!(!ctx.is_valid_at(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()));

        let open = ConversionContext::new("p", RateType::Deferred);
        assert!(open.is_valid_at(to));
    }

    #[test]
    fn test_context_orders_by_provider_first() {
        let a = ConversionContext::new("alpha", RateType::Other);
        let b = ConversionContext::new("beta", RateType::Deferred);
        assert!(a < b);
    }
}
