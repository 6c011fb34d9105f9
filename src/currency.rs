//! Currency identifiers

use crate::error::{FxError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency identifier (ISO 4217 style code such as "CHF")
///
/// The code is opaque: it is only compared and ordered (byte-wise), never
/// checked against a currency registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyUnit {
    code: String,
}

impl CurrencyUnit {
    /// Create a currency unit from its code
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Get the currency code
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl FromStr for CurrencyUnit {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        if code.is_empty() {
            return Err(FxError::ParseError("Empty currency code".to_string()));
        }
        Ok(Self::new(code))
    }
}

impl From<&str> for CurrencyUnit {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
