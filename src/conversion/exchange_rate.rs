//! Exchange rate value type and builder
//!
//! An [`ExchangeRate`] converts an amount in its base currency into its term
//! currency: `term_amount = base_amount * factor`. A rate is either direct
//! (its chain is just itself) or derived from a chain of rates through
//! intermediate currencies, in which case the factor is the ordered product
//! of the chain factors.

use super::context::{ConversionContext, RateType};
use crate::currency::CurrencyUnit;
use crate::error::{FxError, Result};
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Immutable exchange rate from a base currency to a term currency
///
/// # Example
/// ```
/// use rusty_fx::conversion::{ExchangeRate, ExchangeRateBuilder, RateType};
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let rate = ExchangeRateBuilder::new("myProvider", RateType::Deferred)
///     .with_base_currency("CHF")
///     .with_term_currency("EUR")
///     .with_factor(BigDecimal::from_str("1.5").unwrap())
///     .build()
///     .unwrap();
///
/// assert!(!rate.is_derived());
/// assert_eq!(rate.exchange_rate_chain(), &[rate.clone()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExchangeRate")]
pub struct ExchangeRate {
    base: CurrencyUnit,
    term: CurrencyUnit,
    factor: BigDecimal,
    context: ConversionContext,
    /// Empty for a direct rate; the rate is then its own chain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    chain: Vec<ExchangeRate>,
}

impl ExchangeRate {
    /// Currency being converted from
    pub fn base_currency(&self) -> &CurrencyUnit {
        &self.base
    }

    /// Currency being converted to
    pub fn currency(&self) -> &CurrencyUnit {
        &self.term
    }

    /// Alias of [`ExchangeRate::currency`]
    pub fn term_currency(&self) -> &CurrencyUnit {
        &self.term
    }

    pub fn factor(&self) -> &BigDecimal {
        &self.factor
    }

    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    /// Rates this one was derived from, in conversion order
    ///
    /// Never empty: a direct rate returns a single-element slice holding itself.
    pub fn exchange_rate_chain(&self) -> &[ExchangeRate] {
        if self.chain.is_empty() {
            std::slice::from_ref(self)
        } else {
            &self.chain
        }
    }

    /// Whether this rate was composed from two or more rates
    pub fn is_derived(&self) -> bool {
        self.exchange_rate_chain().len() > 1
    }

    /// Check the currency continuity of the chain
    ///
    /// The first element must start at this rate's base, the last must end at
    /// its term, and each element's term must be the next element's base.
    /// Rates produced by [`ExchangeRate::derive`] always pass; hand-built
    /// chains are not checked at build time.
    pub fn is_chain_continuous(&self) -> bool {
        let chain = self.exchange_rate_chain();
        let (first, last) = match (chain.first(), chain.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return false,
        };

        first.base == self.base
            && last.term == self.term
            && chain.windows(2).all(|pair| pair[0].term == pair[1].base)
    }

    /// Convert an amount of the base currency into the term currency
    ///
    /// Plain multiplication, no rounding.
    pub fn convert(&self, amount: &BigDecimal) -> BigDecimal {
        amount * &self.factor
    }

    /// Compose adjacent rates into one derived rate
    ///
    /// Factors are multiplied in order with exact decimal arithmetic and the
    /// chains of all inputs are concatenated. Adjacent rates must share a
    /// currency (`rates[i].term == rates[i + 1].base`).
    pub fn derive(rates: &[ExchangeRate], context: ConversionContext) -> Result<ExchangeRate> {
        let (first, last) = match (rates.first(), rates.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(FxError::EmptyChain),
        };

        for (i, pair) in rates.windows(2).enumerate() {
            if pair[0].term != pair[1].base {
                return Err(FxError::BrokenChain {
                    position: i + 1,
                    expected: pair[0].term.clone(),
                    found: pair[1].base.clone(),
                });
            }
        }

        let factor = rates
            .iter()
            .fold(BigDecimal::one(), |acc, rate| acc * &rate.factor);

        let mut chain: Vec<ExchangeRate> = rates
            .iter()
            .flat_map(|rate| rate.exchange_rate_chain().iter().cloned())
            .collect();
        // A single direct input stays direct under the new context
        if chain.len() == 1 {
            chain.clear();
        }

        ExchangeRateBuilder::from_context(context)
            .with_base_currency(first.base.clone())
            .with_term_currency(last.term.clone())
            .with_factor(factor)
            .with_rate_chain(&chain)
            .build()
    }

    /// Arithmetic inverse of this rate (`1 / factor`, base and term swapped)
    ///
    /// This is a numeric convenience, not a quoted reverse rate: bid/ask
    /// spreads make real reverse quotes differ from `1 / factor`. A derived
    /// rate is inverted element by element with the chain order reversed.
    pub fn inverted(&self) -> Result<ExchangeRate> {
        if self.factor.is_zero() {
            return Err(FxError::InvalidFactor(format!(
                "Cannot invert zero factor of {}/{}",
                self.base, self.term
            )));
        }

        if !self.is_derived() {
            return Ok(ExchangeRate {
                base: self.term.clone(),
                term: self.base.clone(),
                factor: BigDecimal::one() / &self.factor,
                context: self.context.clone(),
                chain: Vec::new(),
            });
        }

        let chain = self
            .chain
            .iter()
            .rev()
            .map(ExchangeRate::inverted)
            .collect::<Result<Vec<_>>>()?;
        let factor = chain
            .iter()
            .fold(BigDecimal::one(), |acc, rate| acc * &rate.factor);

        Ok(ExchangeRate {
            base: self.term.clone(),
            term: self.base.clone(),
            factor,
            context: self.context.clone(),
            chain,
        })
    }

    /// Compare with a possibly absent rate; an absent rate sorts after `self`
    pub fn compare_to(&self, other: Option<&ExchangeRate>) -> Ordering {
        match other {
            Some(other) => self.cmp(other),
            None => Ordering::Less,
        }
    }
}

impl Ord for ExchangeRate {
    /// Base code, then term code, then provider name; remaining context
    /// fields, factor and chain break ties so that ordering agrees with `==`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| self.term.cmp(&other.term))
            .then_with(|| self.context.cmp(&other.context))
            .then_with(|| self.factor.cmp(&other.factor))
            .then_with(|| self.chain.cmp(&other.chain))
    }
}

impl PartialOrd for ExchangeRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} [{}]",
            self.base, self.term, self.factor, self.context
        )?;
        if self.is_derived() {
            let path: Vec<String> = self
                .chain
                .iter()
                .map(|rate| format!("{}/{}", rate.base, rate.term))
                .collect();
            write!(f, " via {}", path.join(" -> "))?;
        }
        Ok(())
    }
}

/// Serialized form; deserialization goes through [`ExchangeRateBuilder::build`]
#[derive(Deserialize)]
struct RawExchangeRate {
    base: CurrencyUnit,
    term: CurrencyUnit,
    factor: BigDecimal,
    context: ConversionContext,
    #[serde(default)]
    chain: Vec<ExchangeRate>,
}

impl TryFrom<RawExchangeRate> for ExchangeRate {
    type Error = FxError;

    fn try_from(raw: RawExchangeRate) -> Result<Self> {
        ExchangeRateBuilder::from_context(raw.context)
            .with_base_currency(raw.base)
            .with_term_currency(raw.term)
            .with_factor(raw.factor)
            .with_rate_chain(&raw.chain)
            .build()
    }
}

/// Fluent builder for [`ExchangeRate`]
///
/// `build` borrows the builder, so the same state can produce any number of
/// independent rates.
#[derive(Debug, Clone)]
pub struct ExchangeRateBuilder {
    base: Option<CurrencyUnit>,
    term: Option<CurrencyUnit>,
    factor: Option<BigDecimal>,
    context: ConversionContext,
    chain: Vec<ExchangeRate>,
}

impl ExchangeRateBuilder {
    /// Create a builder for rates of the given provider and rate type
    pub fn new(provider: impl Into<String>, rate_type: RateType) -> Self {
        Self::from_context(ConversionContext::new(provider, rate_type))
    }

    /// Create a builder with a full conversion context
    pub fn from_context(context: ConversionContext) -> Self {
        Self {
            base: None,
            term: None,
            factor: None,
            context,
            chain: Vec::new(),
        }
    }

    pub fn with_base_currency(mut self, base: impl Into<CurrencyUnit>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_term_currency(mut self, term: impl Into<CurrencyUnit>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_factor(mut self, factor: BigDecimal) -> Self {
        self.factor = Some(factor);
        self
    }

    pub fn with_context(mut self, context: ConversionContext) -> Self {
        self.context = context;
        self
    }

    /// Set the derivation chain (copied); an empty slice means "direct rate"
    pub fn with_rate_chain(mut self, chain: &[ExchangeRate]) -> Self {
        self.chain = chain.to_vec();
        self
    }

    /// Copy base, term, context, factor and chain from an existing rate
    pub fn with_rate(mut self, rate: &ExchangeRate) -> Self {
        self.base = Some(rate.base.clone());
        self.term = Some(rate.term.clone());
        self.factor = Some(rate.factor.clone());
        self.context = rate.context.clone();
        self.chain = rate.chain.clone();
        self
    }

    /// Build the rate, failing on the first missing mandatory field
    pub fn build(&self) -> Result<ExchangeRate> {
        if self.context.provider.trim().is_empty() {
            return Err(FxError::MissingField("provider"));
        }
        let base = self
            .base
            .clone()
            .ok_or(FxError::MissingField("base_currency"))?;
        let term = self
            .term
            .clone()
            .ok_or(FxError::MissingField("term_currency"))?;
        let factor = self
            .factor
            .clone()
            .ok_or(FxError::MissingField("factor"))?;

        let mut rate = ExchangeRate {
            base,
            term,
            factor,
            context: self.context.clone(),
            chain: self.chain.clone(),
        };

        // A chain holding only this very rate is the default self chain
        if let [only] = rate.chain.as_slice() {
            if only.chain.is_empty()
                && only.base == rate.base
                && only.term == rate.term
                && only.factor == rate.factor
                && only.context == rate.context
            {
                rate.chain.clear();
            }
        }

        Ok(rate)
    }
}
