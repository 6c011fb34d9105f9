//! In-memory rate provider
//!
//! Holds quoted rates per currency pair, keyed by observation time, and
//! answers lookups with forward-fill (the latest quote at or before the
//! requested time). Missing pairs can fall back to the arithmetic inverse of
//! the reverse quote and to a cross rate through a pivot currency.

use super::context::{ConversionContext, RateType};
use super::exchange_rate::{ExchangeRate, ExchangeRateBuilder};
use super::provider::{RateProvider, ReversalPolicy};
use super::query::ConversionQuery;
use crate::currency::CurrencyUnit;
use crate::error::{FxError, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use num_traits::{One, Zero};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Quotes for one pair; `None` marks a quote without observation time,
/// which sorts before every timestamped quote.
type QuoteSeries = BTreeMap<Option<DateTime<Utc>>, BigDecimal>;
type RateTable = HashMap<(CurrencyUnit, CurrencyUnit), QuoteSeries>;
type CacheKey = (CurrencyUnit, CurrencyUnit, Option<DateTime<Utc>>);
type RateCache = HashMap<CacheKey, ExchangeRate>;

/// Resolved lookups kept before the cache is flushed
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// One CSV row: `timestamp,base,term,factor`
#[derive(Debug, Deserialize)]
struct RateRecord {
    timestamp: String,
    base: String,
    term: String,
    factor: String,
}

/// In-memory exchange rate storage
///
/// Clones share the same tables.
///
/// # Example
/// ```
/// use rusty_fx::conversion::{InMemoryRateProvider, RateProvider, RateType};
/// use rusty_fx::currency::CurrencyUnit;
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let provider = InMemoryRateProvider::new("static", RateType::Deferred);
/// provider
///     .add_rate("EUR".into(), "USD".into(), BigDecimal::from_str("1.2").unwrap(), None)
///     .unwrap();
///
/// let rate = provider
///     .exchange_rate(&CurrencyUnit::new("EUR"), &CurrencyUnit::new("USD"))
///     .unwrap();
/// assert_eq!(rate.factor(), &BigDecimal::from_str("1.2").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryRateProvider {
    name: String,
    rate_type: RateType,
    rates: Arc<RwLock<RateTable>>,
    cache: Arc<RwLock<RateCache>>,
    /// Bumped on every write to `rates`, under its write lock
    generation: Arc<AtomicU64>,
    cache_capacity: usize,
    reversal: ReversalPolicy,
    /// Intermediate currency for cross rates
    pivot: Option<CurrencyUnit>,
}

impl InMemoryRateProvider {
    /// Create an empty provider with quoted-only reversal and no pivot
    pub fn new(name: impl Into<String>, rate_type: RateType) -> Self {
        Self {
            name: name.into(),
            rate_type,
            rates: Arc::new(RwLock::new(HashMap::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            reversal: ReversalPolicy::Quoted,
            pivot: None,
        }
    }

    pub fn with_reversal(mut self, reversal: ReversalPolicy) -> Self {
        self.reversal = reversal;
        self
    }

    /// Enable cross rates through `pivot`
    pub fn with_pivot(mut self, pivot: CurrencyUnit) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Maximum number of cached lookups; `0` disables caching
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn reversal_policy(&self) -> ReversalPolicy {
        self.reversal
    }

    pub fn pivot(&self) -> Option<&CurrencyUnit> {
        self.pivot.as_ref()
    }

    /// Add a single quote
    pub fn add_rate(
        &self,
        base: CurrencyUnit,
        term: CurrencyUnit,
        factor: BigDecimal,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.add_rates(vec![(base, term, factor, timestamp)])
    }

    /// Add several quotes; nothing is stored if any of them is invalid
    pub fn add_rates(
        &self,
        entries: Vec<(CurrencyUnit, CurrencyUnit, BigDecimal, Option<DateTime<Utc>>)>,
    ) -> Result<()> {
        for (base, term, factor, _) in &entries {
            validate_quote(base, term, factor)?;
        }

        let mut rates = self.write_rates();
        for (base, term, factor, timestamp) in entries {
            rates
                .entry((base, term))
                .or_insert_with(BTreeMap::new)
                .insert(timestamp, factor);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(rates);

        // Inverse and cross results depend on several pairs
        self.clear_cache();
        Ok(())
    }

    /// Load quotes from CSV with header `timestamp,base,term,factor`
    ///
    /// Timestamps are RFC 3339; an empty timestamp stores an untimed quote.
    /// Lines starting with `#` are skipped. Returns the number of quotes loaded.
    pub fn load_from_csv<R: Read>(&self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (index, record) in csv_reader.deserialize::<RateRecord>().enumerate() {
            let record = record?;
            let row = index + 1;

            let timestamp = if record.timestamp.is_empty() {
                None
            } else {
                let dt = DateTime::parse_from_rfc3339(&record.timestamp).map_err(|e| {
                    FxError::ParseError(format!("Invalid timestamp in record {}: {}", row, e))
                })?;
                Some(dt.with_timezone(&Utc))
            };
            let base = CurrencyUnit::from_str(&record.base)?;
            let term = CurrencyUnit::from_str(&record.term)?;
            let factor = BigDecimal::from_str(&record.factor).map_err(|e| {
                FxError::ParseError(format!("Invalid factor in record {}: {}", row, e))
            })?;

            entries.push((base, term, factor, timestamp));
        }

        let count = entries.len();
        self.add_rates(entries)?;
        log::info!("Loaded {} quotes into provider {}", count, self.name);
        Ok(count)
    }

    /// Load quotes from a CSV file
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let file = File::open(path.as_ref())?;
        self.load_from_csv(file)
    }

    /// Remove all quotes
    pub fn clear(&self) {
        let mut rates = self.write_rates();
        rates.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(rates);
        self.clear_cache();
    }

    /// Drop cached lookup results, keeping the quotes
    pub fn clear_cache(&self) {
        self.write_cache().clear();
    }

    /// Number of stored currency pairs
    pub fn num_pairs(&self) -> usize {
        self.read_rates().len()
    }

    /// Number of stored quotes across all pairs and timestamps
    pub fn num_entries(&self) -> usize {
        self.read_rates().values().map(|series| series.len()).sum()
    }

    fn read_rates(&self) -> RwLockReadGuard<'_, RateTable> {
        self.rates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rates(&self) -> RwLockWriteGuard<'_, RateTable> {
        self.rates.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, RateCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, RateCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cache `rate` unless the quotes changed since `generation` was read
    ///
    /// A full cache is flushed before inserting.
    fn cache_if_current(&self, key: CacheKey, rate: &ExchangeRate, generation: u64) -> bool {
        if self.cache_capacity == 0 {
            return false;
        }

        let mut cache = self.write_cache();
        if self.generation() != generation {
            return false;
        }
        if cache.len() >= self.cache_capacity {
            log::debug!("{}: flushing {} cached rates", self.name, cache.len());
            cache.clear();
        }
        cache.insert(key, rate.clone());
        true
    }

    fn context(&self, timestamp: Option<DateTime<Utc>>) -> ConversionContext {
        let context = ConversionContext::new(self.name.clone(), self.rate_type);
        match timestamp {
            Some(ts) => context.with_timestamp(ts),
            None => context,
        }
    }

    fn build_rate(
        &self,
        base: &CurrencyUnit,
        term: &CurrencyUnit,
        factor: BigDecimal,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<ExchangeRate> {
        ExchangeRateBuilder::from_context(self.context(timestamp))
            .with_base_currency(base.clone())
            .with_term_currency(term.clone())
            .with_factor(factor)
            .build()
    }

    /// Latest quote at or before `at` (latest overall when `at` is `None`)
    fn quoted(
        &self,
        base: &CurrencyUnit,
        term: &CurrencyUnit,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<ExchangeRate>> {
        let quote = {
            let rates = self.read_rates();
            let series = match rates.get(&(base.clone(), term.clone())) {
                Some(series) => series,
                None => return Ok(None),
            };
            let found = match at {
                Some(dt) => series.range(..=Some(dt)).next_back(),
                None => series.iter().next_back(),
            };
            found.map(|(ts, factor)| (*ts, factor.clone()))
        };

        quote
            .map(|(ts, factor)| self.build_rate(base, term, factor, ts))
            .transpose()
    }

    /// Direct quote, or the inverted reverse quote when the policy allows it
    fn quoted_or_inverted(
        &self,
        base: &CurrencyUnit,
        term: &CurrencyUnit,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<ExchangeRate>> {
        if let Some(rate) = self.quoted(base, term, at)? {
            return Ok(Some(rate));
        }
        if self.reversal != ReversalPolicy::Arithmetic {
            return Ok(None);
        }

        match self.quoted(term, base, at)? {
            Some(reverse) => {
                log::debug!("{}: inverting {}/{} quote", self.name, term, base);
                reverse.inverted().map(Some)
            }
            None => Ok(None),
        }
    }

    /// Derived rate `base -> pivot -> term`
    fn cross(
        &self,
        base: &CurrencyUnit,
        term: &CurrencyUnit,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<ExchangeRate>> {
        let pivot = match &self.pivot {
            Some(pivot) if pivot != base && pivot != term => pivot,
            _ => return Ok(None),
        };

        let first = match self.quoted_or_inverted(base, pivot, at)? {
            Some(rate) => rate,
            None => return Ok(None),
        };
        let second = match self.quoted_or_inverted(pivot, term, at)? {
            Some(rate) => rate,
            None => return Ok(None),
        };

        log::debug!("{}: cross rate {}/{} via {}", self.name, base, term, pivot);
        ExchangeRate::derive(&[first, second], self.context(at)).map(Some)
    }

    fn resolve(&self, query: &ConversionQuery) -> Result<Option<ExchangeRate>> {
        if let Some(rate) = self.quoted_or_inverted(&query.base, &query.term, query.timestamp)? {
            return Ok(Some(rate));
        }
        self.cross(&query.base, &query.term, query.timestamp)
    }
}

fn validate_quote(base: &CurrencyUnit, term: &CurrencyUnit, factor: &BigDecimal) -> Result<()> {
    if *factor <= BigDecimal::zero() {
        return Err(FxError::InvalidData(format!(
            "Rate factor for {}/{} must be positive, got: {}",
            base, term, factor
        )));
    }
    Ok(())
}

impl RateProvider for InMemoryRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn rate_type(&self) -> RateType {
        self.rate_type
    }

    fn exchange_rate_for(&self, query: &ConversionQuery) -> Result<ExchangeRate> {
        if query.is_identity() {
            return self.build_rate(&query.base, &query.term, BigDecimal::one(), query.timestamp);
        }

        let key = (query.base.clone(), query.term.clone(), query.timestamp);
        if let Some(rate) = self.read_cache().get(&key) {
            log::debug!("{}: cache hit for {}", self.name, query);
            return Ok(rate.clone());
        }

        let generation = self.generation();
        match self.resolve(query)? {
            Some(rate) => {
                self.cache_if_current(key, &rate, generation);
                Ok(rate)
            }
            None => Err(FxError::unavailable(
                &query.base,
                &query.term,
                Some(&self.name),
                query.timestamp,
            )),
        }
    }

    fn reversed(&self, rate: &ExchangeRate) -> Result<ExchangeRate> {
        let mut query = ConversionQuery::new(rate.currency().clone(), rate.base_currency().clone());
        query.timestamp = rate.context().timestamp;
        self.exchange_rate_for(&query)
    }
}
