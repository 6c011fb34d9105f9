use bigdecimal::BigDecimal;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rusty_fx::prelude::*;
use std::str::FromStr;
use std::sync::Arc;

const CODES: &[&str] = &["USD", "CHF", "GBP", "JPY", "AUD", "CAD", "NZD", "SEK"];

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn benchmark_build(c: &mut Criterion) {
    let builder = ExchangeRateBuilder::new("bench", RateType::Deferred)
        .with_base_currency("EUR")
        .with_term_currency("USD")
        .with_factor(dec("1.0956"));

    c.bench_function("build_direct_rate", |b| {
        b.iter(|| black_box(builder.build().unwrap()));
    });
}

fn benchmark_derive(c: &mut Criterion) {
    // EUR -> USD -> CHF -> ... -> SEK
    let mut currencies = vec!["EUR"];
    currencies.extend_from_slice(CODES);
    let rates: Vec<ExchangeRate> = currencies
        .windows(2)
        .map(|pair| {
            ExchangeRateBuilder::new("bench", RateType::Deferred)
                .with_base_currency(pair[0])
                .with_term_currency(pair[1])
                .with_factor(dec("1.0731"))
                .build()
                .unwrap()
        })
        .collect();
    let context = ConversionContext::new("bench", RateType::Deferred);

    c.bench_function("derive_two_rates", |b| {
        b.iter(|| black_box(ExchangeRate::derive(&rates[..2], context.clone()).unwrap()));
    });

    c.bench_function("derive_eight_rates", |b| {
        b.iter(|| black_box(ExchangeRate::derive(&rates, context.clone()).unwrap()));
    });

    let derived = ExchangeRate::derive(&rates, context.clone()).unwrap();
    c.bench_function("invert_derived_rate", |b| {
        b.iter(|| black_box(derived.inverted().unwrap()));
    });
}

fn populated_provider() -> InMemoryRateProvider {
    let provider = InMemoryRateProvider::new("bench", RateType::Historic)
        .with_reversal(ReversalPolicy::Arithmetic)
        .with_pivot(CurrencyUnit::new("EUR"));

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut entries = Vec::new();
    for day in 0..1000 {
        let ts = start + Duration::days(day);
        for (i, code) in CODES.iter().enumerate() {
            let factor = BigDecimal::from(1000 + day + i as i64) / BigDecimal::from(1000);
            entries.push((CurrencyUnit::new("EUR"), CurrencyUnit::new(*code), factor, Some(ts)));
        }
    }
    provider.add_rates(entries).unwrap();
    provider
}

fn benchmark_provider_lookup(c: &mut Criterion) {
    let provider = populated_provider();
    let at = Utc.with_ymd_and_hms(2021, 6, 15, 12, 0, 0).unwrap();

    c.bench_function("in_memory_direct_lookup_cold", |b| {
        b.iter(|| {
            provider.clear_cache();
            black_box(
                provider
                    .exchange_rate_for(&ConversionQuery::new("EUR", "USD").at(at))
                    .unwrap(),
            )
        });
    });

    c.bench_function("in_memory_cross_lookup_cached", |b| {
        let query = ConversionQuery::new("CHF", "JPY").at(at);
        b.iter(|| black_box(provider.exchange_rate_for(&query).unwrap()));
    });

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(provider.clone())).unwrap();
    registry.register(Arc::new(IdentityRateProvider::new())).unwrap();

    c.bench_function("registry_lookup", |b| {
        let query = ConversionQuery::new("GBP", "SEK").at(at);
        b.iter(|| black_box(registry.exchange_rate_for(&query).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_derive,
    benchmark_provider_lookup
);
criterion_main!(benches);
