//! Configuration loading tests

use bigdecimal::BigDecimal;
use rusty_fx::prelude::*;
use std::fs;
use std::str::FromStr;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_with_relative_csv() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("rates")).unwrap();
    fs::write(
        dir.path().join("rates").join("ecb.csv"),
        "timestamp,base,term,factor\n2024-01-02T00:00:00Z,EUR,USD,1.0956\n,EUR,CHF,0.93\n",
    )
    .unwrap();

    let path = write_config(
        &dir,
        r#"
default_chain = ["ecb"]

[[providers]]
name = "ecb"
rate_type = "historic"
reversal = "arithmetic"
pivot = "EUR"
csv = "rates/ecb.csv"

[[providers.rates]]
base = "EUR"
term = "GBP"
factor = "0.8651"
"#,
    );

    let config = RatesConfig::load(&path).unwrap();
    assert_eq!(config.base_dir.as_deref(), Some(dir.path()));

    let registry = config.build_registry().unwrap();
    assert_eq!(registry.default_chain(), vec!["ecb"]);
    assert!(registry.contains("identity"));

    let ecb = registry.provider("ecb").unwrap();
    assert_eq!(ecb.rate_type(), RateType::Historic);

    let gbp_chf = registry
        .exchange_rate(&CurrencyUnit::new("GBP"), &CurrencyUnit::new("CHF"))
        .unwrap();
    assert!(gbp_chf.is_derived());
    assert_eq!(gbp_chf.context().provider, "ecb");

    let eur_usd = registry
        .exchange_rate(&CurrencyUnit::new("EUR"), &CurrencyUnit::new("USD"))
        .unwrap();
    assert_eq!(eur_usd.factor(), &BigDecimal::from_str("1.0956").unwrap());
}

#[test]
fn test_missing_csv_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[[providers]]\nname = \"ecb\"\ncsv = \"missing.csv\"\n");

    let config = RatesConfig::load(&path).unwrap();
    match config.build_registry() {
        Err(FxError::ConfigError(msg)) => {
            assert!(msg.contains("ecb"));
            assert!(msg.contains("missing.csv"));
        }
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = RatesConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(FxError::IoError(_))));
}

#[test]
fn test_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[[providers]\nname = ");
    assert!(matches!(RatesConfig::load(&path), Err(FxError::TomlError(_))));
}

#[test]
fn test_default_config_has_identity_only() {
    let registry = RatesConfig::default().build_registry().unwrap();
    assert_eq!(registry.provider_names(), vec!["identity"]);

    let usd = CurrencyUnit::new("USD");
    assert!(registry.exchange_rate(&usd, &usd).is_ok());
    assert!(registry
        .exchange_rate(&usd, &CurrencyUnit::new("EUR"))
        .is_err());
}

#[test]
fn test_negative_inline_factor_rejected() {
    let config = RatesConfig::from_toml_str(
        "[[providers]]\nname = \"p\"\n[[providers.rates]]\nbase = \"EUR\"\nterm = \"USD\"\nfactor = \"-1.1\"\n",
    )
    .unwrap();
    assert!(matches!(config.build_registry(), Err(FxError::InvalidData(_))));
}
