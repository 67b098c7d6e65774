//! Runtime configuration, read from environment variables.

use tracing::warn;

use minibank_core::Money;
use minibank_ledger::LedgerConfig;

pub const ENV_MIN_OPENING_DEPOSIT: &str = "MINIBANK_MIN_OPENING_DEPOSIT";
pub const ENV_MAX_NUMBER_ATTEMPTS: &str = "MINIBANK_MAX_NUMBER_ATTEMPTS";
pub const ENV_SEED_DEMO: &str = "MINIBANK_SEED_DEMO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    /// Register the two demo accounts at start-up.
    pub seed_demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            seed_demo: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset keys take the default; malformed
    /// values are logged and also fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let min_opening_deposit = setting(&lookup, ENV_MIN_OPENING_DEPOSIT, |raw| {
            Money::parse(raw).ok().filter(|m| m.is_positive())
        })
        .unwrap_or(defaults.ledger.min_opening_deposit);

        let max_number_attempts = setting(&lookup, ENV_MAX_NUMBER_ATTEMPTS, |raw| {
            raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
        })
        .unwrap_or(defaults.ledger.max_number_attempts);

        let seed_demo = setting(&lookup, ENV_SEED_DEMO, parse_flag).unwrap_or(defaults.seed_demo);

        Self {
            ledger: LedgerConfig {
                min_opening_deposit,
                max_number_attempts,
            },
            seed_demo,
        }
    }
}

fn setting<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring invalid setting; using default");
    }
    parsed
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(from_pairs(&[]), AppConfig::default());
        assert_eq!(
            AppConfig::default().ledger.min_opening_deposit,
            Money::from_major(100)
        );
    }

    #[test]
    fn reads_every_setting() {
        let config = from_pairs(&[
            (ENV_MIN_OPENING_DEPOSIT, "250.50"),
            (ENV_MAX_NUMBER_ATTEMPTS, "5"),
            (ENV_SEED_DEMO, "off"),
        ]);

        assert_eq!(config.ledger.min_opening_deposit, Money::from_minor(25_050));
        assert_eq!(config.ledger.max_number_attempts, 5);
        assert!(!config.seed_demo);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let config = from_pairs(&[
            (ENV_MIN_OPENING_DEPOSIT, "-10"),
            (ENV_MAX_NUMBER_ATTEMPTS, "0"),
            (ENV_SEED_DEMO, "maybe"),
        ]);

        assert_eq!(config, AppConfig::default());
    }
}
