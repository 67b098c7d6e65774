//! Account numbers and how fresh ones are produced.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ACC";
const SUFFIX_DIGITS: usize = 6;
const SUFFIX_MIN: u32 = 100_000;
const SUFFIX_MAX: u32 = 999_999;

/// Public account identifier, e.g. `ACC123456`.
///
/// Any string can be wrapped (recipient numbers come straight from user
/// input); numbers produced by a generator are always well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the canonical number for a six-digit suffix.
    pub fn from_suffix(suffix: u32) -> Self {
        Self(format!("{PREFIX}{suffix:0width$}", width = SUFFIX_DIGITS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ACC` followed by exactly six digits, first digit non-zero.
    pub fn is_well_formed(&self) -> bool {
        match self.0.strip_prefix(PREFIX) {
            Some(suffix) => {
                suffix.len() == SUFFIX_DIGITS
                    && suffix.bytes().all(|b| b.is_ascii_digit())
                    && !suffix.starts_with('0')
            }
            None => false,
        }
    }
}

impl core::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Source of candidate account numbers.
///
/// Candidates need not be unique; the ledger checks each against the numbers
/// already in use and asks again, up to its configured attempt limit.
pub trait AccountNumberGenerator {
    fn next_number(&mut self) -> AccountNumber;
}

/// Uniformly random six-digit suffixes.
#[derive(Debug, Clone)]
pub struct RandomAccountNumbers {
    rng: StdRng,
}

impl RandomAccountNumbers {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence, for reproducible demos and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAccountNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountNumberGenerator for RandomAccountNumbers {
    fn next_number(&mut self) -> AccountNumber {
        AccountNumber::from_suffix(self.rng.gen_range(SUFFIX_MIN..=SUFFIX_MAX))
    }
}

impl<F> AccountNumberGenerator for F
where
    F: FnMut() -> AccountNumber,
{
    fn next_number(&mut self) -> AccountNumber {
        self()
    }
}
