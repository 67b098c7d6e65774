//! Demo bootstrap: two fixed accounts to play with.

use tracing::info;

use minibank_core::Money;
use minibank_ledger::{AccountNumber, AccountNumberGenerator};

use crate::bank::{Bank, BankError};

#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub number: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub opening_minor: i64,
}

pub const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        number: "ACC123456",
        username: "poojitha",
        password: "12345",
        opening_minor: 500_075,
    },
    DemoAccount {
        number: "ACC654321",
        username: "maggie",
        password: "54321",
        opening_minor: 100_000,
    },
];

/// Register every demo account. Stops at the first rejection.
pub fn seed_demo_accounts<G: AccountNumberGenerator>(bank: &Bank<G>) -> Result<(), BankError> {
    for demo in &DEMO_ACCOUNTS {
        bank.register_with_number(
            AccountNumber::new(demo.number),
            demo.username,
            demo.password,
            Money::from_minor(demo.opening_minor),
        )?;
    }
    info!(count = DEMO_ACCOUNTS.len(), "demo accounts seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_ledger::{LedgerConfig, LedgerError};

    #[test]
    fn seeds_the_two_demo_accounts() {
        let bank = Bank::new(LedgerConfig::default());
        seed_demo_accounts(&bank).unwrap();

        let session = bank.login("poojitha", "12345").unwrap();
        let account = bank.account(&session).unwrap();
        assert_eq!(account.number().as_str(), "ACC123456");
        assert_eq!(account.balance().to_string(), "5000.75");

        let maggie = bank
            .inspect(|ledger| ledger.account(&AccountNumber::new("ACC654321")).cloned())
            .unwrap()
            .unwrap();
        assert_eq!(maggie.username(), "maggie");
        assert_eq!(maggie.balance(), Money::from_major(1000));
    }

    #[test]
    fn seeding_twice_is_rejected() {
        let bank = Bank::new(LedgerConfig::default());
        seed_demo_accounts(&bank).unwrap();
        assert_eq!(
            seed_demo_accounts(&bank).unwrap_err(),
            BankError::Ledger(LedgerError::DuplicateUsername)
        );
    }
}
