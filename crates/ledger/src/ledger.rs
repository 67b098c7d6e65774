//! The account set and the four customer-facing operations.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use minibank_auth::Credentials;
use minibank_core::{Aggregate, Money};

use crate::account::{
    Account, AccountCommand, AccountEvent, OpenAccount, ReceiveTransfer, SendTransfer, Withdraw,
};
use crate::error::LedgerError;
use crate::number::{AccountNumber, AccountNumberGenerator, RandomAccountNumbers};
use crate::transaction::Transaction;

/// Ledger rules that are configurable rather than fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Smallest accepted opening deposit (inclusive).
    pub min_opening_deposit: Money,
    /// How many generated account numbers to try before giving up.
    pub max_number_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_opening_deposit: Money::from_major(100),
            max_number_attempts: 32,
        }
    }
}

/// Owner of every account and sole mutator of balances and histories.
///
/// Each operation validates completely before it touches anything, so an
/// `Err` always means the ledger is exactly as it was before the call.
/// Accounts are never removed, which keeps the indexes below stable.
#[derive(Debug)]
pub struct Ledger<G = RandomAccountNumbers> {
    config: LedgerConfig,
    accounts: Vec<Account>,
    by_number: HashMap<AccountNumber, usize>,
    by_username: HashMap<String, usize>,
    generator: G,
    outbox: Vec<AccountEvent>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_generator(config, RandomAccountNumbers::new())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl<G: AccountNumberGenerator> Ledger<G> {
    pub fn with_generator(config: LedgerConfig, generator: G) -> Self {
        Self {
            config,
            accounts: Vec::new(),
            by_number: HashMap::new(),
            by_username: HashMap::new(),
            generator,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn account(&self, number: &AccountNumber) -> Option<&Account> {
        self.by_number.get(number).map(|&idx| &self.accounts[idx])
    }

    pub fn account_by_username(&self, username: &str) -> Option<&Account> {
        self.by_username.get(username).map(|&idx| &self.accounts[idx])
    }

    /// All accounts in registration order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances. Transfers never change it.
    pub fn total_balance(&self) -> Money {
        self.accounts.iter().map(Account::balance).sum()
    }

    /// Events committed since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<AccountEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Open a new account under a freshly generated account number.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        initial_deposit: Money,
    ) -> Result<&Account, LedgerError> {
        let credentials = self.check_registration(username, password, initial_deposit)?;
        let number = self.fresh_account_number()?;
        self.open(number, credentials, initial_deposit)
    }

    /// Open a new account under a caller-chosen account number.
    pub fn register_with_number(
        &mut self,
        number: AccountNumber,
        username: &str,
        password: &str,
        initial_deposit: Money,
    ) -> Result<&Account, LedgerError> {
        let credentials = self.check_registration(username, password, initial_deposit)?;
        if self.by_number.contains_key(&number) {
            return Err(LedgerError::AccountNumberCollision);
        }
        self.open(number, credentials, initial_deposit)
    }

    /// The credential and duplicate-username checks of registration, without
    /// the deposit check. Read-only.
    pub fn check_new_identity(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Credentials, LedgerError> {
        let credentials = Credentials::new(username, password)?;
        if self.by_username.contains_key(credentials.username()) {
            return Err(LedgerError::DuplicateUsername);
        }
        Ok(credentials)
    }

    /// Find the account matching both fields exactly. Read-only.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&Account, LedgerError> {
        self.account_by_username(username)
            .filter(|account| account.authenticates(username, password))
            .ok_or(LedgerError::InvalidCredentials)
    }

    pub fn withdraw(
        &mut self,
        account: &AccountNumber,
        amount: Money,
    ) -> Result<Transaction, LedgerError> {
        let idx = self.index_of(account)?;
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }

        let event = self.accounts[idx].decide(&AccountCommand::Withdraw(Withdraw {
            amount,
            occurred_at: Utc::now(),
        }))?;

        Ok(self.commit(idx, event))
    }

    /// Move `amount` from `sender` to the account numbered `recipient`.
    ///
    /// Returns the `(TransferOut, TransferIn)` pair. Both sides are decided
    /// before either is applied, so the pair lands together or not at all.
    pub fn transfer(
        &mut self,
        sender: &AccountNumber,
        recipient: &AccountNumber,
        amount: Money,
    ) -> Result<(Transaction, Transaction), LedgerError> {
        let sender_idx = self.index_of(sender)?;
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
        if recipient == sender {
            return Err(LedgerError::SelfTransfer);
        }
        let recipient_idx = *self
            .by_number
            .get(recipient)
            .ok_or(LedgerError::RecipientNotFound)?;

        let occurred_at = Utc::now();
        let from = &self.accounts[sender_idx];
        let to = &self.accounts[recipient_idx];

        let sent = from.decide(&AccountCommand::SendTransfer(SendTransfer {
            amount,
            recipient: to.username().to_string(),
            occurred_at,
        }))?;
        let received = to.decide(&AccountCommand::ReceiveTransfer(ReceiveTransfer {
            amount,
            sender: from.username().to_string(),
            occurred_at,
        }))?;

        let out = self.commit(sender_idx, sent);
        let incoming = self.commit(recipient_idx, received);
        Ok((out, incoming))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn check_registration(
        &self,
        username: &str,
        password: &str,
        initial_deposit: Money,
    ) -> Result<Credentials, LedgerError> {
        let credentials = self.check_new_identity(username, password)?;

        if initial_deposit < self.config.min_opening_deposit {
            return Err(LedgerError::InvalidDeposit {
                minimum: self.config.min_opening_deposit,
            });
        }

        Ok(credentials)
    }

    fn fresh_account_number(&mut self) -> Result<AccountNumber, LedgerError> {
        for attempt in 1..=self.config.max_number_attempts {
            let candidate = self.generator.next_number();
            if !self.by_number.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(%candidate, attempt, "account number already taken; retrying");
        }
        Err(LedgerError::AccountNumberCollision)
    }

    fn open(
        &mut self,
        number: AccountNumber,
        credentials: Credentials,
        initial_deposit: Money,
    ) -> Result<&Account, LedgerError> {
        let mut account = Account::empty(number.clone());
        let username = credentials.username().to_string();

        let event = account.decide(&AccountCommand::Open(OpenAccount {
            credentials,
            initial_deposit,
            occurred_at: Utc::now(),
        }))?;
        account.apply(&event);

        let idx = self.accounts.len();
        self.accounts.push(account);
        self.by_number.insert(number, idx);
        self.by_username.insert(username, idx);
        self.outbox.push(event);

        Ok(&self.accounts[idx])
    }

    fn index_of(&self, number: &AccountNumber) -> Result<usize, LedgerError> {
        self.by_number
            .get(number)
            .copied()
            .ok_or(LedgerError::AccountNotFound)
    }

    /// Apply an already-decided event. Infallible by construction.
    fn commit(&mut self, idx: usize, event: AccountEvent) -> Transaction {
        self.accounts[idx].apply(&event);
        let transaction = event.transaction().clone();
        self.outbox.push(event);
        transaction
    }
}
