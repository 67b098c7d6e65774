//! Account aggregate: one customer's credentials, balance and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minibank_auth::Credentials;
use minibank_core::{Aggregate, AggregateRoot, Money};
use minibank_events::Event;

use crate::error::LedgerError;
use crate::number::AccountNumber;
use crate::transaction::Transaction;

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate root: Account.
///
/// # Invariants
/// - `balance` equals the signed sum of `transactions` and is never negative.
/// - `transactions` is append-only and non-empty once opened.
/// - Credentials and account number never change after opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    number: AccountNumber,
    credentials: Option<Credentials>,
    balance: Money,
    transactions: Vec<Transaction>,
    version: u64,
}

impl Account {
    /// Empty, not-yet-opened account.
    pub fn empty(number: AccountNumber) -> Self {
        Self {
            number,
            credentials: None,
            balance: Money::ZERO,
            transactions: Vec::new(),
            version: 0,
        }
    }

    pub fn number(&self) -> &AccountNumber {
        &self.number
    }

    pub fn username(&self) -> &str {
        self.credentials.as_ref().map(Credentials::username).unwrap_or("")
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// History in chronological (insertion) order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_open(&self) -> bool {
        self.credentials.is_some()
    }

    /// Exact match on both username and password.
    pub fn authenticates(&self, username: &str, password: &str) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|c| c.matches(username, password))
    }

    /// Balance recomputed from the history alone.
    pub fn replayed_balance(&self) -> Money {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    fn ensure_open(&self) -> Result<(), LedgerError> {
        if !self.is_open() {
            return Err(LedgerError::AccountNotFound);
        }
        Ok(())
    }

    fn ensure_covers(&self, amount: Money) -> Result<(), LedgerError> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds);
        }
        Ok(())
    }
}

impl AggregateRoot for Account {
    type Id = AccountNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccount {
    pub credentials: Credentials,
    pub initial_deposit: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Debit side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransfer {
    pub amount: Money,
    pub recipient: String,
    pub occurred_at: DateTime<Utc>,
}

/// Credit side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveTransfer {
    pub amount: Money,
    pub sender: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCommand {
    Open(OpenAccount),
    Withdraw(Withdraw),
    SendTransfer(SendTransfer),
    ReceiveTransfer(ReceiveTransfer),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpened {
    pub account_number: AccountNumber,
    pub credentials: Credentials,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub account_number: AccountNumber,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSent {
    pub account_number: AccountNumber,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceived {
    pub account_number: AccountNumber,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountEvent {
    Opened(AccountOpened),
    Withdrawn(FundsWithdrawn),
    TransferredOut(TransferSent),
    TransferredIn(TransferReceived),
}

impl AccountEvent {
    pub fn account_number(&self) -> &AccountNumber {
        match self {
            AccountEvent::Opened(e) => &e.account_number,
            AccountEvent::Withdrawn(e) => &e.account_number,
            AccountEvent::TransferredOut(e) => &e.account_number,
            AccountEvent::TransferredIn(e) => &e.account_number,
        }
    }

    /// The history entry this event appends.
    pub fn transaction(&self) -> &Transaction {
        match self {
            AccountEvent::Opened(e) => &e.transaction,
            AccountEvent::Withdrawn(e) => &e.transaction,
            AccountEvent::TransferredOut(e) => &e.transaction,
            AccountEvent::TransferredIn(e) => &e.transaction,
        }
    }
}

impl Event for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened(_) => "ledger.account.opened",
            AccountEvent::Withdrawn(_) => "ledger.account.withdrawn",
            AccountEvent::TransferredOut(_) => "ledger.account.transferred_out",
            AccountEvent::TransferredIn(_) => "ledger.account.transferred_in",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.transaction().occurred_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Account {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened(e) => {
                self.number = e.account_number.clone();
                self.credentials = Some(e.credentials.clone());
            }
            AccountEvent::Withdrawn(_)
            | AccountEvent::TransferredOut(_)
            | AccountEvent::TransferredIn(_) => {}
        }

        let transaction = event.transaction();
        self.balance = Money::from_minor(self.balance.minor() + transaction.signed_amount().minor());
        self.transactions.push(transaction.clone());
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.decide(command).map(|event| vec![event])
    }
}

impl Account {
    /// Single-event form of `handle`: every account command yields exactly
    /// one event.
    pub fn decide(&self, command: &AccountCommand) -> Result<AccountEvent, LedgerError> {
        match command {
            AccountCommand::Open(cmd) => self.handle_open(cmd),
            AccountCommand::Withdraw(cmd) => self.handle_withdraw(cmd),
            AccountCommand::SendTransfer(cmd) => self.handle_send(cmd),
            AccountCommand::ReceiveTransfer(cmd) => self.handle_receive(cmd),
        }
    }

    fn handle_open(&self, cmd: &OpenAccount) -> Result<AccountEvent, LedgerError> {
        if self.is_open() {
            return Err(LedgerError::AccountNumberCollision);
        }
        if !cmd.initial_deposit.is_positive() {
            return Err(LedgerError::InvalidDeposit {
                minimum: Money::from_minor(1),
            });
        }

        Ok(AccountEvent::Opened(AccountOpened {
            account_number: self.number.clone(),
            credentials: cmd.credentials.clone(),
            transaction: Transaction::deposit(cmd.initial_deposit, cmd.occurred_at),
        }))
    }

    fn handle_withdraw(&self, cmd: &Withdraw) -> Result<AccountEvent, LedgerError> {
        self.ensure_open()?;
        if !cmd.amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
        self.ensure_covers(cmd.amount)?;

        Ok(AccountEvent::Withdrawn(FundsWithdrawn {
            account_number: self.number.clone(),
            transaction: Transaction::withdrawal(cmd.amount, cmd.occurred_at),
        }))
    }

    fn handle_send(&self, cmd: &SendTransfer) -> Result<AccountEvent, LedgerError> {
        self.ensure_open()?;
        if !cmd.amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
        self.ensure_covers(cmd.amount)?;

        Ok(AccountEvent::TransferredOut(TransferSent {
            account_number: self.number.clone(),
            transaction: Transaction::transfer_out(cmd.amount, &cmd.recipient, cmd.occurred_at),
        }))
    }

    fn handle_receive(&self, cmd: &ReceiveTransfer) -> Result<AccountEvent, LedgerError> {
        if !self.is_open() {
            return Err(LedgerError::RecipientNotFound);
        }
        if !cmd.amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
        if self.balance.checked_add(cmd.amount).is_none() {
            return Err(LedgerError::InvalidAmount);
        }

        Ok(AccountEvent::TransferredIn(TransferReceived {
            account_number: self.number.clone(),
            transaction: Transaction::transfer_in(cmd.amount, &cmd.sender, cmd.occurred_at),
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
