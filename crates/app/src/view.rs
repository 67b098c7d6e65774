//! What the user sees: dashboards, history lines and messages.

use chrono::NaiveDate;
use serde::Serialize;

use minibank_core::Money;
use minibank_ledger::{Account, AccountNumber, LedgerError, Transaction, TransactionKind};

use crate::bank::BankError;

/// Currency symbol used in every rendered amount.
pub const CURRENCY: &str = "₹";

/// One history row, newest first on a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryLine {
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "amount_minor")]
    pub amount: Money,
    pub inflow: bool,
}

impl HistoryLine {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            description: describe(tx),
            date: tx.occurred_at.date_naive(),
            amount: tx.amount,
            inflow: tx.kind.is_inflow(),
        }
    }
}

impl core::fmt::Display for HistoryLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.inflow { '+' } else { '-' };
        write!(
            f,
            "{} ({}) {sign}{CURRENCY}{}",
            self.description, self.date, self.amount
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub username: String,
    pub account_number: AccountNumber,
    #[serde(rename = "balance_minor")]
    pub balance: Money,
    pub history: Vec<HistoryLine>,
}

impl Dashboard {
    pub fn from_account(account: &Account) -> Self {
        Self {
            username: account.username().to_string(),
            account_number: account.number().clone(),
            balance: account.balance(),
            history: account
                .transactions()
                .iter()
                .rev()
                .map(HistoryLine::from_transaction)
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl core::fmt::Display for Dashboard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Welcome, {}!", self.username)?;
        writeln!(f, "Account number: {}", self.account_number)?;
        writeln!(f, "Balance: {}", amount(self.balance))?;
        write!(f, "Transactions:")?;
        for line in &self.history {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

/// `₹1234.50`
pub fn amount(money: Money) -> String {
    format!("{CURRENCY}{money}")
}

/// Statement label for a transaction, naming the other party on transfers.
pub fn describe(tx: &Transaction) -> String {
    match (tx.kind, tx.counterparty.as_deref()) {
        (TransactionKind::TransferOut, Some(recipient)) => format!("Transfer Out to {recipient}"),
        (TransactionKind::TransferIn, Some(sender)) => format!("Transfer In from {sender}"),
        (kind, _) => kind.to_string(),
    }
}

/// Which user action a message is about; some errors read differently
/// depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Withdraw,
    Transfer,
    View,
}

/// User-facing text for a rejected operation.
pub fn rejection(operation: Operation, error: &BankError) -> String {
    let error = match error {
        BankError::Ledger(error) => error,
        BankError::Session(_) => return "Please login first.".to_string(),
        BankError::Poisoned => return "Internal error. Please restart the application.".to_string(),
    };

    match error {
        LedgerError::InvalidCredentials if operation == Operation::Register => {
            "Username and password cannot be empty.".to_string()
        }
        LedgerError::InvalidCredentials => "Invalid username or password.".to_string(),
        LedgerError::DuplicateUsername => "Username already exists.".to_string(),
        LedgerError::InvalidDeposit { minimum } => {
            format!("Initial deposit must be at least {}.", amount(*minimum))
        }
        LedgerError::InvalidAmount => {
            format!("Please enter a valid amount greater than {}0.", CURRENCY)
        }
        LedgerError::InsufficientFunds if operation == Operation::Transfer => {
            "Error: Insufficient funds for transfer.".to_string()
        }
        LedgerError::InsufficientFunds => "Error: Insufficient funds.".to_string(),
        LedgerError::SelfTransfer => "Cannot transfer money to your own account.".to_string(),
        LedgerError::RecipientNotFound => "Error: Recipient account not found.".to_string(),
        LedgerError::AccountNumberCollision => {
            "Could not allocate an account number. Please try again.".to_string()
        }
        LedgerError::AccountNotFound => "Error: Account not found.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use minibank_auth::SessionError;
    use minibank_ledger::{Ledger, LedgerConfig, RandomAccountNumbers};

    fn date(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn history_lines_read_like_a_statement() {
        let at = date(2024, 3, 9);
        let out = Transaction::transfer_out(Money::from_major(50), "maggie", at);
        let incoming = Transaction::transfer_in(Money::from_minor(1250), "poojitha", at);
        let withdrawal = Transaction::withdrawal(Money::from_major(5), at);

        assert_eq!(
            HistoryLine::from_transaction(&out).to_string(),
            "Transfer Out to maggie (2024-03-09) -₹50.00"
        );
        assert_eq!(
            HistoryLine::from_transaction(&incoming).to_string(),
            "Transfer In from poojitha (2024-03-09) +₹12.50"
        );
        assert_eq!(
            HistoryLine::from_transaction(&withdrawal).to_string(),
            "Withdrawal (2024-03-09) -₹5.00"
        );
    }

    #[test]
    fn dashboard_lists_newest_first() {
        let mut ledger =
            Ledger::with_generator(LedgerConfig::default(), RandomAccountNumbers::seeded(5));
        let number = ledger
            .register("alice", "pw", Money::from_major(300))
            .unwrap()
            .number()
            .clone();
        ledger.withdraw(&number, Money::from_major(20)).unwrap();

        let dashboard = Dashboard::from_account(ledger.account(&number).unwrap());

        assert_eq!(dashboard.balance, Money::from_major(280));
        assert_eq!(dashboard.history.len(), 2);
        assert_eq!(dashboard.history[0].description, "Withdrawal");
        assert_eq!(dashboard.history[1].description, "Deposit");

        let text = dashboard.to_string();
        assert!(text.starts_with("Welcome, alice!"));
        assert!(text.contains("Balance: ₹280.00"));

        let json: serde_json::Value = serde_json::from_str(&dashboard.to_json().unwrap()).unwrap();
        assert_eq!(json["balance_minor"], 28_000);
        assert_eq!(json["history"][0]["inflow"], false);
    }

    #[test]
    fn messages_depend_on_the_operation() {
        let blank = BankError::Ledger(LedgerError::InvalidCredentials);
        assert_eq!(
            rejection(Operation::Register, &blank),
            "Username and password cannot be empty."
        );
        assert_eq!(rejection(Operation::Login, &blank), "Invalid username or password.");

        let broke = BankError::Ledger(LedgerError::InsufficientFunds);
        assert_eq!(
            rejection(Operation::Transfer, &broke),
            "Error: Insufficient funds for transfer."
        );
        assert_eq!(rejection(Operation::Withdraw, &broke), "Error: Insufficient funds.");

        let deposit = BankError::Ledger(LedgerError::InvalidDeposit {
            minimum: Money::from_major(100),
        });
        assert_eq!(
            rejection(Operation::Register, &deposit),
            "Initial deposit must be at least ₹100.00."
        );

        assert_eq!(
            rejection(Operation::View, &BankError::Session(SessionError::NotLoggedIn)),
            "Please login first."
        );
    }
}
