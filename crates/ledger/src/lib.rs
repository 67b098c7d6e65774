//! Account ledger (registration, withdrawals, transfers).
//!
//! Pure domain logic only: no IO, no locking, no presentation concerns.

pub mod account;
pub mod error;
pub mod ledger;
pub mod number;
pub mod transaction;

pub use account::{Account, AccountCommand, AccountEvent};
pub use error::LedgerError;
pub use ledger::{Ledger, LedgerConfig};
pub use number::{AccountNumber, AccountNumberGenerator, RandomAccountNumbers};
pub use transaction::{Transaction, TransactionKind};
