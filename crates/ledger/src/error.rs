use thiserror::Error;

use minibank_auth::CredentialsError;
use minibank_core::Money;

/// Every way a ledger operation can be rejected.
///
/// A rejected operation never changes ledger state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("initial deposit must be at least {minimum}")]
    InvalidDeposit { minimum: Money },

    /// Not a positive amount, or a credit that would take the recipient's
    /// balance past the largest representable `Money`.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("cannot transfer to the same account")]
    SelfTransfer,

    #[error("recipient account not found")]
    RecipientNotFound,

    /// Every generated account number was already taken.
    #[error("could not allocate a unique account number")]
    AccountNumberCollision,

    /// The acting account does not exist (e.g. a stale reference).
    #[error("account not found")]
    AccountNotFound,
}

impl From<CredentialsError> for LedgerError {
    fn from(value: CredentialsError) -> Self {
        match value {
            CredentialsError::Empty => LedgerError::InvalidCredentials,
        }
    }
}
