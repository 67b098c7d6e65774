use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minibank_core::{Money, TransactionId};

/// What a transaction did to the owning account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
}

impl TransactionKind {
    /// True when the transaction adds to the balance.
    pub fn is_inflow(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::TransferOut => "Transfer Out",
            TransactionKind::TransferIn => "Transfer In",
        })
    }
}

/// One immutable entry in an account's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Always positive; direction comes from `kind`.
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
    /// Recipient username for `TransferOut`, sender username for `TransferIn`.
    pub counterparty: Option<String>,
}

impl Transaction {
    fn new(
        kind: TransactionKind,
        amount: Money,
        occurred_at: DateTime<Utc>,
        counterparty: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            occurred_at,
            counterparty,
        }
    }

    pub fn deposit(amount: Money, occurred_at: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Deposit, amount, occurred_at, None)
    }

    pub fn withdrawal(amount: Money, occurred_at: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Withdrawal, amount, occurred_at, None)
    }

    pub fn transfer_out(
        amount: Money,
        recipient: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            TransactionKind::TransferOut,
            amount,
            occurred_at,
            Some(recipient.into()),
        )
    }

    pub fn transfer_in(amount: Money, sender: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self::new(
            TransactionKind::TransferIn,
            amount,
            occurred_at,
            Some(sender.into()),
        )
    }

    /// Effect on the owning account's balance (negative for outflows).
    pub fn signed_amount(&self) -> Money {
        if self.kind.is_inflow() {
            self.amount
        } else {
            Money::from_minor(-self.amount.minor())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterparty_only_on_transfers() {
        let now = Utc::now();
        let amount = Money::from_major(5);

        assert_eq!(Transaction::deposit(amount, now).counterparty, None);
        assert_eq!(Transaction::withdrawal(amount, now).counterparty, None);
        assert_eq!(
            Transaction::transfer_out(amount, "maggie", now).counterparty.as_deref(),
            Some("maggie")
        );
        assert_eq!(
            Transaction::transfer_in(amount, "poojitha", now).counterparty.as_deref(),
            Some("poojitha")
        );
    }

    #[test]
    fn signed_amount_follows_direction() {
        let now = Utc::now();
        let amount = Money::from_major(5);

        assert_eq!(Transaction::deposit(amount, now).signed_amount(), amount);
        assert_eq!(
            Transaction::transfer_out(amount, "x", now).signed_amount(),
            Money::from_major(-5)
        );
    }

    #[test]
    fn kinds_display_like_the_statement() {
        assert_eq!(TransactionKind::TransferOut.to_string(), "Transfer Out");
        assert_eq!(TransactionKind::TransferIn.to_string(), "Transfer In");
    }
}
