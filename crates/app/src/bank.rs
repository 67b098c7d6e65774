//! Shared, thread-safe banking service.
//!
//! ```text
//! caller ── SessionId ──► Bank ──► Mutex<Ledger> (single writer)
//!                           │
//!                           └──► EventBus (after commit)
//! ```
//!
//! Every ledger operation, including a transfer touching two accounts, runs
//! inside one critical section on the ledger lock. Check and commit are
//! therefore atomic with respect to every other caller: no lost updates and
//! no double spends. Committed events are published before the lock is
//! released so envelope sequence numbers follow commit order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use minibank_auth::{SessionError, SessionRegistry};
use minibank_core::{Money, SessionId};
use minibank_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use minibank_ledger::{
    Account, AccountEvent, AccountNumber, AccountNumberGenerator, Ledger, LedgerConfig,
    LedgerError, RandomAccountNumbers, Transaction,
};

/// Stream type stamped on every ledger envelope.
pub const ACCOUNT_STREAM: &str = "account";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A thread panicked while holding a lock; state may be inconsistent.
    #[error("bank state lock poisoned")]
    Poisoned,
}

pub struct Bank<G = RandomAccountNumbers> {
    config: LedgerConfig,
    ledger: Mutex<Ledger<G>>,
    sessions: Mutex<SessionRegistry<AccountNumber>>,
    bus: InMemoryEventBus<EventEnvelope<AccountEvent>>,
    sequence: AtomicU64,
}

impl Bank {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_ledger(Ledger::new(config))
    }
}

impl<G: AccountNumberGenerator> Bank<G> {
    pub fn with_ledger(ledger: Ledger<G>) -> Self {
        Self {
            config: *ledger.config(),
            ledger: Mutex::new(ledger),
            sessions: Mutex::new(SessionRegistry::new()),
            bus: InMemoryEventBus::new(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Receive an envelope for every event committed from now on.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<AccountEvent>> {
        self.bus.subscribe()
    }

    /// Run a read-only query against a consistent view of the ledger.
    pub fn inspect<R>(&self, query: impl FnOnce(&Ledger<G>) -> R) -> Result<R, BankError> {
        let ledger = self.lock_ledger()?;
        Ok(query(&ledger))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration and sessions
    // ─────────────────────────────────────────────────────────────────────

    pub fn register(
        &self,
        username: &str,
        password: &str,
        initial_deposit: Money,
    ) -> Result<Account, BankError> {
        let mut ledger = self.lock_ledger()?;
        let account = rejected_as_warning(
            "registration",
            ledger.register(username, password, initial_deposit).cloned(),
        )?;
        info!(
            account_number = %account.number(),
            username = account.username(),
            initial_deposit = %initial_deposit,
            "account registered"
        );
        self.publish_committed(&mut ledger);
        Ok(account)
    }

    /// Register under a fixed account number (demo seeding).
    pub fn register_with_number(
        &self,
        number: AccountNumber,
        username: &str,
        password: &str,
        initial_deposit: Money,
    ) -> Result<Account, BankError> {
        let mut ledger = self.lock_ledger()?;
        let account = rejected_as_warning(
            "registration",
            ledger
                .register_with_number(number, username, password, initial_deposit)
                .cloned(),
        )?;
        info!(account_number = %account.number(), username = account.username(), "account registered");
        self.publish_committed(&mut ledger);
        Ok(account)
    }

    /// Check credentials and open a session bound to the matching account.
    pub fn login(&self, username: &str, password: &str) -> Result<SessionId, BankError> {
        let number = {
            let ledger = self.lock_ledger()?;
            rejected_as_warning(
                "login",
                ledger
                    .authenticate(username, password)
                    .map(|account| account.number().clone()),
            )?
        };

        let session = self.lock_sessions()?.open(number.clone());
        info!(account_number = %number, %session, "logged in");
        Ok(session)
    }

    pub fn logout(&self, session: &SessionId) -> Result<(), BankError> {
        let number = self.lock_sessions()?.close(session)?;
        info!(account_number = %number, %session, "logged out");
        Ok(())
    }

    /// Snapshot of the session's account.
    pub fn account(&self, session: &SessionId) -> Result<Account, BankError> {
        let number = self.current_account(session)?;
        let ledger = self.lock_ledger()?;
        ledger
            .account(&number)
            .cloned()
            .ok_or(BankError::Ledger(LedgerError::AccountNotFound))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Money movement
    // ─────────────────────────────────────────────────────────────────────

    pub fn withdraw(&self, session: &SessionId, amount: Money) -> Result<Transaction, BankError> {
        let number = self.current_account(session)?;
        let mut ledger = self.lock_ledger()?;

        let transaction = rejected_as_warning("withdrawal", ledger.withdraw(&number, amount))?;
        info!(account_number = %number, amount = %amount, "withdrawal completed");

        self.publish_committed(&mut ledger);
        Ok(transaction)
    }

    pub fn transfer(
        &self,
        session: &SessionId,
        recipient: &AccountNumber,
        amount: Money,
    ) -> Result<(Transaction, Transaction), BankError> {
        let number = self.current_account(session)?;
        let mut ledger = self.lock_ledger()?;

        let pair = rejected_as_warning("transfer", ledger.transfer(&number, recipient, amount))?;
        info!(
            from = %number,
            to = %recipient,
            amount = %amount,
            "transfer completed"
        );

        self.publish_committed(&mut ledger);
        Ok(pair)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn lock_ledger(&self) -> Result<MutexGuard<'_, Ledger<G>>, BankError> {
        self.ledger.lock().map_err(|_| BankError::Poisoned)
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, SessionRegistry<AccountNumber>>, BankError> {
        self.sessions.lock().map_err(|_| BankError::Poisoned)
    }

    /// Resolve a session to its account number. The session lock is released
    /// before the caller takes the ledger lock.
    fn current_account(&self, session: &SessionId) -> Result<AccountNumber, BankError> {
        let sessions = self.lock_sessions()?;
        Ok(sessions.resolve(session)?.clone())
    }

    /// Wrap and publish everything the ledger committed. Must be called with
    /// the ledger lock held.
    fn publish_committed(&self, ledger: &mut Ledger<G>) {
        for event in ledger.drain_events() {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            let event_type = event.event_type();
            let stream_id = event.account_number().to_string();
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                stream_id,
                ACCOUNT_STREAM,
                sequence,
                event,
            );

            if let Err(error) = self.bus.publish(envelope) {
                // The commit stands; only the notification is lost.
                warn!(?error, sequence, event_type, "failed to publish ledger event");
            }
        }
    }
}

/// Log a rejected operation and lift the error into `BankError`.
fn rejected_as_warning<T>(operation: &'static str, result: Result<T, LedgerError>) -> Result<T, BankError> {
    result.map_err(|error| {
        warn!(operation, %error, "operation rejected");
        BankError::Ledger(error)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_ledger::TransactionKind;

    fn bank() -> Bank {
        Bank::with_ledger(Ledger::with_generator(
            LedgerConfig::default(),
            RandomAccountNumbers::seeded(11),
        ))
    }

    fn money(major: i64) -> Money {
        Money::from_major(major)
    }

    #[test]
    fn login_binds_session_to_account() {
        let bank = bank();
        let registered = bank.register("alice", "pw", money(500)).unwrap();

        let session = bank.login("alice", "pw").unwrap();
        let account = bank.account(&session).unwrap();

        assert_eq!(account.number(), registered.number());
        assert_eq!(account.balance(), money(500));
    }

    #[test]
    fn bad_login_opens_no_session() {
        let bank = bank();
        bank.register("alice", "pw", money(500)).unwrap();

        assert_eq!(
            bank.login("alice", "wrong").unwrap_err(),
            BankError::Ledger(LedgerError::InvalidCredentials)
        );
        assert_eq!(bank.lock_sessions().unwrap().len(), 0);
    }

    #[test]
    fn logged_out_session_is_rejected() {
        let bank = bank();
        bank.register("alice", "pw", money(500)).unwrap();
        let session = bank.login("alice", "pw").unwrap();

        bank.logout(&session).unwrap();

        assert_eq!(
            bank.withdraw(&session, money(1)).unwrap_err(),
            BankError::Session(SessionError::NotLoggedIn)
        );
        assert_eq!(
            bank.logout(&session).unwrap_err(),
            BankError::Session(SessionError::NotLoggedIn)
        );
    }

    #[test]
    fn withdraw_and_transfer_act_on_the_session_account() {
        let bank = bank();
        bank.register("alice", "pw", money(500)).unwrap();
        let bob = bank.register("bob", "pw", money(100)).unwrap();
        let session = bank.login("alice", "pw").unwrap();

        let tx = bank.withdraw(&session, money(50)).unwrap();
        assert_eq!(tx.kind, TransactionKind::Withdrawal);

        let (out, incoming) = bank.transfer(&session, bob.number(), money(150)).unwrap();
        assert_eq!(out.counterparty.as_deref(), Some("bob"));
        assert_eq!(incoming.counterparty.as_deref(), Some("alice"));

        assert_eq!(bank.account(&session).unwrap().balance(), money(300));
        let bob_balance = bank
            .inspect(|ledger| ledger.account(bob.number()).map(Account::balance))
            .unwrap();
        assert_eq!(bob_balance, Some(money(250)));
    }

    #[test]
    fn committed_events_are_published_in_order() {
        let bank = bank();
        let subscription = bank.subscribe();

        bank.register("alice", "pw", money(500)).unwrap();
        let bob = bank.register("bob", "pw", money(100)).unwrap();
        let session = bank.login("alice", "pw").unwrap();
        bank.transfer(&session, bob.number(), money(10)).unwrap();
        let _ = bank.withdraw(&session, money(10_000));

        let envelopes = subscription.drain();
        let sequence: Vec<u64> = envelopes.iter().map(EventEnvelope::sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3, 4]);

        let types: Vec<&str> = envelopes.iter().map(|e| e.payload().event_type()).collect();
        assert_eq!(
            types,
            vec![
                "ledger.account.opened",
                "ledger.account.opened",
                "ledger.account.transferred_out",
                "ledger.account.transferred_in",
            ]
        );
        assert_eq!(envelopes[3].stream_id(), bob.number().as_str());
        assert!(envelopes.iter().all(|e| e.stream_type() == ACCOUNT_STREAM));
    }
}
