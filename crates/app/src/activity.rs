//! Background activity log fed by the bank's event bus.

use std::thread::JoinHandle;

use tracing::{debug, info};

use minibank_events::{Event, EventEnvelope, Subscription};
use minibank_ledger::AccountEvent;

/// Log every committed ledger event until the bank is dropped.
pub fn spawn_activity_log(subscription: Subscription<EventEnvelope<AccountEvent>>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while let Ok(envelope) = subscription.recv() {
            record(&envelope);
        }
        debug!("activity log stopped");
    })
}

fn record(envelope: &EventEnvelope<AccountEvent>) {
    let event = envelope.payload();
    let transaction = event.transaction();

    info!(
        sequence = envelope.sequence_number(),
        account_number = envelope.stream_id(),
        event_type = event.event_type(),
        amount = %transaction.amount,
        counterparty = transaction.counterparty.as_deref().unwrap_or(""),
        "ledger activity"
    );

    if let Ok(payload) = serde_json::to_string(event) {
        debug!(%payload, "ledger event payload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::Money;
    use minibank_ledger::LedgerConfig;

    use crate::bank::Bank;

    #[test]
    fn stops_when_the_bank_is_dropped() {
        let bank = Bank::new(LedgerConfig::default());
        let handle = spawn_activity_log(bank.subscribe());

        bank.register("alice", "pw", Money::from_major(100)).unwrap();
        drop(bank);

        handle.join().unwrap();
    }
}
