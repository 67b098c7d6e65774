use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for a committed event, carrying stream metadata.
///
/// `sequence_number` is assigned by the publisher and increases by one for
/// every event committed in the process, so consumers can detect gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    /// Stream the event belongs to (an account number for ledger events).
    stream_id: String,
    stream_type: String,

    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        stream_id: impl Into<String>,
        stream_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            stream_id: stream_id.into(),
            stream_type: stream_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn stream_type(&self) -> &str {
        &self.stream_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
