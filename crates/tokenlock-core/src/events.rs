//! Ordered lock events and their digest.
//!
//! Events are appended in invocation order and never reordered. Two
//! replicas that executed the same calls produce byte-identical event
//! streams, which [`compute_event_root`] condenses into one hash.

use sha2::{Digest, Sha256};
use tokenlock_types::{
    constants::EVENT_DIGEST_DOMAIN, Amount, LockEvent, LockEventType, LockRecord, TxContext,
};

/// Collects the events of one transaction.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: TxContext,
    events: Vec<LockEvent>,
    next_sequence: u64,
}

impl EventEmitter {
    #[must_use]
    pub fn new(tx: TxContext) -> Self {
        Self {
            tx,
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Append an event for `record` as it stands after the transition.
    pub fn emit(
        &mut self,
        event_type: LockEventType,
        record: &LockRecord,
        amount_delta: Amount,
    ) -> LockEvent {
        let event = LockEvent::from_record(
            event_type,
            record,
            amount_delta,
            self.next_sequence,
            self.tx.tx_id.clone(),
            self.tx.timestamp,
        );
        self.next_sequence += 1;
        self.events.push(event.clone());
        event
    }

    #[must_use]
    pub fn events(&self) -> &[LockEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand the buffered events to the host event sink. Sequence numbers
    /// keep counting across drains.
    pub fn drain(&mut self) -> Vec<LockEvent> {
        std::mem::take(&mut self.events)
    }

    /// Root over the events currently buffered.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        compute_event_root(&self.events)
    }

    pub(crate) fn into_events(self) -> Vec<LockEvent> {
        self.events
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Compute a deterministic SHA-256 root over an ordered event list.
///
/// Every variable-length field is length-prefixed, so distinct event lists
/// never hash the same by field-boundary shifting.
#[must_use]
pub fn compute_event_root(events: &[LockEvent]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(EVENT_DIGEST_DOMAIN);
    hasher.update((events.len() as u64).to_le_bytes());

    for event in events {
        update_field(&mut hasher, event.event_type.to_string().as_bytes());
        update_field(&mut hasher, event.lock_kind.to_string().as_bytes());
        hasher.update(event.sequence.to_le_bytes());
        update_field(&mut hasher, event.tx_id.as_str().as_bytes());
        update_field(&mut hasher, event.timestamp.to_rfc3339().as_bytes());
        update_field(&mut hasher, event.id.as_str().as_bytes());
        update_field(&mut hasher, event.owner.as_str().as_bytes());
        update_field(&mut hasher, event.token.as_str().as_bytes());
        update_field(&mut hasher, &event.amount_delta.to_be_bytes());
        update_field(&mut hasher, event.reason.as_bytes());
        hasher.update((event.docs.len() as u64).to_le_bytes());
        for doc in &event.docs {
            update_field(&mut hasher, doc.as_bytes());
        }
        update_field(&mut hasher, &event.payload);
        hasher.update([u8::from(event.complete_operation)]);
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Recompute the root and compare.
#[must_use]
pub fn verify_event_root(events: &[LockEvent], expected_root: &[u8; 32]) -> bool {
    compute_event_root(events) == *expected_root
}
