//! Destination-side reorder buffer.
//!
//! Channel deliveries ride an asynchronous script queue and may arrive out
//! of transmission order. The destination must never hand message k+1 to
//! application logic before message k, so arrivals are buffered here and
//! released as contiguous runs starting from the next expected sequence
//! number. There is no gap recovery: a permanently missing sequence number
//! stalls delivery on that channel forever.

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

/// Per-channel reorder buffer. Sequence numbers start at 0.
#[derive(Debug, Default)]
pub struct OrderingBuffer {
    next: u64,
    pending: BTreeMap<u64, Value>,
}

impl OrderingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one arrival and release the contiguous run it completes.
    ///
    /// Returns the payloads now deliverable to application logic, in
    /// sequence order (possibly empty if a gap remains). Stale or duplicate
    /// sequence numbers are dropped.
    pub fn push(&mut self, seq: u64, payload: Value) -> Vec<Value> {
        if seq < self.next || self.pending.contains_key(&seq) {
            debug!("Dropping duplicate/stale channel message seq={seq}");
            return Vec::new();
        }

        self.pending.insert(seq, payload);

        let mut released = Vec::new();
        while let Some(payload) = self.pending.remove(&self.next) {
            released.push(payload);
            self.next += 1;
        }
        released
    }

    /// The next sequence number application logic is waiting for.
    pub fn next_expected(&self) -> u64 {
        self.next
    }

    /// Number of buffered out-of-order arrivals.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}
