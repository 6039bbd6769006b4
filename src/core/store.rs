//! # Component record store.
//!
//! Maps tokens to records and remembers destroyed tokens so they are never
//! resurrected. Handlers check a record out, drive it, and check it back in
//! (or tombstone it); the dispatcher is the only caller.
//!
//! Tombstones are kept for the life of the runtime: one token per destroyed
//! component. Like the `u64` sequence counter, this is not reclaimed.

use std::collections::{HashMap, HashSet};

use super::record::{ComponentRecord, RecordSnapshot};
use crate::components::ComponentToken;

#[derive(Default)]
pub(crate) struct RecordStore {
    records: HashMap<ComponentToken, ComponentRecord>,
    tombstones: HashSet<ComponentToken>,
}

impl RecordStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True if a launch for `token` must be rejected.
    pub(crate) fn is_taken(&self, token: ComponentToken) -> bool {
        self.records.contains_key(&token) || self.tombstones.contains(&token)
    }

    pub(crate) fn is_tombstoned(&self, token: ComponentToken) -> bool {
        self.tombstones.contains(&token)
    }

    pub(crate) fn get(&self, token: ComponentToken) -> Option<&ComponentRecord> {
        self.records.get(&token)
    }

    pub(crate) fn checkout(&mut self, token: ComponentToken) -> Option<ComponentRecord> {
        self.records.remove(&token)
    }

    pub(crate) fn checkin(&mut self, record: ComponentRecord) {
        self.records.insert(record.token, record);
    }

    /// Drops the record for good. The tombstone is never removed.
    pub(crate) fn tombstone(&mut self, token: ComponentToken) {
        self.records.remove(&token);
        self.tombstones.insert(token);
    }

    /// Live tokens in ascending order.
    pub(crate) fn tokens(&self) -> Vec<ComponentToken> {
        let mut tokens: Vec<_> = self.records.keys().copied().collect();
        tokens.sort_unstable();
        tokens
    }

    pub(crate) fn snapshots(&self) -> Vec<RecordSnapshot> {
        let mut out: Vec<_> = self.records.values().map(ComponentRecord::snapshot).collect();
        out.sort_unstable_by_key(|s| s.token);
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
