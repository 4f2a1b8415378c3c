use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use sdtmsg_core::error::{MessageError, Result};

use super::{IntField, NativeMessage, PayloadKind, StringField};

/// Native record as the store holds it. Blobs are already encoded.
#[derive(Debug, Clone, Default)]
pub struct StoredMessage {
    pub payload_kind: PayloadKind,
    pub payload: Bytes,
    pub properties: BTreeMap<String, Bytes>,
    pub strings: BTreeMap<StringField, String>,
    pub ints: BTreeMap<IntField, i64>,
}

/// In-process owner of native message records.
///
/// Plays the part of the messaging runtime: it owns storage, hands out one
/// `MemoryNative` per record and frees the record when that handle is
/// released.
pub struct MemoryStore {
    records: DashMap<u64, Arc<StoredMessage>>,
    seq: AtomicU64,
    released: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            seq: AtomicU64::new(1),
            released: AtomicU64::new(0),
        }
    }

    /// Store a record and return the native object that owns its release.
    pub fn insert(self: &Arc<Self>, record: StoredMessage) -> MemoryNative {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.records.insert(id, Arc::new(record));
        MemoryNative {
            store: Arc::clone(self),
            id,
        }
    }

    /// Records not yet released.
    pub fn live_count(&self) -> usize {
        self.records.len()
    }

    /// Records released through their native handle.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Drop a record behind its handle's back (e.g. the session that
    /// delivered it went away). Later reads through the handle fail with
    /// `InvalidHandle`.
    pub fn invalidate(&self, id: u64) -> bool {
        self.records.remove(&id).is_some()
    }

    fn get(&self, id: u64) -> Result<Arc<StoredMessage>> {
        self.records
            .get(&id)
            .map(|r| Arc::clone(r.value()))
            .ok_or(MessageError::InvalidHandle)
    }

    fn release(&self, id: u64) {
        if self.records.remove(&id).is_some() {
            self.released.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::warn!(id, "release of unknown native message ignored");
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `NativeMessage` backed by a `MemoryStore` record.
pub struct MemoryNative {
    store: Arc<MemoryStore>,
    id: u64,
}

impl MemoryNative {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl NativeMessage for MemoryNative {
    fn payload_kind(&self) -> Result<PayloadKind> {
        Ok(self.store.get(self.id)?.payload_kind)
    }

    fn payload_data(&self) -> Result<Bytes> {
        Ok(self.store.get(self.id)?.payload.clone())
    }

    fn property_keys(&self) -> Result<Vec<String>> {
        Ok(self.store.get(self.id)?.properties.keys().cloned().collect())
    }

    fn property(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.store.get(self.id)?.properties.get(key).cloned())
    }

    fn string_field(&self, field: StringField) -> Result<Option<String>> {
        Ok(self.store.get(self.id)?.strings.get(&field).cloned())
    }

    fn int_field(&self, field: IntField) -> Result<Option<i64>> {
        Ok(self.store.get(self.id)?.ints.get(&field).copied())
    }

    fn release(self: Box<Self>) {
        self.store.release(self.id);
    }
}
