use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::collection::RecordCollection;
use crate::error::{Result, TrashError};
use crate::model::{Deletable, DeletionMeta};

/// In-memory record collection keyed by record id.
///
/// Uses `RwLock` so a sweep thread and request threads can share one
/// collection. Each conditional write holds the write lock for its whole
/// check-then-modify step, which is what makes it atomic per record.
pub struct MemoryCollection<R> {
    kind: String,
    records: RwLock<BTreeMap<String, R>>,
    available: AtomicBool,
}

impl<R: Deletable> MemoryCollection<R> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            records: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_records(kind: impl Into<String>, records: impl IntoIterator<Item = R>) -> Self {
        let collection = Self::new(kind);
        for record in records {
            collection.insert(record);
        }
        collection
    }

    /// Insert or replace a record. Returns the previous value for that id.
    pub fn insert(&self, record: R) -> Option<R> {
        self.records
            .write()
            .insert(record.id().to_string(), record)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Simulate an unreachable backing store for failure-path testing.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TrashError::unavailable(&self.kind, "collection is offline"))
        }
    }
}

impl<R> RecordCollection for MemoryCollection<R>
where
    R: Deletable + Serialize + Send + Sync,
{
    type Record = R;

    fn kind(&self) -> &str {
        &self.kind
    }

    fn list_all(&self) -> Result<Vec<R>> {
        self.check_available()?;
        Ok(self.records.read().values().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<R>> {
        self.check_available()?;
        Ok(self.records.read().get(id).cloned())
    }

    fn apply_update(&self, id: &str, expected: &DeletionMeta, patch: &DeletionMeta) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.write();
        match records.get_mut(id) {
            Some(record) if record.deletion().same_position(expected) => {
                *record.deletion_mut() = patch.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn hard_remove(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.write();
        let still_trashed = records
            .get(id)
            .map(|r| r.deletion().is_deleted && r.deletion().deleted_at == Some(deleted_at))
            .unwrap_or(false);
        if still_trashed {
            records.remove(id);
        }
        Ok(still_trashed)
    }
}
