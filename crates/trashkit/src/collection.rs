//! # Collection Contract
//!
//! Each content module owns its own storage. To take part in the trash it
//! registers a [`RecordCollection`]: a kind label plus four storage hooks.
//! The engine never holds records itself; it reads through `list_all`/`get`
//! and writes back through the two conditional hooks.
//!
//! ## Atomicity
//!
//! A sweep and a user's restore may race on the same record. Both writes are
//! therefore conditional:
//!
//! - `apply_update` commits only if the stored `(is_deleted, deleted_at)` pair
//!   still equals the one the caller read (compare-and-swap).
//! - `hard_remove` removes only a record that is still trashed with the exact
//!   `deleted_at` the sweep judged eligible.
//!
//! Whichever write lands first wins; the other observes `false` and backs off.
//! A restore that loses finds the record gone and reports `NotDeleted`.
//!
//! ## Type erasure
//!
//! Kinds have unrelated record types. The aggregator keeps them behind the
//! crate-private `ErasedCollection`, implemented for every `RecordCollection`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TrashError};
use crate::lifecycle;
use crate::model::{Deletable, DeletionMeta};

/// Bounded retries for a compare-and-swap that keeps losing to other writers.
const MAX_CAS_ATTEMPTS: usize = 8;

pub trait RecordCollection: Send + Sync {
    type Record: Deletable + Serialize;

    /// Stable label, e.g. `"news"`, `"service"`, `"training-program"`.
    fn kind(&self) -> &str;

    /// Every record of this kind, active and trashed.
    fn list_all(&self) -> Result<Vec<Self::Record>>;

    fn get(&self, id: &str) -> Result<Option<Self::Record>> {
        Ok(self.list_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Overwrite the engine-owned fields of `id` with `patch`, but only if the
    /// stored record still sits at the lifecycle position described by
    /// `expected` (see [`DeletionMeta::same_position`]). Returns whether the
    /// write happened.
    fn apply_update(&self, id: &str, expected: &DeletionMeta, patch: &DeletionMeta)
        -> Result<bool>;

    /// Permanently remove `id` if it is still trashed with `deleted_at`.
    /// Returns whether a record was removed.
    fn hard_remove(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool>;
}

/// Soft-delete `id` inside `collection` and commit it atomically.
pub fn soft_delete_in<C: RecordCollection + ?Sized>(
    collection: &C,
    id: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<C::Record> {
    for _ in 0..MAX_CAS_ATTEMPTS {
        let current = collection
            .get(id)?
            .ok_or_else(|| TrashError::RecordNotFound {
                kind: collection.kind().to_string(),
                id: id.to_string(),
            })?;
        let next = lifecycle::soft_delete(&current, actor, now)?;
        if collection.apply_update(id, current.deletion(), next.deletion())? {
            return Ok(next);
        }
        debug!(kind = collection.kind(), id, "soft delete lost a race, retrying");
    }
    Err(contention(collection.kind(), id))
}

/// Restore `id` inside `collection` and commit it atomically.
///
/// A record that is no longer in the collection was purged, so this reports
/// `NotDeleted` rather than `RecordNotFound`.
pub fn restore_in<C: RecordCollection + ?Sized>(
    collection: &C,
    id: &str,
    now: DateTime<Utc>,
) -> Result<C::Record> {
    for _ in 0..MAX_CAS_ATTEMPTS {
        let current = collection.get(id)?.ok_or_else(|| TrashError::NotDeleted {
            id: id.to_string(),
        })?;
        let next = lifecycle::restore(&current, now)?;
        if collection.apply_update(id, current.deletion(), next.deletion())? {
            return Ok(next);
        }
        debug!(kind = collection.kind(), id, "restore lost a race, retrying");
    }
    Err(contention(collection.kind(), id))
}

fn contention(kind: &str, id: &str) -> TrashError {
    TrashError::Contention {
        kind: kind.to_string(),
        id: id.to_string(),
        attempts: MAX_CAS_ATTEMPTS,
    }
}

/// Engine view of a stored record: identity, deletion fields and, when
/// requested, the full record as JSON.
#[derive(Debug, Clone)]
pub(crate) struct RecordView {
    pub id: String,
    pub meta: DeletionMeta,
    pub payload: Option<serde_json::Value>,
    /// Set when the record could not be turned into JSON.
    pub unreadable: Option<String>,
}

impl Deletable for RecordView {
    fn id(&self) -> &str {
        &self.id
    }

    fn deletion(&self) -> &DeletionMeta {
        &self.meta
    }

    fn deletion_mut(&mut self) -> &mut DeletionMeta {
        &mut self.meta
    }
}

pub(crate) trait ErasedCollection: Send + Sync {
    fn label(&self) -> &str;

    /// Records with `is_deleted == true`, payload attached on request.
    /// A record that fails to serialize is returned with `unreadable` set
    /// instead of failing the whole kind.
    fn trashed(&self, with_payload: bool) -> Result<Vec<RecordView>>;

    fn delete_by_id(&self, id: &str, actor: &str, now: DateTime<Utc>) -> Result<DeletionMeta>;

    fn restore_by_id(&self, id: &str, now: DateTime<Utc>) -> Result<DeletionMeta>;

    fn remove_trashed(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool>;
}

impl<C: RecordCollection> ErasedCollection for C {
    fn label(&self) -> &str {
        RecordCollection::kind(self)
    }

    fn trashed(&self, with_payload: bool) -> Result<Vec<RecordView>> {
        let views = self
            .list_all()?
            .into_iter()
            .filter(|r| r.is_deleted())
            .map(|r| {
                let (payload, unreadable) = if with_payload {
                    match serde_json::to_value(&r) {
                        Ok(value) => (Some(value), None),
                        Err(err) => (None, Some(TrashError::from(err).to_string())),
                    }
                } else {
                    (None, None)
                };
                RecordView {
                    id: r.id().to_string(),
                    meta: r.deletion().clone(),
                    payload,
                    unreadable,
                }
            })
            .collect();
        Ok(views)
    }

    fn delete_by_id(&self, id: &str, actor: &str, now: DateTime<Utc>) -> Result<DeletionMeta> {
        soft_delete_in(self, id, actor, now).map(|r| r.deletion().clone())
    }

    fn restore_by_id(&self, id: &str, now: DateTime<Utc>) -> Result<DeletionMeta> {
        restore_in(self, id, now).map(|r| r.deletion().clone())
    }

    fn remove_trashed(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool> {
        RecordCollection::hard_remove(self, id, deleted_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{t0, News};
    use crate::store::memory::MemoryCollection;
    use chrono::Duration;

    fn news_collection() -> MemoryCollection<News> {
        let collection = MemoryCollection::new("news");
        collection.insert(News::with_id("n1", "Turbine contract signed", t0()));
        collection.insert(News::with_id("n2", "Safety award", t0()));
        collection
    }

    #[test]
    fn soft_delete_in_commits() {
        let news = news_collection();
        let deleted = soft_delete_in(&news, "n1", "alice", t0() + Duration::hours(1)).unwrap();
        assert!(deleted.meta.is_deleted);

        let stored = news.get("n1").unwrap().unwrap();
        assert_eq!(stored, deleted);
        assert!(!news.get("n2").unwrap().unwrap().meta.is_deleted);
    }

    #[test]
    fn soft_delete_in_unknown_id() {
        let news = news_collection();
        match soft_delete_in(&news, "missing", "alice", t0()) {
            Err(TrashError::RecordNotFound { kind, id }) => {
                assert_eq!(kind, "news");
                assert_eq!(id, "missing");
            }
            other => panic!("Expected RecordNotFound, got {:?}", other),
        }
    }

    #[test]
    fn restore_in_missing_record_is_not_deleted() {
        let news = news_collection();
        assert!(matches!(
            restore_in(&news, "gone", t0()),
            Err(TrashError::NotDeleted { .. })
        ));
    }

    #[test]
    fn stale_expected_state_rejects_update() {
        let news = news_collection();
        let original = news.get("n1").unwrap().unwrap();
        soft_delete_in(&news, "n1", "alice", t0()).unwrap();

        // A writer still holding the pre-delete view must not overwrite.
        let patch = lifecycle::deleted_patch("bob", t0() + Duration::hours(2));
        assert!(!news.apply_update("n1", original.deletion(), &patch).unwrap());
        let stored = news.get("n1").unwrap().unwrap();
        assert_eq!(stored.meta.deleted_by.as_deref(), Some("alice"));
    }

    /// Another writer touches the record between every read and write.
    struct Churning(MemoryCollection<News>);

    impl RecordCollection for Churning {
        type Record = News;

        fn kind(&self) -> &str {
            self.0.kind()
        }

        fn list_all(&self) -> Result<Vec<News>> {
            self.0.list_all()
        }

        fn apply_update(&self, _: &str, _: &DeletionMeta, _: &DeletionMeta) -> Result<bool> {
            Ok(false)
        }

        fn hard_remove(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool> {
            self.0.hard_remove(id, deleted_at)
        }
    }

    #[test]
    fn exhausted_retries_report_contention() {
        let churning = Churning(news_collection());

        match soft_delete_in(&churning, "n1", "alice", t0()) {
            Err(TrashError::Contention { kind, id, attempts }) => {
                assert_eq!(kind, "news");
                assert_eq!(id, "n1");
                assert_eq!(attempts, MAX_CAS_ATTEMPTS);
            }
            other => panic!("Expected Contention, got {:?}", other),
        }
        assert!(!churning.0.get("n1").unwrap().unwrap().meta.is_deleted);
    }

    #[test]
    fn erased_trashed_filters_and_attaches_payload() {
        let news = news_collection();
        soft_delete_in(&news, "n2", "alice", t0()).unwrap();

        let erased: &dyn ErasedCollection = &news;
        let bare = erased.trashed(false).unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].id, "n2");
        assert!(bare[0].payload.is_none());

        let full = erased.trashed(true).unwrap();
        let payload = full[0].payload.as_ref().unwrap();
        assert_eq!(payload["title"], "Safety award");
    }
}
