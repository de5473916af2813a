//! # Domain Model: the Deletable Record Contract
//!
//! Content entities (news articles, services, training programs, projects,
//! clients, job postings) share no base type. They take part in the trash
//! lifecycle by embedding a [`DeletionMeta`] and implementing [`Deletable`].
//! Everything else about them (title, status, body) is opaque here.
//!
//! ## Lifecycle
//!
//! ```text
//!            soft_delete              time + sweep
//!   Active ───────────────▶ Trashed ───────────────▶ Purged (absent)
//!      ▲                       │
//!      └────── restore ────────┘
//! ```
//!
//! Only `Active` and `Trashed` are ever stored. `Purged` means the record is
//! gone from its collection; there is no flag for it.
//!
//! ## Consistency
//!
//! `is_deleted` and `deleted_at` move together. A trashed record without a
//! `deleted_at` (or an active one carrying one) is a programming error and is
//! reported as [`TrashError::CorruptRecordState`].
//!
//! ## Archive is not trash
//!
//! Some kinds have their own workflow status (News can be `archived`). That
//! status lives in the entity's own fields and is never read or written by
//! the engine, so an archived record can be trashed and comes back archived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrashError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Active,
    Trashed,
}

/// The four engine-owned fields of a record.
///
/// This is also the patch shape handed to a collection when a transition is
/// committed: the collection overwrites its stored copy with these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionMeta {
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DeletionMeta {
    /// Metadata for a freshly created, active record.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            updated_at: now,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.is_deleted == self.deleted_at.is_some()
    }

    /// True when `other` describes the same lifecycle position: same
    /// `is_deleted` and same `deleted_at`. Used as the compare-and-swap key.
    pub fn same_position(&self, other: &DeletionMeta) -> bool {
        self.is_deleted == other.is_deleted && self.deleted_at == other.deleted_at
    }
}

/// Capability set an entity must expose to participate in the trash lifecycle.
///
/// `id` only needs to be unique within the entity's own collection.
pub trait Deletable: Clone {
    fn id(&self) -> &str;

    fn deletion(&self) -> &DeletionMeta;

    fn deletion_mut(&mut self) -> &mut DeletionMeta;

    fn state(&self) -> Result<LifecycleState> {
        let meta = self.deletion();
        match (meta.is_deleted, meta.deleted_at) {
            (false, None) => Ok(LifecycleState::Active),
            (true, Some(_)) => Ok(LifecycleState::Trashed),
            _ => Err(TrashError::CorruptRecordState {
                id: self.id().to_string(),
            }),
        }
    }

    fn is_deleted(&self) -> bool {
        self.deletion().is_deleted
    }
}

/// One row of the cross-kind trash view. Derived on every query, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    pub source_kind: String,
    pub id: String,
    /// The full record as plain data, so presentation layers can render
    /// kind-specific columns without knowing the concrete type.
    pub record: serde_json::Value,
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: Option<String>,
    pub remaining_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Note {
        id: String,
        meta: DeletionMeta,
    }

    impl Deletable for Note {
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

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn note(meta: DeletionMeta) -> Note {
        Note {
            id: "n1".into(),
            meta,
        }
    }

    #[test]
    fn new_meta_is_active() {
        let meta = DeletionMeta::new(t0());
        assert!(meta.is_consistent());
        assert_eq!(note(meta).state().unwrap(), LifecycleState::Active);
    }

    #[test]
    fn trashed_state_requires_deleted_at() {
        let mut meta = DeletionMeta::new(t0());
        meta.is_deleted = true;
        assert!(!meta.is_consistent());

        match note(meta.clone()).state() {
            Err(TrashError::CorruptRecordState { id }) => assert_eq!(id, "n1"),
            other => panic!("Expected CorruptRecordState, got {:?}", other),
        }

        meta.deleted_at = Some(t0());
        assert_eq!(note(meta).state().unwrap(), LifecycleState::Trashed);
    }

    #[test]
    fn active_with_deleted_at_is_corrupt() {
        let mut meta = DeletionMeta::new(t0());
        meta.deleted_at = Some(t0());
        assert!(note(meta).state().is_err());
    }

    #[test]
    fn same_position_ignores_attribution_and_updated_at() {
        let a = DeletionMeta {
            is_deleted: true,
            deleted_at: Some(t0()),
            deleted_by: Some("alice".into()),
            updated_at: t0(),
        };
        let mut b = a.clone();
        b.deleted_by = Some("bob".into());
        b.updated_at = t0() + chrono::Duration::hours(1);
        assert!(a.same_position(&b));

        b.deleted_at = Some(t0() + chrono::Duration::seconds(1));
        assert!(!a.same_position(&b));
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = DeletionMeta {
            is_deleted: true,
            deleted_at: Some(t0()),
            deleted_by: Some("alice".into()),
            updated_at: t0(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["isDeleted"], true);
        assert_eq!(json["deletedBy"], "alice");
        assert!(json.get("deletedAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn meta_deserializes_with_missing_optional_fields() {
        let meta: DeletionMeta =
            serde_json::from_str(r#"{"updatedAt":"2024-03-01T09:00:00Z"}"#).unwrap();
        assert!(!meta.is_deleted);
        assert!(meta.deleted_at.is_none());
        assert!(meta.deleted_by.is_none());
        assert_eq!(meta.updated_at, t0());
    }
}
