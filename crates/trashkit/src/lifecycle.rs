//! # Lifecycle Engine
//!
//! Pure state transitions over a single record. Every function takes the
//! current time explicitly and returns a new value; nothing here touches a
//! collection. Committing the result is the caller's job (see
//! [`crate::api::TrashApi`] for the compare-and-swap commit path).
//!
//! | From      | Operation      | To        | Fails with       |
//! |-----------|----------------|-----------|------------------|
//! | Active    | `soft_delete`  | Trashed   | `AlreadyDeleted` |
//! | Trashed   | `restore`      | Active    | `NotDeleted`     |
//! | Trashed   | sweep (purge)  | (removed) | n/a              |
//!
//! There is no Active → Purged edge: a record must sit in the trash first.
//!
//! Preconditions follow `is_deleted` alone, so both transitions always emit
//! a consistent record even when handed an inconsistent one. Eligibility is
//! stricter: a trashed record without `deleted_at` cannot be aged and fails
//! with [`TrashError::CorruptRecordState`].

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::config::RetentionPolicy;
use crate::error::{Result, TrashError};
use crate::model::{Deletable, DeletionMeta, LifecycleState};

pub fn state<R: Deletable>(record: &R) -> Result<LifecycleState> {
    record.state()
}

/// Engine-owned fields of a record that has just been trashed.
pub fn deleted_patch(actor: &str, now: DateTime<Utc>) -> DeletionMeta {
    DeletionMeta {
        is_deleted: true,
        deleted_at: Some(now),
        deleted_by: Some(actor.to_string()),
        updated_at: now,
    }
}

/// Engine-owned fields of a record that has just been restored.
pub fn restored_patch(now: DateTime<Utc>) -> DeletionMeta {
    DeletionMeta::new(now)
}

pub fn soft_delete<R: Deletable>(record: &R, actor: &str, now: DateTime<Utc>) -> Result<R> {
    if record.is_deleted() {
        return Err(TrashError::AlreadyDeleted {
            id: record.id().to_string(),
        });
    }
    if !record.deletion().is_consistent() {
        warn!(id = record.id(), "soft-deleting record with stray deleted_at");
    }

    let mut next = record.clone();
    *next.deletion_mut() = deleted_patch(actor, now);
    debug!(id = record.id(), actor, "record moved to trash");
    Ok(next)
}

pub fn restore<R: Deletable>(record: &R, now: DateTime<Utc>) -> Result<R> {
    if !record.is_deleted() {
        return Err(TrashError::NotDeleted {
            id: record.id().to_string(),
        });
    }
    if !record.deletion().is_consistent() {
        warn!(id = record.id(), "restoring trashed record without deleted_at");
    }

    let mut next = record.clone();
    *next.deletion_mut() = restored_patch(now);
    debug!(id = record.id(), "record restored from trash");
    Ok(next)
}

/// `is_deleted && now - deleted_at >= retention_window`.
///
/// Monotonic in `now`: once eligible, a record stays eligible.
pub fn is_purge_eligible<R: Deletable>(
    record: &R,
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> Result<bool> {
    let meta = record.deletion();
    if !meta.is_deleted {
        return Ok(false);
    }
    let deleted_at = meta.deleted_at.ok_or_else(|| TrashError::CorruptRecordState {
        id: record.id().to_string(),
    })?;
    Ok(now - deleted_at >= policy.retention_window())
}

/// Instant at which a trashed record becomes purge eligible.
pub fn purge_deadline<R: Deletable>(record: &R, policy: &RetentionPolicy) -> Option<DateTime<Utc>> {
    let meta = record.deletion();
    if !meta.is_deleted {
        return None;
    }
    meta.deleted_at
        .and_then(|at| at.checked_add_signed(policy.retention_window()))
}

/// Whole days left before purge eligibility, rounded up, never negative.
///
/// Returns `0` exactly when a well-formed trashed record is eligible. Active
/// records report the full window. This is display support and never fails:
/// a corrupt record reports `0`.
pub fn remaining_retention_days<R: Deletable>(
    record: &R,
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> u32 {
    let meta = record.deletion();
    if !meta.is_deleted {
        return ceil_days(policy.retention_window());
    }
    let Some(deleted_at) = meta.deleted_at else {
        warn!(id = record.id(), "trashed record has no deleted_at, reporting 0 days");
        return 0;
    };

    match policy.retention_window().checked_sub(&(now - deleted_at)) {
        Some(remaining) => ceil_days(remaining),
        None => u32::MAX,
    }
}

fn ceil_days(span: Duration) -> u32 {
    if span <= Duration::zero() {
        return 0;
    }
    let whole = span.num_days();
    let days = if span > Duration::days(whole) {
        whole.saturating_add(1)
    } else {
        whole
    };
    u32::try_from(days).unwrap_or(u32::MAX)
}
