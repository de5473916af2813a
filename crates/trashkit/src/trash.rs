//! # Trash Aggregator
//!
//! One view over the soft-deleted records of every registered kind. The
//! aggregator owns no records: each query pulls the current trashed subset
//! from every collection and derives [`TrashEntry`] rows on the spot, so two
//! queries with no mutation in between return identical results.
//!
//! ## Ordering
//!
//! Most recently deleted first. Ties break on kind label, then id, which is
//! total because ids are unique within a kind.
//!
//! ## Partial results
//!
//! A collection that cannot be read does not sink the whole view. Its kind is
//! reported in `failures` and everything else is still returned. A trashed
//! record without `deleted_at` cannot be placed or aged, and one that fails to
//! serialize cannot be shown; either is logged, listed in `skipped`, and left
//! out of both the entries and the count.
//!
//! ## Purge
//!
//! [`TrashAggregator::sweep_purge`] is the only destructive operation. Nothing
//! runs it implicitly; see [`crate::config::PurgeTrigger`] for how the facade
//! decides when to call it. Each removal is conditional on the record still
//! being trashed with the `deleted_at` that was judged eligible, so a restore
//! that lands mid-sweep is never lost.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::collection::{ErasedCollection, RecordCollection};
use crate::config::RetentionPolicy;
use crate::error::{Result, TrashError};
use crate::lifecycle;
use crate::model::TrashEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindFailure {
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub kind: String,
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrashListing {
    pub entries: Vec<TrashEntry>,
    pub failures: Vec<KindFailure>,
    pub skipped: Vec<SkippedRecord>,
}

impl TrashListing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one kind could not be read.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrashEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for TrashListing {
    type Item = TrashEntry;
    type IntoIter = std::vec::IntoIter<TrashEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrashCount {
    pub total: usize,
    /// Every readable kind, including those with nothing in the trash.
    pub per_kind: BTreeMap<String, usize>,
    pub failures: Vec<KindFailure>,
}

impl TrashCount {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub sweep_id: Uuid,
    pub purged_count: usize,
    /// Purged per kind, for every kind the sweep reached.
    pub per_kind: BTreeMap<String, usize>,
    /// Eligible records that changed (e.g. were restored) before removal.
    pub skipped_changed: usize,
    /// Per-record errors, grouped by kind.
    pub errors: BTreeMap<String, Vec<String>>,
    pub failures: Vec<KindFailure>,
    /// The sweep stopped early; `per_kind` reflects the work done so far.
    pub interrupted: bool,
}

impl SweepReport {
    fn new() -> Self {
        Self {
            sweep_id: Uuid::new_v4(),
            purged_count: 0,
            per_kind: BTreeMap::new(),
            skipped_changed: 0,
            errors: BTreeMap::new(),
            failures: Vec::new(),
            interrupted: false,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.failures.is_empty() && !self.interrupted
    }
}

fn trash_order(a: &TrashEntry, b: &TrashEntry) -> Ordering {
    b.deleted_at
        .cmp(&a.deleted_at)
        .then_with(|| a.source_kind.cmp(&b.source_kind))
        .then_with(|| a.id.cmp(&b.id))
}

pub struct TrashAggregator {
    policy: RetentionPolicy,
    collections: Vec<Arc<dyn ErasedCollection>>,
}

impl TrashAggregator {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            collections: Vec::new(),
        }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    pub fn register<C: RecordCollection + 'static>(&mut self, collection: Arc<C>) -> Result<()> {
        let kind = RecordCollection::kind(collection.as_ref()).to_string();
        if kind.trim().is_empty() {
            return Err(TrashError::InvalidKind(kind));
        }
        if self.collections.iter().any(|c| c.label() == kind) {
            return Err(TrashError::DuplicateKind(kind));
        }
        debug!(kind = %kind, "registered collection");
        self.collections.push(collection);
        Ok(())
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.collections.iter().map(|c| c.label()).collect()
    }

    pub(crate) fn collection(&self, kind: &str) -> Result<&dyn ErasedCollection> {
        self.collections
            .iter()
            .find(|c| c.label() == kind)
            .map(|c| c.as_ref())
            .ok_or_else(|| TrashError::unavailable(kind, "no collection registered for this kind"))
    }

    /// Every trashed record across all kinds, most recently deleted first.
    pub fn list_trash(&self, now: DateTime<Utc>) -> TrashListing {
        self.gather(self.collections.iter(), now, &self.policy)
    }

    /// Trash of a single kind, for per-module trash tabs.
    pub fn list_trash_for(&self, kind: &str, now: DateTime<Utc>) -> Result<TrashListing> {
        let collection = self
            .collections
            .iter()
            .find(|c| c.label() == kind)
            .ok_or_else(|| TrashError::unavailable(kind, "no collection registered for this kind"))?;
        Ok(self.gather(std::iter::once(collection), now, &self.policy))
    }

    /// Number of entries `list_trash(now)` returns. Records that are already
    /// purge eligible but not yet swept still count: this reflects storage.
    ///
    /// Goes through the same per-record checks as the listing, payload
    /// serialization included, so both skip the same records.
    pub fn count_trash(&self, now: DateTime<Utc>) -> TrashCount {
        let listing = self.gather(self.collections.iter(), now, &self.policy);
        let mut per_kind: BTreeMap<String, usize> = self
            .collections
            .iter()
            .map(|c| c.label())
            .filter(|kind| !listing.failures.iter().any(|f| f.kind == *kind))
            .map(|kind| (kind.to_string(), 0))
            .collect();
        for entry in &listing.entries {
            *per_kind.entry(entry.source_kind.clone()).or_insert(0) += 1;
        }
        TrashCount {
            total: listing.entries.len(),
            per_kind,
            failures: listing.failures,
        }
    }

    /// What a sweep at `now` under `policy` would remove, without removing it.
    pub fn preview_purge(&self, now: DateTime<Utc>, policy: &RetentionPolicy) -> TrashListing {
        let mut listing = self.gather(self.collections.iter(), now, policy);
        listing.entries.retain(|entry| now - entry.deleted_at >= policy.retention_window());
        listing
    }

    pub fn sweep_purge(&self, now: DateTime<Utc>, policy: &RetentionPolicy) -> SweepReport {
        self.sweep_purge_until(now, policy, || false)
    }

    /// Sweep that checks `should_stop` before each record. Stopping leaves
    /// every record either untouched or fully removed.
    pub fn sweep_purge_until<F>(
        &self,
        now: DateTime<Utc>,
        policy: &RetentionPolicy,
        mut should_stop: F,
    ) -> SweepReport
    where
        F: FnMut() -> bool,
    {
        let mut report = SweepReport::new();
        let span = info_span!("sweep_purge", sweep_id = %report.sweep_id);
        let _guard = span.enter();

        for collection in &self.collections {
            let kind = collection.label().to_string();
            let views = match collection.trashed(false) {
                Ok(views) => views,
                Err(err) => {
                    warn!(kind = %kind, error = %err, "skipping unavailable collection");
                    report.failures.push(KindFailure {
                        kind,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let mut purged = 0;
            for view in views {
                if should_stop() {
                    report.interrupted = true;
                    break;
                }

                let deleted_at = match lifecycle::is_purge_eligible(&view, now, policy) {
                    Ok(true) => match view.meta.deleted_at {
                        Some(at) => at,
                        None => continue,
                    },
                    Ok(false) => continue,
                    Err(err) => {
                        warn!(kind = %kind, id = %view.id, "skipping corrupt record");
                        report
                            .errors
                            .entry(kind.clone())
                            .or_default()
                            .push(err.to_string());
                        continue;
                    }
                };

                match collection.remove_trashed(&view.id, deleted_at) {
                    Ok(true) => {
                        purged += 1;
                        info!(kind = %kind, id = %view.id, "purged record");
                    }
                    Ok(false) => {
                        report.skipped_changed += 1;
                        debug!(kind = %kind, id = %view.id, "record changed since eligibility check");
                    }
                    Err(err) => {
                        warn!(kind = %kind, id = %view.id, error = %err, "purge failed");
                        report
                            .errors
                            .entry(kind.clone())
                            .or_default()
                            .push(format!("{}: {}", view.id, err));
                    }
                }
            }

            report.per_kind.insert(kind, purged);
            if report.interrupted {
                break;
            }
        }

        report.purged_count = report.per_kind.values().sum();
        info!(
            purged = report.purged_count,
            interrupted = report.interrupted,
            failed_kinds = report.failures.len(),
            "sweep finished"
        );
        report
    }

    fn gather<'a, I>(
        &self,
        collections: I,
        now: DateTime<Utc>,
        policy: &RetentionPolicy,
    ) -> TrashListing
    where
        I: Iterator<Item = &'a Arc<dyn ErasedCollection>>,
    {
        let mut listing = TrashListing::default();

        for collection in collections {
            let kind = collection.label();
            let views = match collection.trashed(true) {
                Ok(views) => views,
                Err(err) => {
                    warn!(kind, error = %err, "trash listing is missing a kind");
                    listing.failures.push(KindFailure {
                        kind: kind.to_string(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            for mut view in views {
                if let Some(reason) = view.unreadable.take() {
                    warn!(kind, id = %view.id, reason = %reason, "trashed record is unreadable, skipping");
                    listing.skipped.push(SkippedRecord {
                        kind: kind.to_string(),
                        id: view.id,
                        reason,
                    });
                    continue;
                }
                let Some(deleted_at) = view.meta.deleted_at else {
                    warn!(kind, id = %view.id, "trashed record has no deleted_at, skipping");
                    listing.skipped.push(SkippedRecord {
                        kind: kind.to_string(),
                        id: view.id.clone(),
                        reason: TrashError::CorruptRecordState {
                            id: view.id.clone(),
                        }
                        .to_string(),
                    });
                    continue;
                };

                let remaining_days = lifecycle::remaining_retention_days(&view, now, policy);
                listing.entries.push(TrashEntry {
                    source_kind: kind.to_string(),
                    record: view.payload.take().unwrap_or(serde_json::Value::Null),
                    deleted_by: view.meta.deleted_by.take(),
                    id: view.id,
                    deleted_at,
                    remaining_days,
                });
            }
        }

        listing.entries.sort_by(trash_order);
        listing
    }
}
