//! # API Facade
//!
//! [`TrashApi`] is the single entry point presentation layers talk to. It is
//! a thin layer over the aggregator and the engine:
//!
//! - **Addresses records by `(kind, id)`** so callers never handle concrete
//!   record types.
//! - **Commits transitions atomically** via the collection's compare-and-swap
//!   hook; a lost race surfaces as `AlreadyDeleted` / `NotDeleted`.
//! - **Decides when to sweep** from the configured [`PurgeTrigger`]. Nothing
//!   runs in the background: `open_trash_view` and `sweep_if_due` are the
//!   hooks a UI or a scheduler calls.
//!
//! Everything returned is plain data. Callers translate stale-state errors
//! (see [`crate::error::TrashError::is_stale_state`]) into a notice, not a crash.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::badge::{Badge, BadgeProjector};
use crate::collection::{ErasedCollection, RecordCollection};
use crate::config::{PurgeTrigger, RetentionPolicy, TrashConfig};
use crate::error::Result;
use crate::model::DeletionMeta;
use crate::trash::{SweepReport, TrashAggregator, TrashCount, TrashListing};

/// What the trash page receives: the listing, plus the sweep that ran first
/// when the trigger is `OnTrashView`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrashView {
    pub sweep: Option<SweepReport>,
    pub listing: TrashListing,
}

pub struct TrashApi {
    aggregator: TrashAggregator,
    last_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl TrashApi {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            aggregator: TrashAggregator::new(policy),
            last_sweep: Mutex::new(None),
        }
    }

    pub fn from_config(config: &TrashConfig) -> Result<Self> {
        Ok(Self::new(config.policy()?))
    }

    pub fn register<C: RecordCollection + 'static>(&mut self, collection: Arc<C>) -> Result<()> {
        self.aggregator.register(collection)
    }

    pub fn policy(&self) -> &RetentionPolicy {
        self.aggregator.policy()
    }

    pub fn aggregator(&self) -> &TrashAggregator {
        &self.aggregator
    }

    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        *self.last_sweep.lock()
    }

    /// Move `(kind, id)` to the trash. Returns the committed deletion fields.
    pub fn soft_delete(
        &self,
        kind: &str,
        id: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<DeletionMeta> {
        let meta = self.aggregator.collection(kind)?.delete_by_id(id, actor, now)?;
        info!(kind, id, actor, "moved to trash");
        Ok(meta)
    }

    pub fn restore(&self, kind: &str, id: &str, now: DateTime<Utc>) -> Result<DeletionMeta> {
        let meta = self.aggregator.collection(kind)?.restore_by_id(id, now)?;
        info!(kind, id, "restored from trash");
        Ok(meta)
    }

    pub fn list_trash(&self, now: DateTime<Utc>) -> TrashListing {
        self.aggregator.list_trash(now)
    }

    pub fn list_trash_for(&self, kind: &str, now: DateTime<Utc>) -> Result<TrashListing> {
        self.aggregator.list_trash_for(kind, now)
    }

    pub fn count_trash(&self, now: DateTime<Utc>) -> TrashCount {
        self.aggregator.count_trash(now)
    }

    pub fn preview_purge(&self, now: DateTime<Utc>) -> TrashListing {
        self.aggregator.preview_purge(now, self.policy())
    }

    /// Run a sweep now, regardless of the trigger.
    pub fn sweep_purge(&self, now: DateTime<Utc>) -> SweepReport {
        let report = self.aggregator.sweep_purge(now, self.policy());
        *self.last_sweep.lock() = Some(now);
        report
    }

    /// Sweep if the trigger is `Interval` and the interval has elapsed.
    pub fn sweep_if_due(&self, now: DateTime<Utc>) -> Option<SweepReport> {
        let due = self
            .policy()
            .purge_trigger()
            .is_sweep_due(self.last_sweep(), now);
        if due {
            Some(self.sweep_purge(now))
        } else {
            None
        }
    }

    /// Listing for the trash page, sweeping first under `OnTrashView`.
    pub fn open_trash_view(&self, now: DateTime<Utc>) -> TrashView {
        let sweep = match self.policy().purge_trigger() {
            PurgeTrigger::OnTrashView => Some(self.sweep_purge(now)),
            PurgeTrigger::Interval { .. } => self.sweep_if_due(now),
            PurgeTrigger::Manual => None,
        };
        TrashView {
            sweep,
            listing: self.list_trash(now),
        }
    }

    pub fn badge(&self, now: DateTime<Utc>) -> Badge {
        BadgeProjector::new(&self.aggregator).badge(now)
    }

    pub fn badge_for(&self, kind: &str, now: DateTime<Utc>) -> Result<Badge> {
        BadgeProjector::new(&self.aggregator).count_for(kind, now)
    }
}
