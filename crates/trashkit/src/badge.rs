//! Navigation badge counts derived from the aggregator.
//!
//! Holds no state of its own. When some kinds cannot be read the badge still
//! shows the count it has and flags itself partial: an undercount beats
//! hiding trash that really exists.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::trash::TrashAggregator;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub count: usize,
    pub partial: bool,
    pub failed_kinds: Vec<String>,
}

impl Badge {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub struct BadgeProjector<'a> {
    aggregator: &'a TrashAggregator,
}

impl<'a> BadgeProjector<'a> {
    pub fn new(aggregator: &'a TrashAggregator) -> Self {
        Self { aggregator }
    }

    /// Total trash across every kind.
    pub fn badge(&self, now: DateTime<Utc>) -> Badge {
        let count = self.aggregator.count_trash(now);
        let failed_kinds: Vec<String> = count.failures.iter().map(|f| f.kind.clone()).collect();
        if !failed_kinds.is_empty() {
            warn!(?failed_kinds, count = count.total, "trash badge is partial");
        }
        Badge {
            count: count.total,
            partial: !failed_kinds.is_empty(),
            failed_kinds,
        }
    }

    /// Trash of one kind, for a per-module badge.
    pub fn count_for(&self, kind: &str, now: DateTime<Utc>) -> Result<Badge> {
        let listing = self.aggregator.list_trash_for(kind, now)?;
        let failed_kinds: Vec<String> = listing.failures.iter().map(|f| f.kind.clone()).collect();
        Ok(Badge {
            count: listing.len(),
            partial: !failed_kinds.is_empty(),
            failed_kinds,
        })
    }
}
