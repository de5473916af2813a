//! # Configuration
//!
//! Retention is one value for the whole system: how long a trashed record
//! stays restorable. It is loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `TRASHKIT_RETENTION_DAYS`, `TRASHKIT_PURGE_TRIGGER`,
//!    `TRASHKIT_PURGE_INTERVAL_HOURS`.
//! 2. **TOML file**: optional, passed to [`TrashConfig::load`].
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `retention_days` | `7` | Days a trashed record remains restorable (1 to 36500) |
//! | `purge_trigger` | `manual` | `manual`, `on-trash-view` or `interval` |
//! | `purge_interval_hours` | `24` | Sweep interval when `purge_trigger = "interval"` |
//!
//! The resolved [`RetentionPolicy`] is handed read-only to the engine and the
//! aggregator. Every kind uses the same window.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrashError};

pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Upper bound on the retention window, keeping deadline arithmetic far from
/// the edge of the representable time range.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

pub const DEFAULT_PURGE_INTERVAL_HOURS: u32 = 24;

/// When a purge sweep runs. The engine itself never schedules anything;
/// the trigger only tells the facade when a sweep is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeTrigger {
    /// Only when the caller invokes a sweep.
    Manual,
    /// Before the trash view is produced.
    OnTrashView,
    /// At most once per `every`, checked via `sweep_if_due`.
    Interval { every: Duration },
}

impl PurgeTrigger {
    pub fn is_sweep_due(&self, last_sweep: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self {
            PurgeTrigger::Manual | PurgeTrigger::OnTrashView => false,
            PurgeTrigger::Interval { every } => match last_sweep {
                None => true,
                Some(last) => now - last >= *every,
            },
        }
    }
}

impl FromStr for PurgeTrigger {
    type Err = TrashError;

    /// Parses the trigger name. `interval` uses [`DEFAULT_PURGE_INTERVAL_HOURS`]; use
    /// [`TrashConfig`] to pick a different interval.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(PurgeTrigger::Manual),
            "on-trash-view" | "on_trash_view" => Ok(PurgeTrigger::OnTrashView),
            "interval" => Ok(PurgeTrigger::Interval {
                every: Duration::hours(DEFAULT_PURGE_INTERVAL_HOURS as i64),
            }),
            other => Err(TrashError::Config(format!(
                "Unknown purge trigger '{}'. Expected manual, on-trash-view or interval",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    retention_window: Duration,
    purge_trigger: PurgeTrigger,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_window: Duration::days(DEFAULT_RETENTION_DAYS as i64),
            purge_trigger: PurgeTrigger::Manual,
        }
    }
}

impl RetentionPolicy {
    pub fn new(retention_window: Duration) -> Result<Self> {
        if retention_window <= Duration::zero() {
            return Err(TrashError::Config(format!(
                "Retention window must be positive, got {}",
                retention_window
            )));
        }
        if retention_window > Duration::days(MAX_RETENTION_DAYS as i64) {
            return Err(TrashError::Config(format!(
                "Retention window must be at most {} days, got {}",
                MAX_RETENTION_DAYS,
                retention_window.num_days()
            )));
        }
        Ok(Self {
            retention_window,
            ..Default::default()
        })
    }

    pub fn from_days(days: u32) -> Result<Self> {
        Self::new(Duration::days(days as i64))
    }

    pub fn with_purge_trigger(mut self, trigger: PurgeTrigger) -> Self {
        self.purge_trigger = trigger;
        self
    }

    pub fn retention_window(&self) -> Duration {
        self.retention_window
    }

    pub fn purge_trigger(&self) -> PurgeTrigger {
        self.purge_trigger
    }
}

/// Raw configuration as read from env/TOML, before validation.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrashConfig {
    /// Days a soft-deleted record stays restorable before it may be purged.
    #[config(env = "TRASHKIT_RETENTION_DAYS", default = 7)]
    pub retention_days: u32,

    /// One of "manual", "on-trash-view", "interval".
    #[config(env = "TRASHKIT_PURGE_TRIGGER", default = "manual")]
    pub purge_trigger: String,

    /// Hours between sweeps when the trigger is "interval".
    #[config(env = "TRASHKIT_PURGE_INTERVAL_HOURS", default = 24)]
    pub purge_interval_hours: u32,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            purge_trigger: "manual".to_string(),
            purge_interval_hours: DEFAULT_PURGE_INTERVAL_HOURS,
        }
    }
}

impl TrashConfig {
    /// Load from environment over an optional TOML file over defaults.
    /// A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = TrashConfig::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn purge_trigger(&self) -> Result<PurgeTrigger> {
        match self.purge_trigger.parse::<PurgeTrigger>()? {
            PurgeTrigger::Interval { .. } => {
                if self.purge_interval_hours == 0 {
                    return Err(TrashError::Config(
                        "purge_interval_hours must be at least 1".to_string(),
                    ));
                }
                Ok(PurgeTrigger::Interval {
                    every: Duration::hours(self.purge_interval_hours as i64),
                })
            }
            trigger => Ok(trigger),
        }
    }

    pub fn policy(&self) -> Result<RetentionPolicy> {
        if self.retention_days == 0 || self.retention_days > MAX_RETENTION_DAYS {
            return Err(TrashError::Config(format!(
                "retention_days must be between 1 and {}, got {}",
                MAX_RETENTION_DAYS, self.retention_days
            )));
        }
        let trigger = self.purge_trigger()?;
        Ok(RetentionPolicy::from_days(self.retention_days)?.with_purge_trigger(trigger))
    }
}
