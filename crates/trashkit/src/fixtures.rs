//! Sample content kinds and a pre-wired trash for tests.
//!
//! Compiled for unit tests and behind the `test_utils` feature.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::RetentionPolicy;
use crate::lifecycle;
use crate::model::{Deletable, DeletionMeta};
use crate::store::memory::MemoryCollection;
use crate::trash::TrashAggregator;

/// Fixed reference instant so tests never depend on the wall clock.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: String,
    pub title: String,
    pub status: NewsStatus,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl News {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, now)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: NewsStatus::Published,
            meta: DeletionMeta::new(now),
        }
    }
}

impl Deletable for News {
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

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl Service {
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            meta: DeletionMeta::new(now),
        }
    }
}

impl Deletable for Service {
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

/// A `news` and a `service` collection registered with one aggregator.
pub struct TrashFixture {
    pub news: Arc<MemoryCollection<News>>,
    pub services: Arc<MemoryCollection<Service>>,
    pub aggregator: TrashAggregator,
}

impl Default for TrashFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TrashFixture {
    pub fn new() -> Self {
        let news = Arc::new(MemoryCollection::new("news"));
        let services = Arc::new(MemoryCollection::new("service"));
        let mut aggregator = TrashAggregator::new(RetentionPolicy::default());
        aggregator
            .register(news.clone())
            .expect("fresh aggregator has no kinds");
        aggregator
            .register(services.clone())
            .expect("fresh aggregator has no kinds");
        Self {
            news,
            services,
            aggregator,
        }
    }

    pub fn with_active_news(self, id: &str, title: &str) -> Self {
        self.news.insert(News::with_id(id, title, t0()));
        self
    }

    /// News item trashed by "alice" at `deleted_at`.
    pub fn with_trashed_news(self, id: &str, title: &str, deleted_at: DateTime<Utc>) -> Self {
        let news = News::with_id(id, title, deleted_at - Duration::days(30));
        let trashed = lifecycle::soft_delete(&news, "alice", deleted_at).unwrap();
        self.news.insert(trashed);
        self
    }

    pub fn with_trashed_service(self, id: &str, name: &str, deleted_at: DateTime<Utc>) -> Self {
        let service = Service::with_id(id, name, deleted_at - Duration::days(30));
        let trashed = lifecycle::soft_delete(&service, "bob", deleted_at).unwrap();
        self.services.insert(trashed);
        self
    }
}
