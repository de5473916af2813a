#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use trashkit::{Deletable, DeletionMeta};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap()
}

macro_rules! deletable {
    ($ty:ident) => {
        impl Deletable for $ty {
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
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub headline: String,
    pub status: ArticleStatus,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl NewsArticle {
    pub fn new(id: &str, headline: &str, status: ArticleStatus) -> Self {
        Self {
            id: id.to_string(),
            headline: headline.to_string(),
            status,
            meta: DeletionMeta::new(t0()),
        }
    }
}

deletable!(NewsArticle);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineeringService {
    pub id: String,
    pub name: String,
    pub discipline: String,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl EngineeringService {
    pub fn new(id: &str, name: &str, discipline: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            discipline: discipline.to_string(),
            meta: DeletionMeta::new(t0()),
        }
    }
}

deletable!(EngineeringService);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub client_name: String,
    pub budget_eur: u64,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl Project {
    pub fn new(id: &str, client_name: &str, budget_eur: u64) -> Self {
        Self {
            id: id.to_string(),
            client_name: client_name.to_string(),
            budget_eur,
            meta: DeletionMeta::new(t0()),
        }
    }
}

deletable!(Project);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub role: String,
    pub open: bool,
    #[serde(flatten)]
    pub meta: DeletionMeta,
}

impl JobPosting {
    pub fn new(id: &str, role: &str) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            open: true,
            meta: DeletionMeta::new(t0()),
        }
    }
}

deletable!(JobPosting);
