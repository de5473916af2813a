//! # Trashkit Architecture
//!
//! Trashkit is the soft-delete / trash / retention lifecycle shared by every
//! content module of an admin application (news, services, training
//! programs, projects, clients, job postings). Records are never deleted
//! outright: they move to a restorable trash, stay there for a retention
//! window, and are purged once that window has passed.
//!
//! The crate owns no storage and renders nothing. Each content module keeps
//! its own collection and plugs it in through a small contract.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Facade (api.rs)                                            │
//! │  - (kind, id) addressing, purge trigger handling            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (lifecycle.rs) · Aggregator (trash.rs) · badge.rs   │
//! │  - Pure transitions, cross-kind views, sweeps, counts       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Contract (model.rs, collection.rs)                         │
//! │  - Deletable records, RecordCollection storage hooks        │
//! │  - MemoryCollection (store/) as the reference collection    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principles
//!
//! - **Time is an argument.** Every operation takes `now`; nothing reads the
//!   clock, so behaviour is reproducible and testable.
//! - **Values in, values out.** The engine returns new records; committing
//!   them is a conditional write owned by the collection.
//! - **No background work.** Sweeps run only when called (see
//!   [`config::PurgeTrigger`]).
//! - **Partial over nothing.** An unreadable kind is reported, not fatal.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade presentation layers call
//! - [`lifecycle`]: Soft delete, restore, purge eligibility, remaining days
//! - [`trash`]: Cross-kind listing, counts and purge sweeps
//! - [`badge`]: Badge counts for navigation
//! - [`collection`]: The storage contract each content module implements
//! - [`model`]: `Deletable`, `DeletionMeta`, `TrashEntry`
//! - [`config`]: Retention policy and its file/env configuration
//! - [`store`]: In-memory collection
//! - [`error`]: Error types

pub mod api;
pub mod badge;
pub mod collection;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures;
pub mod lifecycle;
pub mod model;
pub mod store;
pub mod trash;

pub use api::{TrashApi, TrashView};
pub use collection::RecordCollection;
pub use config::{PurgeTrigger, RetentionPolicy, TrashConfig};
pub use error::{Result, TrashError};
pub use model::{Deletable, DeletionMeta, LifecycleState, TrashEntry};
pub use store::memory::MemoryCollection;
pub use trash::{SweepReport, TrashAggregator, TrashCount, TrashListing};
