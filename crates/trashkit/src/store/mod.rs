//! # Storage
//!
//! The engine does not own storage: every content module persists its own
//! records and exposes them through [`crate::collection::RecordCollection`].
//! This module ships the one implementation the crate itself needs.
//!
//! - [`memory::MemoryCollection`]: thread-safe in-memory collection. Used by the
//!   test suite and by embedders whose records already live in memory.

pub mod memory;
