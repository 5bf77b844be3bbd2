//! # strata-core
//!
//! Core abstractions for the Strata transactional table format.
//!
//! This crate provides the foundational types used across all Strata
//! components:
//!
//! - **Error Types**: Shared error definitions and result types
//! - **Storage Traits**: Abstract object-storage interface with conditional
//!   writes, plus an in-memory backend for tests
//! - **Table Scoping**: Per-table storage isolation
//! - **Timeline Paths**: The canonical object-key layout for timeline
//!   instant files
//!
//! ## Crate Boundary
//!
//! `strata-core` is the only crate allowed to define shared primitives.
//! Higher layers (timeline model, table maintenance) depend on it and never
//! on each other's internals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod storage;
pub mod table_storage;
pub mod timeline_paths;

pub use error::{Error, Result};
pub use storage::{MemoryBackend, ObjectMeta, StorageBackend, WritePrecondition, WriteResult};
pub use table_storage::TableStorage;
pub use timeline_paths::TimelinePaths;
