//! # strata-timeline
//!
//! Timeline model for the Strata transactional table format.
//!
//! A table's history is an append-only sequence of **instants** - one
//! recorded action (commit, clean, savepoint, ...) with a timestamp and a
//! lifecycle state. This crate provides:
//!
//! - **Instant model**: action kinds, lifecycle states, and the file-name
//!   codec used to persist instants as objects
//! - **Timeline views**: pure, composable filters over the ordered instant
//!   sequence (by action, by state, strictly-after cutoffs)
//! - **Active timeline**: the storage-backed timeline with load/reload and
//!   the two repair mutations the maintenance layer is allowed to perform
//! - **Plan store**: durable, exactly-once persistence of cleaner plans and
//!   clean metadata, with crash artifacts (empty payloads) reported
//!   distinctly from corruption
//!
//! The timeline is read-only to everything above it except for the narrow
//! repair operations on [`ActiveTimeline`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod instant;
pub mod plan;
pub mod plan_store;
pub mod timeline;

pub use error::{Result, TimelineError};
pub use instant::{ActionKind, Instant, InstantRef, InstantState};
pub use plan::{
    CleanFileInfo, CleanMetadata, CleanerPlan, LATEST_CLEAN_PLAN_VERSION,
    SAVEPOINTED_TIMESTAMPS_KEY,
};
pub use plan_store::PlanStore;
pub use timeline::{ActiveTimeline, Timeline};
