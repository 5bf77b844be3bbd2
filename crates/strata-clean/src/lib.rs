//! # strata-clean
//!
//! Clean-plan orchestration core for the Strata transactional table
//! format.
//!
//! Cleaning bounds a table's storage growth by deleting historical file
//! versions no longer needed by readers, in-flight writers, or savepoints.
//! This crate decides *whether* a clean should run, recovers plans left by
//! crashed processes, and produces the immutable, versioned plan artifact
//! that the deletion executor consumes - it never deletes data itself.
//!
//! The flow is one-way with a recovery loop at the front:
//!
//! ```text
//! timeline -> trigger evaluator -> orchestrator -> retention planner (per
//! partition batch) -> merged plan -> plan store
//! ```
//!
//! ## Components
//!
//! - [`trigger`]: decides from the timeline whether a clean cycle is due
//! - [`CleanPlanOrchestrator`]: crash recovery, memory-bounded partition
//!   batching, and plan assembly
//! - [`RetentionPlanner`]: the injected retention-policy collaborator that
//!   selects deletable file versions per partition
//! - [`CleanConfig`]: trigger strategy, threshold, policy, and parallelism
//!
//! ## Safety posture
//!
//! A plan is either absent or complete and self-consistent: every failure
//! mid-planning aborts the attempt without persisting partial state, and
//! the recovery loop converges under repeated crash/retry cycles.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_clean::{CleanConfig, CleanPlanOrchestrator};
//!
//! let orchestrator =
//!     CleanPlanOrchestrator::new(storage, CleanConfig::default(), planner);
//! if let Some(plan) = orchestrator.execute().await? {
//!     plan_store.write_plan(&clean_timestamp, &plan).await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod planner;
pub mod trigger;

pub use config::{CleanConfig, CleaningPolicy, CleaningTriggerStrategy};
pub use error::{CleanError, Result};
pub use orchestrator::CleanPlanOrchestrator;
pub use planner::{PartitionCleanDecision, RetentionPlanner};
