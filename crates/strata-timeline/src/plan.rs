//! Persisted clean records: the cleaner plan and clean metadata.
//!
//! A [`CleanerPlan`] is the durable artifact the planning core produces. It
//! is written exactly once as the payload of the requested clean instant,
//! then consumed read-only by the deletion executor. A [`CleanMetadata`]
//! record is the payload of the corresponding *completed* clean instant and
//! anchors the next clean's trigger evaluation.
//!
//! Both records are JSON with camelCase fields. Maps are `BTreeMap` so the
//! serialized form is deterministic for a given plan content.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::instant::InstantRef;

/// Current cleaner-plan schema version.
pub const LATEST_CLEAN_PLAN_VERSION: u32 = 2;

/// Reserved extra-metadata key carrying the comma-joined list of savepoint
/// timestamps active at plan time.
pub const SAVEPOINTED_TIMESTAMPS_KEY: &str = "savepointed_timestamps";

/// One file slated for deletion within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanFileInfo {
    /// Path of the file version to delete.
    pub file_path: String,
    /// True if the file is a bootstrap base file (lives outside the table's
    /// own data layout and needs distinct handling by the executor).
    pub is_bootstrap_base_file: bool,
}

impl CleanFileInfo {
    /// Creates a descriptor for a regular data file.
    #[must_use]
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            is_bootstrap_base_file: false,
        }
    }

    /// Creates a descriptor for a bootstrap base file.
    #[must_use]
    pub fn bootstrap(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            is_bootstrap_base_file: true,
        }
    }
}

/// The versioned, durable description of exactly what a clean will delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerPlan {
    /// The oldest commit whose files must survive this clean, if bounded.
    pub earliest_instant_to_retain: Option<InstantRef>,
    /// Timestamp of the last fully-completed write before planning began.
    ///
    /// This is the anchor for the *next* clean's trigger evaluation, not a
    /// deletion boundary for this plan. It is captured once from the
    /// retention planner with no synchronization against writers completing
    /// commits during planning; commits that complete mid-planning are
    /// picked up by the following cycle (accepted eventual-consistency
    /// window).
    pub last_completed_commit_timestamp: String,
    /// Name of the retention policy in force when the plan was computed.
    pub policy: String,
    /// Plan schema version, for forward compatibility.
    pub version: u32,
    /// Per-partition deletion candidates. Every entry is non-empty.
    pub file_paths_to_be_deleted_per_partition: BTreeMap<String, Vec<CleanFileInfo>>,
    /// Partitions to remove entirely (as opposed to individual files within
    /// a retained partition).
    pub partitions_to_be_deleted: Vec<String>,
    /// Free-form metadata; savepoint timestamps are recorded under
    /// [`SAVEPOINTED_TIMESTAMPS_KEY`].
    pub extra_metadata: BTreeMap<String, String>,
}

impl CleanerPlan {
    /// Returns true if executing this plan would delete at least one file
    /// or one whole partition.
    ///
    /// Plans without work are never persisted as actionable requests.
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.file_paths_to_be_deleted_per_partition
            .values()
            .any(|files| !files.is_empty())
            || !self.partitions_to_be_deleted.is_empty()
    }

    /// Total number of files slated for deletion across all partitions.
    #[must_use]
    pub fn total_files_to_delete(&self) -> usize {
        self.file_paths_to_be_deleted_per_partition
            .values()
            .map(Vec::len)
            .sum()
    }
}

/// Payload of a completed clean instant.
///
/// Read by the trigger evaluator to count commits since the last clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanMetadata {
    /// Timestamp at which the clean action started.
    pub start_clean_time: String,
    /// The plan's `last_completed_commit_timestamp`, carried through so the
    /// next trigger evaluation can count commits strictly after it.
    pub last_completed_commit_timestamp: String,
    /// The plan's earliest-retain boundary, if any.
    pub earliest_commit_to_retain: Option<String>,
    /// Number of files the executor actually deleted.
    pub total_files_deleted: u64,
    /// Metadata schema version.
    pub version: u32,
}
