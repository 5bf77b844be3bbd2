//! The retention planner interface.
//!
//! The planner is the external collaborator that applies the retention
//! policy: it knows which commit must be retained, which partitions might
//! hold deletable files, and which file versions inside a partition are
//! safe to delete (savepointed files are its responsibility to exclude).
//! The orchestrator treats it as an opaque capability, which keeps
//! orchestration testable with fakes and keeps policy heuristics out of
//! this crate.

use async_trait::async_trait;

use strata_timeline::InstantRef;

/// Outcome of evaluating one partition for cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionCleanDecision {
    /// True if the whole partition can be removed (e.g. it was dropped and
    /// nothing inside it must be retained).
    pub fully_deletable: bool,
    /// File versions safe to delete within the partition.
    pub candidates: Vec<strata_timeline::CleanFileInfo>,
}

impl PartitionCleanDecision {
    /// A decision with nothing to delete.
    #[must_use]
    pub fn nothing() -> Self {
        Self::default()
    }
}

/// Retention-policy collaborator consumed by the orchestrator.
///
/// Implementations are queried once per planning attempt for the retention
/// boundary, the partition list, and the bookkeeping timestamps, and once
/// per partition for deletion candidates. All calls may perform I/O;
/// failures abort the planning attempt.
#[async_trait]
pub trait RetentionPlanner: Send + Sync {
    /// The oldest commit whose files must survive cleaning, if the policy
    /// bounds retention at all.
    async fn earliest_commit_to_retain(&self) -> strata_core::Result<Option<InstantRef>>;

    /// Ordered list of partitions that might contain deletable files given
    /// the retention boundary. Order must be stable within one planning
    /// attempt so consecutive batches never overlap.
    async fn partition_paths_to_clean(
        &self,
        earliest_retain: Option<&InstantRef>,
    ) -> strata_core::Result<Vec<String>>;

    /// Deletion candidates for one partition.
    async fn delete_paths(
        &self,
        partition_path: &str,
        earliest_retain: Option<&InstantRef>,
    ) -> strata_core::Result<PartitionCleanDecision>;

    /// Timestamp of the last fully-completed write at planning time.
    async fn last_completed_commit_timestamp(&self) -> strata_core::Result<String>;

    /// Savepoint timestamps currently in force, in audit order.
    async fn savepointed_timestamps(&self) -> strata_core::Result<Vec<String>>;

    /// True if the planner fronts a pre-loadable file index that benefits
    /// from bulk-loading a batch's partitions before per-partition lookup.
    fn supports_partition_preload(&self) -> bool {
        false
    }

    /// Bulk-loads the given partitions into the planner's file index.
    ///
    /// An optimization hint, not a correctness requirement; the default
    /// does nothing.
    async fn preload_partitions(&self, _partitions: &[String]) -> strata_core::Result<()> {
        Ok(())
    }
}
