//! The clean-plan orchestrator.
//!
//! One `execute()` call runs at most one clean cycle: evaluate the
//! trigger, recover any half-written request a crashed process left
//! behind, and - only if recovery found nothing reusable - compute a new
//! plan in memory-bounded partition batches.
//!
//! Crash recovery must be idempotent under repeated crashes. The loop in
//! [`CleanPlanOrchestrator::request_clean`] deletes empty (crashed)
//! instant files and either reuses the previously serialized plan or
//! clears the dangling markers and retries, reloading the timeline each
//! iteration so concurrent repairs by another process are observed. In
//! production the loop is bounded by the number of genuinely empty
//! trailing instants, which is small by construction.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant as StdInstant;

use futures::stream::{self, StreamExt, TryStreamExt};

use strata_core::TableStorage;
use strata_timeline::{
    ActionKind, ActiveTimeline, CleanFileInfo, CleanerPlan, Instant, PlanStore,
    LATEST_CLEAN_PLAN_VERSION, SAVEPOINTED_TIMESTAMPS_KEY,
};

use crate::config::CleanConfig;
use crate::error::{CleanError, Result};
use crate::planner::RetentionPlanner;
use crate::{metrics, trigger};

/// Orchestrates clean planning for one table.
///
/// The orchestrator runs single-threaded per clean attempt; parallelism is
/// confined to per-partition planner calls within one batch. It never
/// deletes data files and never persists a plan itself - the caller writes
/// the returned plan through [`PlanStore::write_plan`].
#[derive(Clone)]
pub struct CleanPlanOrchestrator {
    storage: TableStorage,
    config: CleanConfig,
    planner: Arc<dyn RetentionPlanner>,
    extra_metadata: Option<BTreeMap<String, String>>,
}

impl std::fmt::Debug for CleanPlanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanPlanOrchestrator")
            .field("table_id", &self.storage.table_id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CleanPlanOrchestrator {
    /// Creates an orchestrator for the table behind `storage`.
    #[must_use]
    pub fn new(
        storage: TableStorage,
        config: CleanConfig,
        planner: Arc<dyn RetentionPlanner>,
    ) -> Self {
        Self {
            storage,
            config,
            planner,
            extra_metadata: None,
        }
    }

    /// Attaches caller-supplied metadata to be recorded into the plan.
    #[must_use]
    pub fn with_extra_metadata(mut self, extra_metadata: BTreeMap<String, String>) -> Self {
        self.extra_metadata = Some(extra_metadata);
        self
    }

    /// Runs one clean cycle end to end.
    ///
    /// Returns `None` when cleaning is not due or there is nothing to
    /// delete; otherwise the complete plan for the caller to persist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unusable settings, or an I/O-kind
    /// error if trigger evaluation, recovery, or planning fails. No
    /// partial state is committed on failure.
    pub async fn execute(&self) -> Result<Option<CleanerPlan>> {
        self.config.validate()?;

        let mut timeline = ActiveTimeline::load(self.storage.clone()).await?;
        let plan_store = PlanStore::new(self.storage.clone());

        if !trigger::needs_cleaning(&timeline, &plan_store, &self.config).await? {
            return Ok(None);
        }
        self.request_clean_with(&mut timeline, &plan_store).await
    }

    /// Recovers a prior incomplete clean request or computes a fresh plan.
    ///
    /// Exposed separately from [`Self::execute`] for callers that schedule
    /// cleaning themselves and only need the recovery-then-plan sequence.
    ///
    /// # Errors
    ///
    /// Returns an I/O-kind error if recovery or planning fails; corrupt
    /// (non-empty, undecodable) plan payloads are surfaced, never repaired
    /// away.
    pub async fn request_clean(&self) -> Result<Option<CleanerPlan>> {
        let mut timeline = ActiveTimeline::load(self.storage.clone()).await?;
        let plan_store = PlanStore::new(self.storage.clone());
        self.request_clean_with(&mut timeline, &plan_store).await
    }

    async fn request_clean_with(
        &self,
        timeline: &mut ActiveTimeline,
        plan_store: &PlanStore,
    ) -> Result<Option<CleanerPlan>> {
        // Recovery loop: converge to a timeline whose last clean either
        // finished cleanly (compute a fresh plan) or left a reusable
        // serialized plan (return it) before planning anything new.
        loop {
            let Some(last_clean) = timeline
                .timeline()
                .filter_action(ActionKind::Clean)
                .last()
                .cloned()
            else {
                break;
            };
            let is_empty = timeline.is_instant_empty(&last_clean).await?;
            if last_clean.is_completed() && !is_empty {
                // The previous clean completed and wrote its metadata.
                break;
            }

            if is_empty {
                // A created-but-never-written marker: the writer crashed
                // between requesting and planning (or between planning and
                // completion, for an empty completed marker).
                timeline.delete_empty_instant(&last_clean).await?;
                metrics::record_request_repaired();
            }

            match plan_store.read_plan(&last_clean.timestamp).await {
                Ok(plan) => {
                    tracing::info!(
                        table = %self.storage.table_id(),
                        instant = %last_clean.timestamp,
                        "reusing previously serialized cleaner plan"
                    );
                    return Ok(Some(plan));
                }
                Err(err) if err.is_crash_artifact() => {
                    // Crash strictly between plan-write-start and
                    // completion: clear the dangling markers and look for
                    // an even earlier empty instant.
                    tracing::warn!(
                        table = %self.storage.table_id(),
                        instant = %last_clean.timestamp,
                        "clearing dangling clean request markers"
                    );
                    timeline
                        .delete_empty_instant(&Instant::inflight(
                            last_clean.timestamp.clone(),
                            ActionKind::Clean,
                        ))
                        .await?;
                    timeline
                        .delete_empty_instant(&Instant::requested(
                            last_clean.timestamp.clone(),
                            ActionKind::Clean,
                        ))
                        .await?;
                }
                Err(err) => return Err(err.into()),
            }

            // Another process may have repaired concurrently.
            timeline.reload().await?;
        }

        let plan = self.compute_new_plan().await?;
        if plan.has_work() {
            Ok(Some(plan))
        } else {
            tracing::info!(table = %self.storage.table_id(), "nothing to clean");
            Ok(None)
        }
    }

    /// Computes a brand-new plan from the retention planner.
    ///
    /// Always returns a plan; one without work is filtered out by the
    /// caller.
    async fn compute_new_plan(&self) -> Result<CleanerPlan> {
        let started = StdInstant::now();

        let earliest = self
            .planner
            .earliest_commit_to_retain()
            .await
            .map_err(|e| CleanError::planner("earliest commit to retain", e))?;
        // Captured once per attempt; commits completing during planning are
        // picked up by the next cycle.
        let last_completed_commit = self
            .planner
            .last_completed_commit_timestamp()
            .await
            .map_err(|e| CleanError::planner("last completed commit timestamp", e))?;
        let partitions = self
            .planner
            .partition_paths_to_clean(earliest.as_ref())
            .await
            .map_err(|e| CleanError::planner("partition paths to clean", e))?;

        let savepoints = self
            .planner
            .savepointed_timestamps()
            .await
            .map_err(|e| CleanError::planner("savepointed timestamps", e))?;

        if partitions.is_empty() {
            tracing::info!(table = %self.storage.table_id(), "no partitions to clean");
            return Ok(self.assemble_plan(
                earliest,
                last_completed_commit,
                BTreeMap::new(),
                Vec::new(),
                &savepoints,
            ));
        }

        let batch_size = partitions.len().min(self.config.effective_parallelism());
        tracing::info!(
            table = %self.storage.table_id(),
            earliest_retain = earliest.as_ref().map_or("none", |i| i.timestamp.as_str()),
            partitions = partitions.len(),
            batch_size,
            policy = %self.config.policy,
            "computing cleaner plan"
        );

        let mut clean_ops: BTreeMap<String, Vec<CleanFileInfo>> = BTreeMap::new();
        let mut partitions_to_delete: Vec<String> = Vec::new();

        // Consecutive batches of `batch_size` partitions bound the number
        // of file-listing round trips held in memory in any single pass.
        for batch in partitions.chunks(batch_size) {
            if self.planner.supports_partition_preload() {
                tracing::debug!(partitions = ?batch, "preloading batch into file index");
                self.planner
                    .preload_partitions(batch)
                    .await
                    .map_err(|e| CleanError::planner("preloading partitions", e))?;
            }

            let decisions: Vec<(String, crate::planner::PartitionCleanDecision)> =
                stream::iter(batch.iter().cloned().map(|partition| {
                    let planner = Arc::clone(&self.planner);
                    let earliest = earliest.clone();
                    async move {
                        let decision = planner
                            .delete_paths(&partition, earliest.as_ref())
                            .await
                            .map_err(|e| {
                                CleanError::planner(format!("partition {partition}"), e)
                            })?;
                        Ok::<_, CleanError>((partition, decision))
                    }
                }))
                .buffered(batch_size)
                .try_collect()
                .await?;

            for (partition, decision) in decisions {
                if decision.fully_deletable {
                    partitions_to_delete.push(partition.clone());
                }
                if !decision.candidates.is_empty() {
                    clean_ops.insert(partition, decision.candidates);
                }
            }
        }

        let plan = self.assemble_plan(
            earliest,
            last_completed_commit,
            clean_ops,
            partitions_to_delete,
            &savepoints,
        );

        let duration_secs = started.elapsed().as_secs_f64();
        let files_planned = plan.total_files_to_delete();
        tracing::info!(
            table = %self.storage.table_id(),
            partitions_scanned = partitions.len(),
            files_planned,
            partitions_to_delete = plan.partitions_to_be_deleted.len(),
            duration_secs,
            metric = "strata_clean_plan_computed",
            "cleaner plan computed"
        );
        metrics::record_plan_generated(
            partitions.len() as u64,
            files_planned as u64,
            duration_secs,
        );

        Ok(plan)
    }

    fn assemble_plan(
        &self,
        earliest: Option<strata_timeline::InstantRef>,
        last_completed_commit: String,
        clean_ops: BTreeMap<String, Vec<CleanFileInfo>>,
        partitions_to_delete: Vec<String>,
        savepoints: &[String],
    ) -> CleanerPlan {
        CleanerPlan {
            earliest_instant_to_retain: earliest,
            last_completed_commit_timestamp: last_completed_commit,
            policy: self.config.policy.as_str().to_string(),
            version: LATEST_CLEAN_PLAN_VERSION,
            file_paths_to_be_deleted_per_partition: clean_ops,
            partitions_to_be_deleted: partitions_to_delete,
            extra_metadata: merge_extra_metadata(self.extra_metadata.clone(), savepoints),
        }
    }
}

/// Merges caller-supplied metadata with the active savepoint timestamps.
///
/// With no savepoints the user metadata passes through unchanged (empty if
/// none was supplied). Otherwise the comma-joined savepoint list is
/// recorded under [`SAVEPOINTED_TIMESTAMPS_KEY`], overwriting any existing
/// entry. Recording is for audit only - excluding savepointed files from
/// candidates is the retention planner's job.
fn merge_extra_metadata(
    user: Option<BTreeMap<String, String>>,
    savepoints: &[String],
) -> BTreeMap<String, String> {
    if savepoints.is_empty() {
        return user.unwrap_or_default();
    }
    let mut metadata = user.unwrap_or_default();
    metadata.insert(SAVEPOINTED_TIMESTAMPS_KEY.to_string(), savepoints.join(","));
    metadata
}
