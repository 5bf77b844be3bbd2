//! Crash-recovery tests for the clean-plan orchestrator.
//!
//! These simulate processes that died at every interesting point of a
//! clean request (marker created but never written, plan half-written,
//! plan fully written but never executed) and verify that recovery
//! converges, reuses completed planning work, and never repairs away
//! corruption.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{init_test_logging, memory_table, seed_timeline, FailingBackend, FakePlanner};
use strata_clean::{CleanConfig, CleanError, CleanPlanOrchestrator};
use strata_core::TableStorage;
use strata_timeline::{
    ActionKind, ActiveTimeline, CleanFileInfo, CleanerPlan, Instant, TimelineError,
    LATEST_CLEAN_PLAN_VERSION,
};

fn persisted_plan() -> CleanerPlan {
    let mut files = BTreeMap::new();
    files.insert(
        "dt=2024-01-01".to_string(),
        vec![CleanFileInfo::new("dt=2024-01-01/f1.parquet")],
    );
    CleanerPlan {
        earliest_instant_to_retain: Some(
            Instant::completed("20240105000000", ActionKind::Commit).to_ref(),
        ),
        last_completed_commit_timestamp: "20240106000000".to_string(),
        policy: "keepLatestCommits".to_string(),
        version: LATEST_CLEAN_PLAN_VERSION,
        file_paths_to_be_deleted_per_partition: files,
        partitions_to_be_deleted: vec![],
        extra_metadata: BTreeMap::new(),
    }
}

fn orchestrator(storage: TableStorage, planner: Arc<FakePlanner>) -> CleanPlanOrchestrator {
    CleanPlanOrchestrator::new(storage, CleanConfig::default(), planner)
}

#[tokio::test]
async fn fully_written_pending_plan_is_reused_without_replanning() {
    init_test_logging();
    let storage = memory_table();
    let plan = persisted_plan();
    let plan_json = serde_json::to_string(&plan).expect("encode plan");

    // A requested clean whose plan payload is fully written: the writer
    // died after planning but before execution started.
    seed_timeline(&storage, &[("timeline/007.clean.requested", plan_json.as_str())]).await;

    let planner = Arc::new(FakePlanner::new().with_partition("dt=2024-01-02", &["x.parquet"], false));
    let orchestrator = orchestrator(storage, Arc::clone(&planner));

    let first = orchestrator.request_clean().await.expect("first call");
    let second = orchestrator.request_clean().await.expect("second call");

    assert_eq!(first.as_ref(), Some(&plan));
    assert_eq!(second.as_ref(), Some(&plan));
    // Recovery reused prior planning work; the retention planner was never
    // consulted.
    assert_eq!(planner.partition_list_calls(), 0);
    assert_eq!(planner.delete_paths_calls(), 0);
}

#[tokio::test]
async fn empty_completed_marker_is_repaired_and_plan_reused() {
    init_test_logging();
    let storage = memory_table();
    let plan = persisted_plan();
    let plan_json = serde_json::to_string(&plan).expect("encode plan");

    // The executor crashed after creating the completed marker but before
    // writing the clean metadata into it.
    seed_timeline(
        &storage,
        &[
            ("timeline/007.clean.requested", plan_json.as_str()),
            ("timeline/007.clean.inflight", ""),
            ("timeline/007.clean", ""),
        ],
    )
    .await;

    let planner = Arc::new(FakePlanner::new());
    let orchestrator = orchestrator(storage.clone(), Arc::clone(&planner));

    let recovered = orchestrator.request_clean().await.expect("recover");
    assert_eq!(recovered.as_ref(), Some(&plan));
    assert_eq!(planner.delete_paths_calls(), 0);

    // The dangling completed marker was deleted; the requested plan stays
    // for the executor to pick up.
    let timeline = ActiveTimeline::load(storage).await.expect("load");
    let cleans = timeline.timeline().filter_action(ActionKind::Clean);
    assert!(cleans.completed().is_empty());
    assert!(!cleans.is_empty());
}

#[tokio::test]
async fn crash_before_planning_deletes_marker_and_replans() {
    init_test_logging();
    let storage = memory_table();

    // The writer crashed between requesting and planning: the marker
    // exists with zero bytes and no plan was ever serialized.
    seed_timeline(&storage, &[("timeline/007.clean.requested", "")]).await;

    let planner = Arc::new(
        FakePlanner::new().with_partition("dt=2024-01-02", &["dt=2024-01-02/a.parquet"], false),
    );
    let orchestrator = orchestrator(storage.clone(), Arc::clone(&planner));

    let plan = orchestrator
        .request_clean()
        .await
        .expect("recover")
        .expect("fresh plan");

    // A fresh plan, not a stale artifact; exactly one planning pass ran.
    assert_eq!(
        plan.file_paths_to_be_deleted_per_partition["dt=2024-01-02"],
        vec![CleanFileInfo::new("dt=2024-01-02/a.parquet")]
    );
    assert_eq!(planner.partition_list_calls(), 1);

    // The crashed marker is gone.
    let timeline = ActiveTimeline::load(storage).await.expect("load");
    assert!(timeline.timeline().filter_action(ActionKind::Clean).is_empty());
}

#[tokio::test]
async fn recovery_walks_back_over_multiple_crashed_requests() {
    init_test_logging();
    let storage = memory_table();
    seed_timeline(
        &storage,
        &[
            ("timeline/005.clean.requested", ""),
            ("timeline/007.clean.requested", ""),
            ("timeline/007.clean.inflight", ""),
        ],
    )
    .await;

    let planner = Arc::new(FakePlanner::new().with_partition("dt=2024-01-02", &["a"], false));
    let orchestrator = orchestrator(storage.clone(), Arc::clone(&planner));

    let plan = orchestrator.request_clean().await.expect("recover");
    assert!(plan.is_some());
    assert_eq!(planner.partition_list_calls(), 1);

    let timeline = ActiveTimeline::load(storage).await.expect("load");
    assert!(timeline.timeline().filter_action(ActionKind::Clean).is_empty());
}

#[tokio::test]
async fn corrupt_plan_payload_is_fatal_not_repaired() {
    init_test_logging();
    let storage = memory_table();
    seed_timeline(
        &storage,
        &[
            ("timeline/007.clean", ""),
            ("timeline/007.clean.requested", "{definitely not json"),
        ],
    )
    .await;

    let planner = Arc::new(FakePlanner::new());
    let orchestrator = orchestrator(storage.clone(), planner);

    let err = orchestrator.request_clean().await.expect_err("must fail");
    assert!(matches!(
        err,
        CleanError::Timeline(TimelineError::CorruptPlan { .. })
    ));

    // The corrupt payload was not deleted: no guessing at recovery.
    let timeline = ActiveTimeline::load(storage).await.expect("load");
    assert!(!timeline.timeline().filter_action(ActionKind::Clean).is_empty());
}

#[tokio::test]
async fn plan_read_failure_aborts_recovery() {
    init_test_logging();
    let backend = Arc::new(FailingBackend::new());
    let storage = TableStorage::new(backend.clone(), "orders").expect("valid table id");
    let plan_json = serde_json::to_string(&persisted_plan()).expect("encode");
    seed_timeline(
        &storage,
        &[
            ("timeline/007.clean", ""),
            ("timeline/007.clean.requested", plan_json.as_str()),
        ],
    )
    .await;
    backend.fail_on_read(".clean.requested");

    let orchestrator = orchestrator(storage, Arc::new(FakePlanner::new()));
    let err = orchestrator.request_clean().await.expect_err("must fail");
    assert!(matches!(
        err,
        CleanError::Timeline(TimelineError::Storage(_))
    ));
}

#[tokio::test]
async fn execute_skips_everything_when_trigger_not_due() {
    init_test_logging();
    let storage = memory_table();
    // Three completed commits against the default threshold of four.
    seed_timeline(
        &storage,
        &[
            ("timeline/001.commit", "{}"),
            ("timeline/002.commit", "{}"),
            ("timeline/003.commit", "{}"),
        ],
    )
    .await;

    let planner = Arc::new(FakePlanner::new().with_partition("dt=2024-01-02", &["a"], false));
    let orchestrator = orchestrator(storage, Arc::clone(&planner));

    let result = orchestrator.execute().await.expect("execute");
    assert!(result.is_none());
    assert_eq!(planner.partition_list_calls(), 0);
}

#[tokio::test]
async fn execute_plans_once_trigger_is_due() {
    init_test_logging();
    let storage = memory_table();
    seed_timeline(
        &storage,
        &[
            ("timeline/001.commit", "{}"),
            ("timeline/002.commit", "{}"),
            ("timeline/003.commit", "{}"),
            ("timeline/004.deltacommit", "{}"),
        ],
    )
    .await;

    let planner = Arc::new(FakePlanner::new().with_partition("dt=2024-01-02", &["a"], false));
    let orchestrator = orchestrator(storage, Arc::clone(&planner));

    let plan = orchestrator.execute().await.expect("execute");
    assert!(plan.is_some());
    assert_eq!(planner.partition_list_calls(), 1);
}
