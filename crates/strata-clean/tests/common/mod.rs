//! Shared fixtures for clean-planner integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use strata_clean::{PartitionCleanDecision, RetentionPlanner};
use strata_core::{
    Error as CoreError, MemoryBackend, ObjectMeta, Result as CoreResult, StorageBackend,
    TableStorage, WritePrecondition, WriteResult,
};
use strata_timeline::{CleanFileInfo, InstantRef};

/// Initialize test logging (call once per test).
pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("strata=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates table storage over a fresh in-memory backend.
pub fn memory_table() -> TableStorage {
    TableStorage::new(Arc::new(MemoryBackend::new()), "orders").expect("valid table id")
}

/// Seeds timeline instant files (path, content) into table storage.
pub async fn seed_timeline(storage: &TableStorage, files: &[(&str, &str)]) {
    for (path, content) in files {
        storage
            .put_raw(
                path,
                Bytes::from((*content).to_string()),
                WritePrecondition::None,
            )
            .await
            .expect("seed timeline file");
    }
}

/// A scripted retention planner that records how often it is consulted.
pub struct FakePlanner {
    earliest: Option<InstantRef>,
    partitions: Vec<String>,
    decisions: HashMap<String, PartitionCleanDecision>,
    last_completed: String,
    savepoints: Vec<String>,
    supports_preload: bool,
    fail_partition: Option<String>,
    delete_paths_calls: AtomicUsize,
    partition_list_calls: AtomicUsize,
    preload_calls: AtomicUsize,
}

impl FakePlanner {
    pub fn new() -> Self {
        Self {
            earliest: None,
            partitions: Vec::new(),
            decisions: HashMap::new(),
            last_completed: "20240110000000".to_string(),
            savepoints: Vec::new(),
            supports_preload: false,
            fail_partition: None,
            delete_paths_calls: AtomicUsize::new(0),
            partition_list_calls: AtomicUsize::new(0),
            preload_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_earliest(mut self, earliest: InstantRef) -> Self {
        self.earliest = Some(earliest);
        self
    }

    /// Scripts one partition with per-file deletion candidates.
    pub fn with_partition(mut self, partition: &str, files: &[&str], fully_deletable: bool) -> Self {
        self.partitions.push(partition.to_string());
        self.decisions.insert(
            partition.to_string(),
            PartitionCleanDecision {
                fully_deletable,
                candidates: files.iter().map(|f| CleanFileInfo::new(*f)).collect(),
            },
        );
        self
    }

    pub fn with_savepoints(mut self, savepoints: &[&str]) -> Self {
        self.savepoints = savepoints.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn with_last_completed(mut self, timestamp: &str) -> Self {
        self.last_completed = timestamp.to_string();
        self
    }

    pub fn with_preload_support(mut self) -> Self {
        self.supports_preload = true;
        self
    }

    /// Scripts a failure for one partition's `delete_paths` call.
    pub fn failing_on(mut self, partition: &str) -> Self {
        self.fail_partition = Some(partition.to_string());
        self
    }

    pub fn delete_paths_calls(&self) -> usize {
        self.delete_paths_calls.load(Ordering::SeqCst)
    }

    pub fn partition_list_calls(&self) -> usize {
        self.partition_list_calls.load(Ordering::SeqCst)
    }

    pub fn preload_calls(&self) -> usize {
        self.preload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetentionPlanner for FakePlanner {
    async fn earliest_commit_to_retain(&self) -> CoreResult<Option<InstantRef>> {
        Ok(self.earliest.clone())
    }

    async fn partition_paths_to_clean(
        &self,
        _earliest_retain: Option<&InstantRef>,
    ) -> CoreResult<Vec<String>> {
        self.partition_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.partitions.clone())
    }

    async fn delete_paths(
        &self,
        partition_path: &str,
        _earliest_retain: Option<&InstantRef>,
    ) -> CoreResult<PartitionCleanDecision> {
        self.delete_paths_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_partition.as_deref() == Some(partition_path) {
            return Err(CoreError::storage(format!(
                "file listing failed for {partition_path}"
            )));
        }
        Ok(self
            .decisions
            .get(partition_path)
            .cloned()
            .unwrap_or_default())
    }

    async fn last_completed_commit_timestamp(&self) -> CoreResult<String> {
        Ok(self.last_completed.clone())
    }

    async fn savepointed_timestamps(&self) -> CoreResult<Vec<String>> {
        Ok(self.savepoints.clone())
    }

    fn supports_partition_preload(&self) -> bool {
        self.supports_preload
    }

    async fn preload_partitions(&self, _partitions: &[String]) -> CoreResult<()> {
        self.preload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend wrapper that injects read failures at configurable paths.
///
/// Used for testing that unreadable (non-empty, undecodable or failing)
/// plan payloads abort recovery instead of being repaired away.
#[derive(Debug)]
pub struct FailingBackend {
    inner: MemoryBackend,
    fail_on_read: Arc<RwLock<Vec<String>>>,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            fail_on_read: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the backend to fail reads from the specified path suffix.
    pub fn fail_on_read(&self, suffix: &str) {
        self.fail_on_read
            .write()
            .expect("lock")
            .push(suffix.to_string());
    }

    fn should_fail_read(&self, path: &str) -> bool {
        self.fail_on_read
            .read()
            .expect("lock")
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn get(&self, path: &str) -> CoreResult<Bytes> {
        if self.should_fail_read(path) {
            return Err(CoreError::storage(format!("injected read failure: {path}")));
        }
        self.inner.get(path).await
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        precondition: WritePrecondition,
    ) -> CoreResult<WriteResult> {
        self.inner.put(path, data, precondition).await
    }

    async fn delete(&self, path: &str) -> CoreResult<()> {
        self.inner.delete(path).await
    }

    async fn list(&self, prefix: &str) -> CoreResult<Vec<ObjectMeta>> {
        self.inner.list(prefix).await
    }

    async fn head(&self, path: &str) -> CoreResult<Option<ObjectMeta>> {
        self.inner.head(path).await
    }
}
