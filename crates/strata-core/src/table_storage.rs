//! Table-scoped storage with the canonical Strata path layout.
//!
//! All table metadata lives under `tables/{table_id}/`. Scoping every
//! storage call through this wrapper keeps one table's timeline from ever
//! reading or repairing another table's instants.
//!
//! # Security
//!
//! - All paths are prefixed with the table scope
//! - Path traversal attempts (`..`) are rejected
//! - Table IDs are validated at construction

use bytes::Bytes;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::{ObjectMeta, StorageBackend, WritePrecondition, WriteResult};

/// Per-table scoped storage wrapper.
///
/// Enforces isolation by prefixing all paths with `tables/{table_id}/`.
#[derive(Clone)]
pub struct TableStorage {
    backend: Arc<dyn StorageBackend>,
    table_id: String,
}

impl std::fmt::Debug for TableStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStorage")
            .field("table_id", &self.table_id)
            .finish_non_exhaustive()
    }
}

impl TableStorage {
    /// Creates a new table-scoped storage wrapper.
    ///
    /// # Errors
    ///
    /// Returns an error if `table_id` is invalid. IDs must be non-empty,
    /// ASCII lowercase alphanumeric (plus `-` and `_`), and must not
    /// contain path separators or other control characters.
    pub fn new(backend: Arc<dyn StorageBackend>, table_id: impl Into<String>) -> Result<Self> {
        let table_id = table_id.into();
        Self::validate_id(&table_id)?;

        Ok(Self { backend, table_id })
    }

    /// Validates an ID for use in paths.
    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidId {
                message: "table_id cannot be empty".to_string(),
            });
        }

        if id.contains('/') || id.contains('\\') {
            return Err(Error::InvalidId {
                message: "table_id cannot contain path separators".to_string(),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(Error::InvalidId {
                message: "table_id contains invalid characters (allowed: a-z, 0-9, '-', '_')"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Returns the table ID this storage is scoped to.
    #[must_use]
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Builds a scoped path, rejecting traversal attempts.
    fn scoped_path(&self, path: &str) -> Result<String> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::InvalidInput(format!(
                "path traversal rejected: {path}"
            )));
        }
        Ok(format!("tables/{}/{}", self.table_id, path))
    }

    /// Reads an object within the table scope.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the object doesn't exist, or a storage
    /// error from the backend.
    pub async fn get_raw(&self, path: &str) -> Result<Bytes> {
        let scoped = self.scoped_path(path)?;
        self.backend.get(&scoped).await
    }

    /// Writes an object within the table scope.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the backend. Precondition failures are
    /// reported via [`WriteResult`], not as errors.
    pub async fn put_raw(
        &self,
        path: &str,
        data: Bytes,
        precondition: WritePrecondition,
    ) -> Result<WriteResult> {
        let scoped = self.scoped_path(path)?;
        self.backend.put(&scoped, data, precondition).await
    }

    /// Deletes an object within the table scope (idempotent).
    ///
    /// # Errors
    ///
    /// Returns a storage error from the backend.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let scoped = self.scoped_path(path)?;
        self.backend.delete(&scoped).await
    }

    /// Lists objects under a prefix within the table scope.
    ///
    /// Returned paths are scope-relative (the `tables/{id}/` prefix is
    /// stripped).
    ///
    /// # Errors
    ///
    /// Returns a storage error from the backend.
    pub async fn list_meta(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let scoped = self.scoped_path(prefix)?;
        let scope_prefix = format!("tables/{}/", self.table_id);

        let entries = self.backend.list(&scoped).await?;
        Ok(entries
            .into_iter()
            .map(|mut meta| {
                if let Some(relative) = meta.path.strip_prefix(&scope_prefix) {
                    meta.path = relative.to_string();
                }
                meta
            })
            .collect())
    }

    /// Gets object metadata within the table scope without reading content.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the backend.
    pub async fn head_raw(&self, path: &str) -> Result<Option<ObjectMeta>> {
        let scoped = self.scoped_path(path)?;
        self.backend.head(&scoped).await
    }
}
