//! Canonical storage paths for the Strata timeline.
//!
//! This module is the **single source of truth** for timeline object keys.
//! All readers and writers must use these functions to construct paths. No
//! hardcoded path strings should exist outside this module.
//!
//! # Path Layout
//!
//! ```text
//! tables/{table_id}/
//! └── timeline/
//!     ├── {timestamp}.{action}              # completed instant
//!     ├── {timestamp}.{action}.inflight     # inflight instant
//!     └── {timestamp}.{action}.requested    # requested instant
//! ```
//!
//! The payload of a requested `clean` instant is the serialized cleaner
//! plan; the payload of a completed `clean` instant is the clean metadata
//! record. A zero-byte instant file marks a writer that crashed between
//! creating the file and writing its payload.

/// Path construction helpers for timeline instant files.
///
/// Paths are scope-relative: they are meant to be passed to
/// [`crate::TableStorage`], which applies the `tables/{table_id}/` prefix.
#[derive(Debug, Clone, Copy)]
pub struct TimelinePaths;

impl TimelinePaths {
    /// Directory prefix containing all instant files for a table.
    pub const TIMELINE_DIR: &'static str = "timeline/";

    /// Path of a completed instant file.
    #[must_use]
    pub fn completed(timestamp: &str, action: &str) -> String {
        format!("{}{timestamp}.{action}", Self::TIMELINE_DIR)
    }

    /// Path of an inflight instant file.
    #[must_use]
    pub fn inflight(timestamp: &str, action: &str) -> String {
        format!("{}{timestamp}.{action}.inflight", Self::TIMELINE_DIR)
    }

    /// Path of a requested instant file.
    #[must_use]
    pub fn requested(timestamp: &str, action: &str) -> String {
        format!("{}{timestamp}.{action}.requested", Self::TIMELINE_DIR)
    }
}
