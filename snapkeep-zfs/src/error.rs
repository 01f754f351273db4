//! Error taxonomy and stderr classification.
//!
//! The tools report failures as free text; classification is substring
//! matching against a closed marker table. The table lives here and nowhere
//! else, so tool-version drift stays a one-file change.

use thiserror::Error;

/// Closed error set for adapter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZfsError {
    #[error("pool not found")]
    PoolNotFound,

    #[error("target dataset not found")]
    DatasetNotFound,

    #[error("target snapshot not found")]
    SnapshotNotFound,

    #[error("snapshot already exists")]
    SnapshotAlreadyExists,

    #[error("invalid property")]
    InvalidProperty,

    #[error("permission denied")]
    PermissionDenied,

    #[error("{0}")]
    Other(String),
}

/// Map tool stderr onto the closed error set.
///
/// Markers are case-sensitive substrings. Anything unmatched becomes
/// `Other` carrying the full stderr text.
pub fn classify_stderr(stderr: &str) -> ZfsError {
    if stderr.contains("dataset does not exist") {
        ZfsError::DatasetNotFound
    } else if stderr.contains("dataset already exists") {
        ZfsError::SnapshotAlreadyExists
    } else if stderr.contains("could not find any snapshots to destroy") {
        ZfsError::SnapshotNotFound
    } else if stderr.contains("missing pool name") || stderr.contains("is not a pool") {
        ZfsError::PoolNotFound
    } else if stderr.contains("bad property list") || stderr.contains("invalid property") {
        ZfsError::InvalidProperty
    } else if stderr.contains("permission denied") {
        ZfsError::PermissionDenied
    } else {
        ZfsError::Other(stderr.trim_end().to_string())
    }
}
