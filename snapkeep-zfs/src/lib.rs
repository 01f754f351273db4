//! ZFS storage adapter for snapkeep.
//!
//! This crate provides:
//! - The closed `ZfsError` taxonomy and the stderr marker table that maps
//!   tool output onto it
//! - The `Zfs` trait covering the five operations the retention engine
//!   consumes
//! - `SystemZfs`, the subprocess implementation over the `zfs`/`zpool`
//!   command-line tools
//! - `MockZfs`, an in-memory double for tests

mod error;
mod exec;
mod mock;

use regex::Regex;

pub use error::{classify_stderr, ZfsError};
pub use exec::SystemZfs;
pub use mock::{MockOp, MockZfs};

/// Interaction with the volume manager.
///
/// The adapter is stateless; it is safe to call from concurrent jobs as the
/// underlying tools serialize snapshot operations themselves.
pub trait Zfs: Send + Sync {
    /// Take a snapshot `target@name`, cascading to children when
    /// `recursive`.
    fn create_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError>;

    /// Destroy the snapshot `target@name`, cascading to children when
    /// `recursive`.
    fn destroy_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError>;

    /// List the snapshot names under `target` matching `matcher`, newest
    /// first.
    ///
    /// The matcher is applied line-wise to the tool output and the matched
    /// substring is the returned name, so the `target@` part is stripped by
    /// construction. Tool ordering (creation time descending) is preserved.
    fn list_snapshot_names(&self, target: &str, matcher: &Regex) -> Result<Vec<String>, ZfsError>;

    /// Read a pool-scoped user property value.
    fn get_pool_property(&self, pool: &str, key: &str) -> Result<String, ZfsError>;

    /// Write a pool-scoped user property value.
    fn set_pool_property(&self, pool: &str, key: &str, value: &str) -> Result<(), ZfsError>;
}

impl<T: Zfs + ?Sized> Zfs for std::sync::Arc<T> {
    fn create_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        (**self).create_snapshot(target, name, recursive)
    }

    fn destroy_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        (**self).destroy_snapshot(target, name, recursive)
    }

    fn list_snapshot_names(&self, target: &str, matcher: &Regex) -> Result<Vec<String>, ZfsError> {
        (**self).list_snapshot_names(target, matcher)
    }

    fn get_pool_property(&self, pool: &str, key: &str) -> Result<String, ZfsError> {
        (**self).get_pool_property(pool, key)
    }

    fn set_pool_property(&self, pool: &str, key: &str, value: &str) -> Result<(), ZfsError> {
        (**self).set_pool_property(pool, key, value)
    }
}
