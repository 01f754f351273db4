//! In-memory adapter double for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use regex::Regex;

use crate::error::ZfsError;
use crate::Zfs;

/// Adapter operations, for targeted failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MockOp {
    Create,
    Destroy,
    List,
    GetProp,
    SetProp,
}

#[derive(Debug, Default)]
struct Inner {
    /// Snapshot names per target, newest first (list order of the real tool).
    snapshots: BTreeMap<String, Vec<String>>,
    properties: BTreeMap<(String, String), String>,
    failures: BTreeMap<(MockOp, String), ZfsError>,
    calls: Vec<String>,
}

/// In-memory `Zfs` implementation.
///
/// Datasets implicitly exist; list output is rendered as `target@name`
/// lines and run through the caller's matcher, so the substring-extraction
/// behavior of the real adapter is reproduced. A property that was never
/// set reads back as `InvalidProperty`, matching first use on a fresh pool.
#[derive(Debug, Default)]
pub struct MockZfs {
    inner: Mutex<Inner>,
}

impl MockZfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing snapshot as the newest one for `target`.
    pub fn add_snapshot(&self, target: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .snapshots
            .entry(target.to_string())
            .or_default()
            .insert(0, name.to_string());
    }

    /// Current snapshot names for `target`, newest first.
    pub fn snapshot_names(&self, target: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.snapshots.get(target).cloned().unwrap_or_default()
    }

    /// Pre-set a pool property.
    pub fn set_property(&self, pool: &str, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .properties
            .insert((pool.to_string(), key.to_string()), value.to_string());
    }

    /// Read back a pool property, if set.
    pub fn property(&self, pool: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .properties
            .get(&(pool.to_string(), key.to_string()))
            .cloned()
    }

    /// Make every `op` call on `subject` (target or pool) fail with `err`.
    pub fn inject_failure(&self, op: MockOp, subject: &str, err: ZfsError) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.insert((op, subject.to_string()), err);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn check_failure(inner: &Inner, op: MockOp, subject: &str) -> Result<(), ZfsError> {
        match inner.failures.get(&(op, subject.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Zfs for MockZfs {
    fn create_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        let mut inner = self.inner.lock().unwrap();
        let rmark = if recursive { " -r" } else { "" };
        inner.calls.push(format!("create {}@{}{}", target, name, rmark));
        Self::check_failure(&inner, MockOp::Create, target)?;

        let names = inner.snapshots.entry(target.to_string()).or_default();
        if names.iter().any(|n| n == name) {
            return Err(ZfsError::SnapshotAlreadyExists);
        }
        names.insert(0, name.to_string());
        Ok(())
    }

    fn destroy_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        let mut inner = self.inner.lock().unwrap();
        let rmark = if recursive { " -r" } else { "" };
        inner.calls.push(format!("destroy {}@{}{}", target, name, rmark));
        Self::check_failure(&inner, MockOp::Destroy, target)?;

        let names = inner.snapshots.entry(target.to_string()).or_default();
        match names.iter().position(|n| n == name) {
            Some(i) => {
                names.remove(i);
                Ok(())
            }
            None => Err(ZfsError::SnapshotNotFound),
        }
    }

    fn list_snapshot_names(&self, target: &str, matcher: &Regex) -> Result<Vec<String>, ZfsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("list {}", target));
        Self::check_failure(&inner, MockOp::List, target)?;

        let output: String = inner
            .snapshots
            .get(target)
            .map(|names| {
                names
                    .iter()
                    .map(|n| format!("{}@{}\n", target, n))
                    .collect()
            })
            .unwrap_or_default();

        Ok(matcher
            .find_iter(&output)
            .map(|m| m.as_str().to_string())
            .collect())
    }

    fn get_pool_property(&self, pool: &str, key: &str) -> Result<String, ZfsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("get {} {}", pool, key));
        Self::check_failure(&inner, MockOp::GetProp, pool)?;

        inner
            .properties
            .get(&(pool.to_string(), key.to_string()))
            .cloned()
            .ok_or(ZfsError::InvalidProperty)
    }

    fn set_pool_property(&self, pool: &str, key: &str, value: &str) -> Result<(), ZfsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("set {} {}={}", pool, key, value));
        Self::check_failure(&inner, MockOp::SetProp, pool)?;

        inner
            .properties
            .insert((pool.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
