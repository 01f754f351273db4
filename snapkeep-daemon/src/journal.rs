//! Append-only event journal.
//!
//! One row per side effect; the journal is never queried by the daemon.
//! The SQLite backing is optional; with no journal path on the command
//! line the daemon runs against `NullJournal`.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use thiserror::Error;

/// Kind of a journaled side effect.
///
/// Discriminants are the stable on-disk encoding. `IgnoreTimestamp` is
/// reserved: defined in the schema, currently never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CreateSnapshot = 0,
    ListSnapshotNames = 1,
    DestroySnapshot = 2,
    GetPoolProperty = 3,
    IgnoreTimestamp = 4,
    SetPoolProperty = 5,
    StopService = 6,
}

/// Outcome classification of a journaled side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success = 0,
    Warning = 1,
    Error = 2,
}

/// A single journal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub severity: Severity,
    /// Unix seconds at emission time.
    pub timestamp: i64,
    /// The dataset, snapshot or pool the operation acted on.
    pub target: String,
    /// Tier name of the enclosing job, empty for service-level events.
    pub job: String,
    pub recursive: bool,
    /// Failure reason, empty on success.
    pub description: String,
}

/// Errors from journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Opaque append-only event recorder.
///
/// Jobs append concurrently; implementations handle their own locking.
pub trait Journal: Send + Sync {
    fn append(&self, event: &Event) -> Result<(), JournalError>;
}

impl<T: Journal + ?Sized> Journal for std::sync::Arc<T> {
    fn append(&self, event: &Event) -> Result<(), JournalError> {
        (**self).append(event)
    }
}

/// SQLite-backed journal.
#[derive(Debug)]
pub struct SqliteJournal {
    conn: Mutex<Connection>,
}

impl SqliteJournal {
    /// Open (creating if needed) the journal database at `path`.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                type INTEGER NOT NULL,
                severity INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                target TEXT NOT NULL,
                job TEXT NOT NULL,
                recursive INTEGER NOT NULL,
                description TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Journal for SqliteJournal {
    fn append(&self, event: &Event) -> Result<(), JournalError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO events VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.kind as i64,
                event.severity as i64,
                event.timestamp,
                event.target,
                event.job,
                event.recursive as i64,
                event.description,
            ],
        )?;
        Ok(())
    }
}

/// Journal that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn append(&self, _event: &Event) -> Result<(), JournalError> {
        Ok(())
    }
}

/// Journal double capturing events for assertions.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    events: Mutex<Vec<Event>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Captured events of one kind.
    pub fn events_of(&self, kind: EventKind) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }
}

impl Journal for MemoryJournal {
    fn append(&self, event: &Event) -> Result<(), JournalError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event(kind: EventKind) -> Event {
        Event {
            kind,
            severity: Severity::Success,
            timestamp: 1735689600,
            target: "tank/a".to_string(),
            job: "frequent".to_string(),
            recursive: false,
            description: String::new(),
        }
    }

    #[test]
    fn test_event_kind_discriminants_are_stable() {
        assert_eq!(EventKind::CreateSnapshot as i64, 0);
        assert_eq!(EventKind::ListSnapshotNames as i64, 1);
        assert_eq!(EventKind::DestroySnapshot as i64, 2);
        assert_eq!(EventKind::GetPoolProperty as i64, 3);
        assert_eq!(EventKind::IgnoreTimestamp as i64, 4);
        assert_eq!(EventKind::SetPoolProperty as i64, 5);
        assert_eq!(EventKind::StopService as i64, 6);
    }

    #[test]
    fn test_severity_discriminants_are_stable() {
        assert_eq!(Severity::Success as i64, 0);
        assert_eq!(Severity::Warning as i64, 1);
        assert_eq!(Severity::Error as i64, 2);
    }

    #[test]
    fn test_sqlite_journal_appends_rows() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("journal.db");

        let journal = SqliteJournal::open(&path).expect("open");
        journal.append(&event(EventKind::CreateSnapshot)).expect("append");
        let mut destroy = event(EventKind::DestroySnapshot);
        destroy.severity = Severity::Error;
        destroy.target = "tank/a@kd.2025-01-01.00:00:00.frequent".to_string();
        destroy.recursive = true;
        destroy.description = "permission denied".to_string();
        journal.append(&destroy).expect("append");
        drop(journal);

        let conn = Connection::open(&path).expect("reopen");
        let mut stmt = conn
            .prepare("SELECT type, severity, target, recursive, description FROM events ORDER BY rowid")
            .expect("prepare");
        let rows: Vec<(i64, i64, String, i64, String)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (0, 0, "tank/a".to_string(), 0, String::new()));
        assert_eq!(
            rows[1],
            (
                2,
                2,
                "tank/a@kd.2025-01-01.00:00:00.frequent".to_string(),
                1,
                "permission denied".to_string(),
            )
        );
    }

    #[test]
    fn test_sqlite_journal_reopens_existing_database() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("journal.db");

        {
            let journal = SqliteJournal::open(&path).expect("open");
            journal.append(&event(EventKind::StopService)).expect("append");
        }
        {
            let journal = SqliteJournal::open(&path).expect("reopen");
            journal.append(&event(EventKind::StopService)).expect("append");
        }

        let conn = Connection::open(&path).expect("reopen raw");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_sqlite_journal_open_fails_on_bad_path() {
        let err = SqliteJournal::open(Path::new("/nonexistent-dir/journal.db")).unwrap_err();
        assert!(matches!(err, JournalError::Sqlite(_)));
    }

    #[test]
    fn test_memory_journal_captures_in_order() {
        let journal = MemoryJournal::new();
        journal.append(&event(EventKind::CreateSnapshot)).expect("append");
        journal.append(&event(EventKind::ListSnapshotNames)).expect("append");

        let events = journal.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::CreateSnapshot);
        assert_eq!(events[1].kind, EventKind::ListSnapshotNames);
        assert_eq!(journal.events_of(EventKind::CreateSnapshot).len(), 1);
    }

    #[test]
    fn test_null_journal_accepts_everything() {
        NullJournal.append(&event(EventKind::StopService)).expect("append");
    }
}
