//! snapkeepd daemon library.
//!
//! Scheduler loop, retention service, tier trigger and the surrounding
//! process plumbing (CLI, logger, signals, journal).

pub mod cli;
pub mod exit;
pub mod journal;
pub mod logger;
pub mod scheduler;
pub mod service;
pub mod signal;
pub mod sleeper;
pub mod trigger;

pub use cli::Cli;
pub use exit::{exit_code, StartupError};
pub use journal::{
    Event, EventKind, Journal, JournalError, MemoryJournal, NullJournal, Severity, SqliteJournal,
};
pub use logger::{LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use scheduler::{dispatch, JobKind, Scheduler};
pub use service::Service;
pub use signal::{NeverShutdown, ShutdownCheck, ShutdownFlag};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
