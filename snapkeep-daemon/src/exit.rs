//! Startup errors and process exit codes.

use thiserror::Error;

use snapkeep_policy::PolicyError;

use crate::journal::JournalError;

/// Exit code constants.
pub mod codes {
    /// Clean shutdown.
    pub const SUCCESS: i32 = 0;
    /// Bad command-line usage (clap's own convention).
    pub const USAGE: i32 = 1;
    /// The policy could not be loaded.
    pub const POLICY_ERROR: i32 = 2;
    /// The journal could not be opened.
    pub const JOURNAL_ERROR: i32 = 3;
}

/// Fatal errors before the scheduler starts. Steady-state errors never
/// surface here; they are logged and skipped inside the jobs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot load the policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("cannot open the journal: {0}")]
    Journal(#[from] JournalError),
}

/// Map a startup error to its exit code.
pub fn exit_code(error: &StartupError) -> i32 {
    match error {
        StartupError::Policy(_) => codes::POLICY_ERROR,
        StartupError::Journal(_) => codes::JOURNAL_ERROR,
    }
}
