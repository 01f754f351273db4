//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

/// ZFS snapshot retention daemon.
///
/// Creates snapshots on a fixed cadence and prunes each retention tier
/// down to its configured keep count, per the policy file.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "snapkeepd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the policy file.
    #[arg(short = 'p', long = "policy", value_name = "PATH")]
    pub policy: PathBuf,

    /// Path to the journal database. The journal is disabled when absent.
    #[arg(short = 'j', long = "journal", value_name = "PATH")]
    pub journal: Option<PathBuf>,
}
