//! snapkeepd binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use snapkeep_clock::SystemClock;
use snapkeep_daemon::cli::Cli;
use snapkeep_daemon::exit::{codes, exit_code, StartupError};
use snapkeep_daemon::journal::{Journal, NullJournal, SqliteJournal};
use snapkeep_daemon::logger::StderrLogger;
use snapkeep_daemon::scheduler::Scheduler;
use snapkeep_daemon::service::Service;
use snapkeep_daemon::signal::ShutdownFlag;
use snapkeep_daemon::sleeper::RealSleeper;
use snapkeep_policy::Policy;
use snapkeep_zfs::SystemZfs;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let shutdown = ShutdownFlag::new();
    let logger = StderrLogger::normal();

    match run(&cli, shutdown, logger) {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(exit_code(&err) as u8)
        }
    }
}

fn run(cli: &Cli, shutdown: ShutdownFlag, logger: StderrLogger) -> Result<(), StartupError> {
    let policy = Policy::load(&cli.policy)?;
    match &cli.journal {
        Some(path) => serve(policy, SqliteJournal::open(path)?, shutdown, logger),
        None => serve(policy, NullJournal, shutdown, logger),
    }
    Ok(())
}

fn serve<J: Journal + 'static>(
    policy: Policy,
    journal: J,
    shutdown: ShutdownFlag,
    logger: StderrLogger,
) {
    let service = Arc::new(Service::new(
        policy,
        SystemZfs::new(),
        journal,
        SystemClock,
        logger,
    ));
    let scheduler = Scheduler::new(service, SystemClock, RealSleeper, shutdown, logger);
    scheduler.run();
}
