//! Scheduler loop.
//!
//! Wakes once per minute, dispatches jobs at the prescribed minute
//! offsets, and drains in-flight jobs on shutdown. Jobs run on their own
//! threads over a shared `Service`; the loop never waits on a job except
//! during the final drain. Missed ticks are not coalesced; a stale tier
//! state simply re-fires the calendar tiers on the next eligible tick.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Timelike, Utc};

use snapkeep_clock::Clock;
use snapkeep_zfs::Zfs;

use crate::journal::Journal;
use crate::logger::Logger;
use crate::service::Service;
use crate::signal::ShutdownCheck;
use crate::sleeper::Sleeper;

/// Job kinds the loop can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Frequent,
    Regular,
}

/// Which job, if any, runs at a given minute of the hour.
pub fn dispatch(minute: u32) -> Option<JobKind> {
    match minute {
        0 => Some(JobKind::Regular),
        15 | 30 | 45 => Some(JobKind::Frequent),
        _ => None,
    }
}

fn minute_of(unix_sec: i64) -> u32 {
    DateTime::from_timestamp(unix_sec, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .minute()
}

/// The daemon's control loop.
pub struct Scheduler<Z, J, C, L, S, H> {
    service: Arc<Service<Z, J, C, L>>,
    clock: C,
    sleeper: S,
    shutdown: H,
    logger: L,
}

impl<Z, J, C, L, S, H> Scheduler<Z, J, C, L, S, H>
where
    Z: Zfs + 'static,
    J: Journal + 'static,
    C: Clock + 'static,
    L: Logger + 'static,
    S: Sleeper,
    H: ShutdownCheck,
{
    pub fn new(
        service: Arc<Service<Z, J, C, L>>,
        clock: C,
        sleeper: S,
        shutdown: H,
        logger: L,
    ) -> Self {
        Self {
            service,
            clock,
            sleeper,
            shutdown,
            logger,
        }
    }

    /// Run until shutdown is requested, then drain and record the stop.
    pub fn run(&self) {
        let mut jobs: Vec<JoinHandle<()>> = Vec::new();

        loop {
            if !self.sleep_until_next_minute() {
                break;
            }
            let tick = self.clock.now_unix_sec();
            match dispatch(minute_of(tick)) {
                Some(JobKind::Regular) => {
                    let service = Arc::clone(&self.service);
                    jobs.push(thread::spawn(move || service.regular_job(tick)));
                }
                Some(JobKind::Frequent) => {
                    let service = Arc::clone(&self.service);
                    jobs.push(thread::spawn(move || service.frequent_job()));
                }
                None => {}
            }
            jobs.retain(|job| !job.is_finished());
        }

        self.logger.info("(!) waiting for jobs to finish");
        for job in jobs {
            let _ = job.join();
        }
        self.service.record_stop();
        self.logger.info("(!) exiting");
    }

    /// Sleep in one-second slices up to the next minute boundary, so the
    /// shutdown flag is observed promptly. Returns false when shutdown was
    /// requested instead of a tick.
    fn sleep_until_next_minute(&self) -> bool {
        let target = (self.clock.now_unix_sec().div_euclid(60) + 1) * 60;
        loop {
            if self.shutdown.should_stop() {
                return false;
            }
            let now = self.clock.now_unix_sec();
            if now >= target {
                return true;
            }
            self.sleeper.sleep_sec((target - now).min(1) as u64);
        }
    }
}
