//! Retention service: the enforcement engine and the two job kinds.
//!
//! A `Service` owns the immutable policy, the derived pool list and name
//! matchers, and handles to its collaborators. Jobs never abort on a
//! per-target or per-operation failure; the failing operation is logged,
//! journaled and skipped so one broken dataset cannot starve the rest.

use chrono::{DateTime, Utc};

use snapkeep_clock::Clock;
use snapkeep_policy::{Policy, SnapshotNamer, Tier};
use snapkeep_zfs::{Zfs, ZfsError};

use crate::journal::{Event, EventKind, Journal, Severity};
use crate::logger::Logger;
use crate::trigger;

/// Retention engine over one policy.
pub struct Service<Z, J, C, L> {
    policy: Policy,
    pools: Vec<String>,
    namer: SnapshotNamer,
    zfs: Z,
    journal: J,
    clock: C,
    logger: L,
}

impl<Z, J, C, L> Service<Z, J, C, L>
where
    Z: Zfs,
    J: Journal,
    C: Clock,
    L: Logger,
{
    pub fn new(policy: Policy, zfs: Z, journal: J, clock: C, logger: L) -> Self {
        let pools = policy.pools();
        let namer = SnapshotNamer::new(&policy.prefix, policy.local_time);
        Self {
            policy,
            pools,
            namer,
            zfs,
            journal,
            clock,
            logger,
        }
    }

    /// Enforce one tier across every target: optionally take a new
    /// snapshot, then destroy everything past the keep count, newest
    /// first. A failed create still leads to pruning; the goal is bounded
    /// retention, not all-or-nothing.
    pub fn enforce(&self, tier: Tier) {
        for (target, plan) in &self.policy.targets {
            let Some(keep) = plan.keep.for_tier(tier) else {
                continue;
            };
            let keep = keep as usize;

            self.logger.info(&format!(
                "enforcing {:?} (keep {}) for target {:?}",
                tier.name(),
                keep,
                target
            ));

            let rmark = if plan.recursive { "[r]" } else { "" };

            if keep > 0 {
                let name = self.namer.encode(tier, self.clock.now_unix_sec());
                self.logger
                    .info(&format!("[+]{} create snapshot {}@{}", rmark, target, name));
                let result = self.zfs.create_snapshot(target, &name, plan.recursive);
                if let Err(err) = &result {
                    self.logger
                        .info(&format!("cannot snapshot target {:?}: {}", target, err));
                }
                self.emit(
                    EventKind::CreateSnapshot,
                    target,
                    tier.name(),
                    plan.recursive,
                    result.as_ref().err(),
                );
            }

            let names = match self.zfs.list_snapshot_names(target, self.namer.matcher(tier)) {
                Ok(names) => {
                    self.emit(EventKind::ListSnapshotNames, target, tier.name(), false, None);
                    names
                }
                Err(err) => {
                    self.logger.info(&format!(
                        "cannot list snapshots of target {:?}: {}",
                        target, err
                    ));
                    self.emit(
                        EventKind::ListSnapshotNames,
                        target,
                        tier.name(),
                        false,
                        Some(&err),
                    );
                    continue;
                }
            };

            if names.len() <= keep {
                continue;
            }

            for name in &names[keep..] {
                self.logger
                    .info(&format!("[-]{} destroy snapshot {}@{}", rmark, target, name));
                let result = self.zfs.destroy_snapshot(target, name, plan.recursive);
                if let Err(err) = &result {
                    self.logger.info(&format!(
                        "cannot destroy snapshot \"{}@{}\": {}",
                        target, name, err
                    ));
                }
                let snapshot = format!("{}@{}", target, name);
                self.emit(
                    EventKind::DestroySnapshot,
                    &snapshot,
                    tier.name(),
                    plan.recursive,
                    result.as_ref().err(),
                );
            }
        }
    }

    /// The quarter-hour job: frequent tier only.
    pub fn frequent_job(&self) {
        self.enforce(Tier::Frequent);
    }

    /// The top-of-hour job: frequent and hourly unconditionally, then the
    /// calendar tiers whose trigger fires against the persisted last-run
    /// state.
    pub fn regular_job(&self, tick: i64) {
        self.frequent_job();
        self.enforce(Tier::Hourly);

        let now = DateTime::from_timestamp(tick, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        // One last-run value per calendar tier, reduced to the maximum
        // across pools: any pool's record is evidence this host ran the
        // tier, and the newest wins.
        let mut last_runs = [0i64; Tier::CALENDAR.len()];
        for pool in &self.pools {
            for (i, tier) in Tier::CALENDAR.iter().enumerate() {
                let key = tier.property_key(&self.policy.prefix);
                let result = self.zfs.get_pool_property(pool, &key);
                self.emit(
                    EventKind::GetPoolProperty,
                    pool,
                    tier.name(),
                    false,
                    result.as_ref().err(),
                );
                let value = match result {
                    Ok(value) => value,
                    Err(err) => {
                        match err {
                            // First use on this pool: nothing recorded yet.
                            ZfsError::InvalidProperty => {}
                            ZfsError::PoolNotFound => {
                                self.logger
                                    .info(&format!("cannot access pool {:?}: {}", pool, err));
                            }
                            _ => {
                                self.logger.info(&format!(
                                    "cannot get property {:?} of pool {:?}: {}",
                                    key, pool, err
                                ));
                            }
                        }
                        continue;
                    }
                };

                match value.trim().parse::<i64>() {
                    Ok(ts) if ts > last_runs[i] => last_runs[i] = ts,
                    Ok(_) => {}
                    Err(_) => {
                        self.logger.info(&format!(
                            "ignoring invalid timestamp {:?} (property {:?} of pool {:?})",
                            value, key, pool
                        ));
                    }
                }
            }
        }

        let mut ran = Vec::new();
        for (i, &tier) in Tier::CALENDAR.iter().enumerate() {
            if trigger::fires(tier, now, last_runs[i]) {
                self.enforce(tier);
                ran.push(tier);
            }
        }

        let tick_value = tick.to_string();
        for tier in ran {
            let key = tier.property_key(&self.policy.prefix);
            for pool in &self.pools {
                let result = self.zfs.set_pool_property(pool, &key, &tick_value);
                if let Err(err) = &result {
                    self.logger.info(&format!(
                        "cannot set property {:?} of pool {:?}: {}",
                        key, pool, err
                    ));
                }
                self.emit(
                    EventKind::SetPoolProperty,
                    pool,
                    tier.name(),
                    false,
                    result.as_ref().err(),
                );
            }
        }
    }

    /// Journal the clean-shutdown marker.
    pub fn record_stop(&self) {
        self.emit(EventKind::StopService, "", "", false, None);
    }

    fn emit(
        &self,
        kind: EventKind,
        target: &str,
        job: &str,
        recursive: bool,
        err: Option<&ZfsError>,
    ) {
        let severity = match err {
            None => Severity::Success,
            Some(ZfsError::InvalidProperty | ZfsError::SnapshotNotFound) => Severity::Warning,
            Some(_) => Severity::Error,
        };
        let event = Event {
            kind,
            severity,
            timestamp: self.clock.now_unix_sec(),
            target: target.to_string(),
            job: job.to_string(),
            recursive,
            description: err.map(ToString::to_string).unwrap_or_default(),
        };
        if let Err(journal_err) = self.journal.append(&event) {
            self.logger.info(&format!(
                "cannot add an event (code {}) to the journal: {}",
                kind as i64, journal_err
            ));
        }
    }
}
