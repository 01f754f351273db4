//! Calendar trigger for the daily/weekly/monthly tiers.
//!
//! A pure predicate over the tick time and a tier's last recorded run,
//! interpreted in UTC calendar arithmetic. The frequent and hourly tiers
//! carry no calendar condition; they are gated solely by the scheduler's
//! minute selection.

use chrono::{DateTime, Datelike, Utc};

use snapkeep_policy::Tier;

/// Whether `tier` must run at `now`, given its last run at `last_run` Unix
/// seconds (0 when unknown, which forces a fire).
pub fn fires(tier: Tier, now: DateTime<Utc>, last_run: i64) -> bool {
    let last = DateTime::from_timestamp(last_run, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    match tier {
        Tier::Frequent | Tier::Hourly => true,
        Tier::Daily => now.year() != last.year() || now.ordinal() != last.ordinal(),
        Tier::Weekly => {
            let (now_week, last_week) = (now.iso_week(), last.iso_week());
            now_week.year() != last_week.year() || now_week.week() != last_week.week()
        }
        Tier::Monthly => now.year() != last.year() || now.month() != last.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(unix_sec: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(unix_sec, 0).expect("valid timestamp")
    }

    // 2025-01-01T00:00:00Z
    const NEW_YEAR: i64 = 1735689600;
    // 2024-12-31T12:00:00Z
    const NEW_YEARS_EVE_NOON: i64 = NEW_YEAR - 43200;

    #[test]
    fn test_frequent_and_hourly_always_fire() {
        for tier in [Tier::Frequent, Tier::Hourly] {
            assert!(fires(tier, at(NEW_YEAR), 0));
            assert!(fires(tier, at(NEW_YEAR), NEW_YEAR));
        }
    }

    #[test]
    fn test_calendar_tiers_fire_on_epoch_last_run() {
        for tier in Tier::CALENDAR {
            assert!(fires(tier, at(NEW_YEAR), 0), "tier {}", tier);
        }
    }

    #[test]
    fn test_daily_fires_on_day_change() {
        assert!(fires(Tier::Daily, at(NEW_YEAR), NEW_YEARS_EVE_NOON));
    }

    #[test]
    fn test_daily_quiet_within_same_day() {
        // One hour after a run earlier the same day.
        assert!(!fires(Tier::Daily, at(NEW_YEAR + 3600), NEW_YEAR));
    }

    #[test]
    fn test_daily_fires_on_same_ordinal_different_year() {
        // 2024-01-01 vs 2025-01-01: ordinal 1 both, year differs.
        let jan_first_2024 = 1704067200;
        assert!(fires(Tier::Daily, at(NEW_YEAR), jan_first_2024));
    }

    #[test]
    fn test_weekly_quiet_across_year_boundary_within_iso_week() {
        // 2024-12-31 (Tue) and 2025-01-01 (Wed) are both ISO week 2025-W01.
        assert!(!fires(Tier::Weekly, at(NEW_YEAR), NEW_YEARS_EVE_NOON));
    }

    #[test]
    fn test_weekly_fires_on_iso_week_change() {
        // 2024-12-28 (Sat, 2024-W52) -> 2024-12-30 (Mon, 2025-W01).
        let saturday = NEW_YEAR - 4 * 86400;
        let monday = NEW_YEAR - 2 * 86400;
        assert!(fires(Tier::Weekly, at(monday), saturday));
    }

    #[test]
    fn test_monthly_fires_on_month_change() {
        assert!(fires(Tier::Monthly, at(NEW_YEAR), NEW_YEARS_EVE_NOON));
    }

    #[test]
    fn test_monthly_quiet_within_month() {
        // Mid-January after a run on the 1st.
        assert!(!fires(Tier::Monthly, at(NEW_YEAR + 14 * 86400), NEW_YEAR));
    }

    #[test]
    fn test_trigger_is_monotone_in_last_run() {
        // For last_run' >= last_run (both <= now):
        // fires(now, last_run') implies fires(now, last_run).
        let now = at(NEW_YEAR + 7 * 86400 + 3600);
        // Samples span a month before the tick up into the tick's own day,
        // all <= now (the property does not hold for future last runs).
        let samples: Vec<i64> = (0..74)
            .map(|i| NEW_YEAR - 30 * 86400 + i * 43200 + 900)
            .chain([0, NEW_YEAR + 7 * 86400 + 1800])
            .collect();

        for tier in Tier::CALENDAR {
            for &lr in &samples {
                for &lr_later in &samples {
                    if lr_later < lr {
                        continue;
                    }
                    if fires(tier, now, lr_later) {
                        assert!(
                            fires(tier, now, lr),
                            "tier {} now {} lr {} lr_later {}",
                            tier,
                            now,
                            lr,
                            lr_later
                        );
                    }
                }
            }
        }
    }
}
