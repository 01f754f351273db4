//! Snapshot name codec.
//!
//! Snapshot names have the shape `<prefix>.<YYYY-MM-DD>.<HH:MM:SS>.<tier>`
//! and are joined to their dataset with `@`. The codec owns both directions:
//! formatting new names and recognizing existing ones via one compiled
//! matcher per tier.

use chrono::{DateTime, Local, Utc};
use regex::Regex;

use crate::tier::Tier;

const STAMP_FORMAT: &str = "%Y-%m-%d.%H:%M:%S";
const STAMP_PATTERN: &str = r"\.\d{4}-\d{2}-\d{2}\.\d{2}:\d{2}:\d{2}\.";

/// Builds and recognizes snapshot names for one policy prefix.
///
/// Matchers are compiled once per service lifetime. Applied to the raw
/// multi-line output of the list tool, a matcher's match is the snapshot
/// name itself: the `dataset@` part never matches, so the extracted
/// substring needs no further trimming.
#[derive(Debug)]
pub struct SnapshotNamer {
    prefix: String,
    local_time: bool,
    matchers: [Regex; 5],
}

impl SnapshotNamer {
    /// Compile matchers for `prefix`. The prefix must already be validated
    /// to lowercase ASCII letters; the patterns are well-formed for any
    /// such prefix.
    pub fn new(prefix: &str, local_time: bool) -> Self {
        let matchers = Tier::ALL.map(|tier| {
            let pattern = format!("(?m){}{}{}$", prefix, STAMP_PATTERN, tier.name());
            Regex::new(&pattern).expect("matcher pattern is well-formed")
        });
        Self {
            prefix: prefix.to_string(),
            local_time,
            matchers,
        }
    }

    /// The line-wise matcher recognizing names of `tier`.
    pub fn matcher(&self, tier: Tier) -> &Regex {
        &self.matchers[tier.index()]
    }

    /// Format a new snapshot name for `tier` at `unix_sec`, in UTC or local
    /// time per the policy.
    pub fn encode(&self, tier: Tier, unix_sec: i64) -> String {
        let utc = DateTime::from_timestamp(unix_sec, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let stamp = if self.local_time {
            utc.with_timezone(&Local).format(STAMP_FORMAT).to_string()
        } else {
            utc.format(STAMP_FORMAT).to_string()
        };
        format!("{}.{}.{}", self.prefix, stamp, tier.name())
    }

    /// Recover the tier from a full snapshot name, if the name belongs to
    /// this prefix.
    pub fn decode(&self, name: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|&tier| {
            self.matcher(tier)
                .find(name)
                .is_some_and(|m| m.start() == 0 && m.end() == name.len())
        })
    }
}
