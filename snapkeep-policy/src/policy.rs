//! Policy data model and JSON loader.
//!
//! A policy file is UTF-8 JSON with a closed schema: unknown fields fail the
//! parse at every level. Groups are flattened at load time; the in-memory
//! `Policy` only ever carries the per-target map.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::tier::Tier;

/// Maximum accepted prefix length, in characters.
pub const MAX_PREFIX_LEN: usize = 32;

/// Errors from policy loading and validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("cannot open policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse policy file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("prefix is not specified")]
    EmptyPrefix,

    #[error("prefix is longer than {MAX_PREFIX_LEN} characters")]
    PrefixTooLong,

    #[error("prefix contains forbidden characters (not a-z)")]
    PrefixForbiddenChars,

    #[error("invalid target {0:?}: expected pool/dataset with non-empty segments")]
    InvalidTarget(String),

    #[error("group {group:?} contains previously specified target {target:?}")]
    DuplicateTarget { group: String, target: String },
}

/// Per-tier keep counts. An absent count disables the tier for the plan;
/// zero keeps the tier enabled for pruning without taking new snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Keep {
    pub frequent: Option<u32>,
    pub hourly: Option<u32>,
    pub daily: Option<u32>,
    pub weekly: Option<u32>,
    pub monthly: Option<u32>,
}

impl Keep {
    /// The keep count configured for `tier`, if the tier is enabled.
    pub fn for_tier(&self, tier: Tier) -> Option<u32> {
        match tier {
            Tier::Frequent => self.frequent,
            Tier::Hourly => self.hourly,
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
        }
    }
}

/// Per-target configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plan {
    /// Whether snapshot and destroy operations cascade to child datasets.
    pub recursive: bool,
    pub keep: Keep,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    members: Vec<String>,
    plan: Plan,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolicy {
    prefix: String,
    #[serde(default)]
    local_time: bool,
    #[serde(default)]
    targets: BTreeMap<String, Plan>,
    #[serde(default)]
    groups: BTreeMap<String, RawGroup>,
}

/// A validated, immutable retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Snapshot name prefix, 1-32 lowercase ASCII letters.
    pub prefix: String,
    /// Format snapshot timestamps in local time instead of UTC.
    pub local_time: bool,
    /// Flattened target map: top-level targets plus all group members.
    pub targets: BTreeMap<String, Plan>,
}

impl Policy {
    /// Load and validate a policy from a JSON file.
    pub fn load(path: &Path) -> Result<Policy, PolicyError> {
        let data = fs::read_to_string(path)?;
        Policy::from_json(&data)
    }

    /// Parse and validate a policy from a JSON string.
    pub fn from_json(data: &str) -> Result<Policy, PolicyError> {
        let raw: RawPolicy = serde_json::from_str(data)?;

        validate_prefix(&raw.prefix)?;
        for target in raw.targets.keys() {
            validate_target(target)?;
        }

        let mut targets = raw.targets;
        for (name, group) in raw.groups {
            for member in group.members {
                validate_target(&member)?;
                if targets.contains_key(&member) {
                    return Err(PolicyError::DuplicateTarget {
                        group: name,
                        target: member,
                    });
                }
                targets.insert(member, group.plan);
            }
        }

        Ok(Policy {
            prefix: raw.prefix,
            local_time: raw.local_time,
            targets,
        })
    }

    /// The distinct pools the targets live in: the set of leading path
    /// segments, in sorted order.
    pub fn pools(&self) -> Vec<String> {
        let mut pools: Vec<String> = self
            .targets
            .keys()
            .filter_map(|t| t.split('/').next())
            .map(str::to_string)
            .collect();
        pools.sort();
        pools.dedup();
        pools
    }
}

fn validate_prefix(prefix: &str) -> Result<(), PolicyError> {
    if prefix.is_empty() {
        return Err(PolicyError::EmptyPrefix);
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        return Err(PolicyError::PrefixTooLong);
    }
    if !prefix.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(PolicyError::PrefixForbiddenChars);
    }
    Ok(())
}

/// A target is `pool/seg[/seg...]`: a non-empty pool part followed by at
/// least one non-empty path segment.
fn validate_target(target: &str) -> Result<(), PolicyError> {
    let mut parts = target.split('/');
    let pool = parts.next().unwrap_or_default();

    let mut segments = 0;
    let mut valid = !pool.is_empty();
    for segment in parts {
        if segment.is_empty() {
            valid = false;
            break;
        }
        segments += 1;
    }

    if valid && segments > 0 {
        Ok(())
    } else {
        Err(PolicyError::InvalidTarget(target.to_string()))
    }
}
