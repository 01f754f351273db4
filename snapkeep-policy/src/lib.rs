//! Retention policy model for snapkeep.
//!
//! This crate provides:
//! - The `Tier` enumeration with its static metadata (names, pool property
//!   keys, calendar classification)
//! - `Policy`/`Plan`/`Keep` and the JSON policy loader
//! - `SnapshotNamer`, the snapshot name codec (encoding and per-tier
//!   matchers)

mod name;
mod policy;
mod tier;

pub use name::SnapshotNamer;
pub use policy::{Keep, Plan, Policy, PolicyError, MAX_PREFIX_LEN};
pub use tier::Tier;
