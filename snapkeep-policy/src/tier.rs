//! Retention tiers.
//!
//! The five tiers are a closed enumeration with a static metadata surface;
//! everything that needs to walk "all tiers" or "the calendar tiers"
//! iterates these tables instead of inspecting the `Keep` struct.

use std::fmt;

/// A retention tier.
///
/// `Frequent` and `Hourly` are driven purely by the scheduler's minute
/// selection; the calendar tiers additionally compare calendar fields
/// against their last recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Frequent,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Tier {
    /// Every tier, in fixed order.
    pub const ALL: [Tier; 5] = [
        Tier::Frequent,
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
    ];

    /// The tiers whose firing is gated by a calendar condition.
    pub const CALENDAR: [Tier; 3] = [Tier::Daily, Tier::Weekly, Tier::Monthly];

    /// Lowercase English name, as used in snapshot names, policy files,
    /// pool property keys and journal rows.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Frequent => "frequent",
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
        }
    }

    /// Parse a tier from its lowercase name.
    pub fn from_name(name: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The pool user property recording this tier's last run on a host,
    /// `org.<prefix>d:last<tier>job`.
    pub fn property_key(self, prefix: &str) -> String {
        format!("org.{}d:last{}job", prefix, self.name())
    }

    /// Position in [`Tier::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_contains_each_tier_once() {
        assert_eq!(Tier::ALL.len(), 5);
        for (i, tier) in Tier::ALL.into_iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn test_calendar_tiers() {
        assert_eq!(Tier::CALENDAR, [Tier::Daily, Tier::Weekly, Tier::Monthly]);
    }

    #[test]
    fn test_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.name()), Some(tier));
        }
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert_eq!(Tier::from_name("yearly"), None);
        assert_eq!(Tier::from_name("Frequent"), None);
        assert_eq!(Tier::from_name(""), None);
    }

    #[test]
    fn test_property_key_format() {
        assert_eq!(Tier::Daily.property_key("kd"), "org.kdd:lastdailyjob");
        assert_eq!(
            Tier::Monthly.property_key("snap"),
            "org.snapd:lastmonthlyjob"
        );
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(Tier::Weekly.to_string(), "weekly");
    }
}
