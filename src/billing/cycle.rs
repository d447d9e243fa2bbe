use std::fmt;

use serde::{Deserialize, Serialize};

/// Recurrence bucket a subscription bills on.
///
/// Persisted records carry the raw interval in days; named buckets store their
/// nominal day count while a custom cycle is marked by a fractional part
/// (`n + 0.1`). The bucket is derived once when a record is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum BillingCycle {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Custom(u32),
}

const CUSTOM_MARKER: f64 = 0.1;

impl BillingCycle {
    /// Maps a raw interval in days onto a cycle.
    pub fn from_interval(raw: f64) -> Self {
        if raw.fract() != 0.0 || !raw.is_finite() {
            let days = raw.floor();
            let days = if days.is_nan() || days < 0.0 {
                0
            } else if days > u32::MAX as f64 {
                u32::MAX
            } else {
                days as u32
            };
            return BillingCycle::Custom(days);
        }
        match raw as i64 {
            i64::MIN..=6 => BillingCycle::Daily,
            7..=29 => BillingCycle::Weekly,
            30..=89 => BillingCycle::Monthly,
            90..=179 => BillingCycle::Quarterly,
            180..=364 => BillingCycle::SemiAnnual,
            _ => BillingCycle::Annual,
        }
    }

    /// Raw value written back to persisted records.
    pub fn raw_interval(self) -> f64 {
        match self {
            BillingCycle::Daily => 1.0,
            BillingCycle::Weekly => 7.0,
            BillingCycle::Monthly => 30.0,
            BillingCycle::Quarterly => 90.0,
            BillingCycle::SemiAnnual => 180.0,
            BillingCycle::Annual => 365.0,
            BillingCycle::Custom(days) => days as f64 + CUSTOM_MARKER,
        }
    }

    /// Number of calendar months between occurrences, for month-based cycles.
    pub fn months(self) -> Option<u32> {
        match self {
            BillingCycle::Monthly => Some(1),
            BillingCycle::Quarterly => Some(3),
            BillingCycle::SemiAnnual => Some(6),
            BillingCycle::Annual => Some(12),
            _ => None,
        }
    }

    /// Number of days between occurrences, for day-based cycles.
    pub fn days(self) -> Option<u32> {
        match self {
            BillingCycle::Daily => Some(1),
            BillingCycle::Weekly => Some(7),
            BillingCycle::Custom(days) => Some(days.max(1)),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            BillingCycle::Daily => "daily".into(),
            BillingCycle::Weekly => "weekly".into(),
            BillingCycle::Monthly => "monthly".into(),
            BillingCycle::Quarterly => "quarterly".into(),
            BillingCycle::SemiAnnual => "every six months".into(),
            BillingCycle::Annual => "annually".into(),
            BillingCycle::Custom(days) if days <= 1 => "every day".into(),
            BillingCycle::Custom(days) => format!("every {} days", days),
        }
    }
}

impl From<f64> for BillingCycle {
    fn from(raw: f64) -> Self {
        BillingCycle::from_interval(raw)
    }
}

impl From<BillingCycle> for f64 {
    fn from(cycle: BillingCycle) -> Self {
        cycle.raw_interval()
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
