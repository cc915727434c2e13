// 🚦 State Classifier - due date → severity, children → parent severity
//
// Pure functions, no I/O. The "month" is a flat 30-day period measured in
// whole hours; downstream reports depend on these exact thresholds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours in one flat 30-day month
const HOURS_PER_MONTH: i64 = 24 * 30;

// ============================================================================
// SEVERITY
// ============================================================================

/// Collection state shared by quotas, sales and clients.
///
/// Variant order is the severity order: `Ok < Warning < Suspended`,
/// so the worst of a set is simply its `max()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Suspended,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Ok, Severity::Warning, Severity::Suspended];

    /// Row id in the `states` table (1 = OK, 2 = WARNING, 3 = SUSPENDED)
    pub fn id(self) -> i64 {
        match self {
            Severity::Ok => 1,
            Severity::Warning => 2,
            Severity::Suspended => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Severity> {
        match id {
            1 => Some(Severity::Ok),
            2 => Some(Severity::Warning),
            3 => Some(Severity::Suspended),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Whole 30-day periods elapsed since `due_date` (negative when it is in the future)
pub fn months_past(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(due_date)
        .num_hours()
        .div_euclid(HOURS_PER_MONTH)
}

/// Classify a quota by how long ago it fell due, relative to `now`.
///
/// - no due date → OK
/// - ≥ 2 periods past → SUSPENDED
/// - ≥ 1 period past → WARNING
/// - otherwise → OK
pub fn classify_quota_at(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Severity {
    let Some(due_date) = due_date else {
        return Severity::Ok;
    };

    match months_past(due_date, now) {
        m if m >= 2 => Severity::Suspended,
        m if m >= 1 => Severity::Warning,
        _ => Severity::Ok,
    }
}

/// [`classify_quota_at`] against the current wall clock
pub fn classify_quota_by_due_date(due_date: Option<DateTime<Utc>>) -> Severity {
    classify_quota_at(due_date, Utc::now())
}

/// Worst severity among the children that are not excluded.
///
/// Each child is `(excluded, severity)`. Sales pass `(quota.is_paid, quota.state)`
/// so paid quotas do not count; clients pass `false` for every sale.
/// An empty considered set rolls up to OK.
pub fn roll_up_severity<I>(children: I) -> Severity
where
    I: IntoIterator<Item = (bool, Severity)>,
{
    children
        .into_iter()
        .filter(|(excluded, _)| !excluded)
        .map(|(_, severity)| severity)
        .max()
        .unwrap_or(Severity::Ok)
}

// ============================================================================
// TESTS
// ============================================================================
