//! Completion records and the expected-vs-actual efficiency math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::complexity::round_to;
use crate::task::{TaskId, UserId};

pub const MIN_EFFICIENCY: f64 = 0.1;
pub const MAX_EFFICIENCY: f64 = 3.0;
/// Used when no time elapsed and the ratio is undefined.
pub const NOMINAL_EFFICIENCY: f64 = 1.0;

/// One (task, completing user) event. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub completed_at: DateTime<Utc>,
    pub time_spent_hours: f64,
    /// expected / actual, in [MIN_EFFICIENCY, MAX_EFFICIENCY].
    pub efficiency: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Wall-clock hours between creation and completion, two decimals, never negative.
pub fn time_spent_hours(created_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> f64 {
    let seconds = (completed_at - created_at).num_milliseconds() as f64 / 1000.0;
    round_to(seconds / 3600.0, 2).max(0.0)
}

pub fn efficiency(expected_hours: f64, time_spent_hours: f64) -> f64 {
    if time_spent_hours <= 0.0 {
        return NOMINAL_EFFICIENCY;
    }
    (expected_hours / time_spent_hours).clamp(MIN_EFFICIENCY, MAX_EFFICIENCY)
}

pub fn average_efficiency(records: &[CompletionRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| r.efficiency).sum::<f64>() / records.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn time_spent_rounds_to_two_decimals() {
        let done = t0() + Duration::minutes(100);
        assert_eq!(time_spent_hours(t0(), done), 1.67);
    }

    #[test]
    fn time_spent_never_negative() {
        assert_eq!(time_spent_hours(t0(), t0() - Duration::hours(3)), 0.0);
    }

    #[test]
    fn efficiency_is_clamped() {
        assert_eq!(efficiency(20.0, 0.5), MAX_EFFICIENCY);
        assert_eq!(efficiency(1.0, 100.0), MIN_EFFICIENCY);
        assert!((efficiency(2.0, 6.0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_elapsed_is_nominal() {
        assert_eq!(efficiency(5.0, 0.0), NOMINAL_EFFICIENCY);
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert_eq!(average_efficiency(&[]), None);
    }
}
