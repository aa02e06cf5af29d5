//! Wash-history features.

use chrono::NaiveDateTime;
use cw_results::WashEvent;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Window for the `wash_in_last_30d` flag [days].
pub const RECENT_WASH_DAYS: f64 = 30.0;

pub(crate) fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Sorted wash times of one unit.
pub fn wash_times_for(events: &[WashEvent], unit: &str) -> Vec<NaiveDateTime> {
    let mut times: Vec<NaiveDateTime> = events
        .iter()
        .filter(|e| e.unit.as_deref() == Some(unit))
        .map(|e| e.timestamp)
        .collect();
    times.sort();
    times
}

/// Days since the latest wash at or before `at`; missing when none precedes it.
pub fn days_since_wash(at: NaiveDateTime, wash_times: &[NaiveDateTime]) -> Option<f64> {
    let idx = wash_times.partition_point(|w| *w <= at);
    let last = wash_times.get(idx.checked_sub(1)?)?;
    Some(days_between(at, *last))
}

pub fn wash_in_last_30d(days: Option<f64>) -> bool {
    days.is_some_and(|d| d <= RECENT_WASH_DAYS)
}

/// Summary of a unit's wash log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashHistory {
    pub count: usize,
    /// Mean of whole-day gaps between consecutive washes.
    pub mean_interval_days: Option<f64>,
    pub last: Option<NaiveDateTime>,
}

impl WashHistory {
    pub fn from_times(times: &[NaiveDateTime]) -> Self {
        let gaps: Vec<f64> = times
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .collect();
        Self {
            count: times.len(),
            mean_interval_days: cw_core::stats::mean_of(&gaps),
            last: times.last().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::at_hour;

    #[test]
    fn days_since_latest_preceding_wash() {
        let washes = [at_hour(0), at_hour(240)];
        assert_eq!(days_since_wash(at_hour(-1), &washes), None);
        assert_eq!(days_since_wash(at_hour(0), &washes), Some(0.0));
        assert_eq!(days_since_wash(at_hour(36), &washes), Some(1.5));
        assert_eq!(days_since_wash(at_hour(264), &washes), Some(1.0));
        assert_eq!(days_since_wash(at_hour(5), &[]), None);
    }

    #[test]
    fn recent_flag() {
        assert!(wash_in_last_30d(Some(30.0)));
        assert!(!wash_in_last_30d(Some(30.5)));
        assert!(!wash_in_last_30d(None));
    }

    #[test]
    fn history_summary() {
        let h = WashHistory::from_times(&[at_hour(0), at_hour(24 * 10), at_hour(24 * 30 + 5)]);
        assert_eq!(h.count, 3);
        assert_eq!(h.mean_interval_days, Some(15.0));
        assert_eq!(h.last, Some(at_hour(24 * 30 + 5)));
        assert_eq!(WashHistory::from_times(&[]).mean_interval_days, None);
    }
}
