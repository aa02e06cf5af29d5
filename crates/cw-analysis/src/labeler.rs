//! Future-wash labels for training.

use chrono::{Duration, NaiveDateTime};
use cw_project::LabelPolicy;

/// Label each time with 1 when a wash falls in `(t, t + horizon_days]`.
///
/// `wash_times` must be sorted. Without any wash history the policy decides:
/// all-negative labels, or `None` when history is required.
pub fn label_rows(
    times: &[NaiveDateTime],
    wash_times: &[NaiveDateTime],
    horizon_days: u32,
    policy: LabelPolicy,
) -> Option<Vec<u8>> {
    if wash_times.is_empty() {
        match policy {
            LabelPolicy::NoHistoryIsNegative => {
                tracing::warn!(
                    rows = times.len(),
                    "no wash history; every sample labelled as not needing a wash"
                );
                return Some(vec![0; times.len()]);
            }
            LabelPolicy::NoHistoryIsUnknown => return None,
        }
    }

    let horizon = Duration::days(i64::from(horizon_days));
    Some(
        times
            .iter()
            .map(|&t| {
                let next = wash_times.partition_point(|w| *w <= t);
                let hit = wash_times.get(next).is_some_and(|w| *w <= t + horizon);
                u8::from(hit)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::at_hour;

    #[test]
    fn horizon_is_open_closed() {
        let washes = [at_hour(24 * 30)];
        let times = [at_hour(0), at_hour(1), at_hour(24 * 30), at_hour(24 * 30 - 1)];
        let y = label_rows(&times, &washes, 30, LabelPolicy::NoHistoryIsNegative).unwrap();
        // t = 0: wash exactly at t + 30d is inside; at t = wash time it is not after t.
        assert_eq!(y, vec![1, 1, 0, 1]);
        let y = label_rows(&[at_hour(-1)], &washes, 30, LabelPolicy::NoHistoryIsNegative).unwrap();
        assert_eq!(y, vec![0]);
    }

    #[test]
    fn no_history_follows_policy() {
        let times = [at_hour(0), at_hour(1)];
        assert_eq!(
            label_rows(&times, &[], 30, LabelPolicy::NoHistoryIsNegative),
            Some(vec![0, 0])
        );
        assert_eq!(label_rows(&times, &[], 30, LabelPolicy::NoHistoryIsUnknown), None);
    }
}
