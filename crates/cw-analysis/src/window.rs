//! Analysis windows and the fleet-wide comparison.

use crate::pipeline::UnitAnalysis;
use crate::stats::WindowStats;
use crate::trigger::{WashTrigger, requires_wash};
use serde::{Deserialize, Serialize};

pub const MIN_GLOBAL_WINDOW_DAYS: f64 = 7.0;
pub const MAX_GLOBAL_WINDOW_DAYS: f64 = 365.0;

/// How a unit's analysis window was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    SinceLastWash,
    LastDays(u32),
}

/// Fleet comparison window [days].
///
/// The largest days-since-wash found on any unit's last operating row,
/// clamped to [7, 365] and truncated; `fallback_days` when no unit has one.
pub fn global_window_days(analyses: &[&UnitAnalysis], fallback_days: u32) -> u32 {
    analyses
        .iter()
        .filter_map(|a| a.last_operating().and_then(|r| r.days_since_wash))
        .filter(|d| d.is_finite())
        .reduce(f64::max)
        .map_or(fallback_days, |d| {
            d.clamp(MIN_GLOBAL_WINDOW_DAYS, MAX_GLOBAL_WINDOW_DAYS) as u32
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRow {
    pub unit: String,
    pub crit_mean: Option<f64>,
    pub t_out_p95: Option<f64>,
    pub rf_p95: Option<f64>,
    pub trigger: WashTrigger,
}

/// One row per unit with operating data in the last `global_days`.
pub fn fleet_comparison(
    analyses: &[&UnitAnalysis],
    global_days: u32,
    lookback_days: u32,
) -> Vec<FleetRow> {
    analyses
        .iter()
        .filter_map(|a| {
            let rows = a.operating_last_days(global_days);
            let stats = WindowStats::compute(&rows, &a.config)?;
            Some(FleetRow {
                unit: a.unit.clone(),
                crit_mean: stats.crit_mean,
                t_out_p95: stats.t_out_p95,
                rf_p95: stats.rf_p95,
                trigger: requires_wash(&rows, &a.config, lookback_days),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at_hour, operating_sample, unit_def};
    use crate::pipeline::analyze_unit;
    use cw_project::AnalysisParams;
    use cw_results::{Sample, UnitSeries};

    fn analysis(key: &str, samples: Vec<Sample>, washes: &[chrono::NaiveDateTime]) -> UnitAnalysis {
        let mut def = unit_def();
        def.key = key.to_string();
        let series = UnitSeries::from_samples(key, samples);
        match analyze_unit(&series, &def, washes, &AnalysisParams::default()) {
            Ok(a) => a,
            Err(e) => panic!("analysis failed: {e}"),
        }
    }

    #[test]
    fn global_window_uses_largest_gap() {
        let a = analysis("A", (0..48).map(operating_sample).collect(), &[at_hour(-24 * 20)]);
        let b = analysis("B", (0..48).map(operating_sample).collect(), &[at_hour(0)]);
        // A's last row is 20 days + 47 hours after its wash.
        assert_eq!(global_window_days(&[&a, &b], 30), 21);
    }

    #[test]
    fn global_window_clamps_and_falls_back() {
        let fresh = analysis("A", (0..10).map(operating_sample).collect(), &[at_hour(0)]);
        assert_eq!(global_window_days(&[&fresh], 30), 7);
        let old = analysis("A", (0..10).map(operating_sample).collect(), &[at_hour(-24 * 1000)]);
        assert_eq!(global_window_days(&[&old], 30), 365);
        let none = analysis("A", (0..10).map(operating_sample).collect(), &[]);
        assert_eq!(global_window_days(&[&none], 30), 30);
        assert_eq!(global_window_days(&[], 12), 12);
    }

    #[test]
    fn fleet_skips_units_without_recent_operation() {
        let running = analysis("A", (0..48).map(operating_sample).collect(), &[]);
        let idle_samples: Vec<Sample> = (0..48)
            .map(|h| Sample {
                timestamp: at_hour(h),
                ..Sample::default()
            })
            .collect();
        let idle = analysis("B", idle_samples, &[]);
        let rows = fleet_comparison(&[&running, &idle], 7, 30);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].unit, "A");
        assert!(!rows[0].trigger.required);
        assert!(rows[0].t_out_p95.is_some());
    }
}
