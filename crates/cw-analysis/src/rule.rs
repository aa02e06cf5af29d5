//! Fouling trend toward critical and the rule-based operational score.

use crate::stats::WindowStats;
use crate::trend::MIN_RISING_SLOPE;
use chrono::Duration;
use cw_core::stats::linear_slope;
use cw_project::UnitConfig;
use cw_results::AugmentedSample;
use serde::{Deserialize, Serialize};

/// Fewer points than this in the lookback gives no trend.
pub const MIN_TREND_POINTS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    NoData,
    FewPoints,
    Stable,
    Worsening,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub slope: Option<f64>,
    pub days_to_critical: Option<f64>,
    pub state: TrendState,
}

impl TrendEstimate {
    fn empty(state: TrendState) -> Self {
        Self {
            slope: None,
            days_to_critical: None,
            state,
        }
    }
}

/// Fit a line through the last `lookback_days` of fouling values.
///
/// The slope is per sample, against the sample index; the estimate converts
/// it to days assuming hourly samples.
pub fn rf_trend_to_critical(
    rows: &[&AugmentedSample],
    config: &UnitConfig,
    lookback_days: u32,
) -> TrendEstimate {
    let points: Vec<(chrono::NaiveDateTime, f64)> = rows
        .iter()
        .filter_map(|r| r.thermal.rf_x1e4.map(|rf| (r.timestamp(), rf)))
        .collect();
    let Some(end) = points.iter().map(|(t, _)| *t).max() else {
        return TrendEstimate::empty(TrendState::NoData);
    };
    let cutoff = end - Duration::days(i64::from(lookback_days));
    let mut recent: Vec<(chrono::NaiveDateTime, f64)> =
        points.into_iter().filter(|(t, _)| *t >= cutoff).collect();
    if recent.len() < MIN_TREND_POINTS {
        return TrendEstimate::empty(TrendState::FewPoints);
    }
    recent.sort_by_key(|(t, _)| *t);

    let values: Vec<f64> = recent.iter().map(|(_, v)| *v).collect();
    let Some(slope) = linear_slope(&values) else {
        return TrendEstimate::empty(TrendState::NoData);
    };
    let current = values[values.len() - 1];
    let critical = config.rf_critical_x1e4();

    if slope <= MIN_RISING_SLOPE {
        return TrendEstimate {
            slope: Some(slope),
            days_to_critical: None,
            state: TrendState::Stable,
        };
    }
    let days = if current >= critical {
        0.0
    } else {
        ((critical - current) / slope / 24.0).max(0.0)
    };
    TrendEstimate {
        slope: Some(slope),
        days_to_critical: Some(days),
        state: TrendState::Worsening,
    }
}

/// Rule-based probability of needing a wash, with its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    pub score: f64,
    pub temp_s: f64,
    pub foul_s: f64,
    pub crit_s: f64,
    pub trend_s: f64,
    pub trend: TrendEstimate,
    /// Human-readable breakdown.
    pub notes: Vec<String>,
}

pub(crate) fn fmt_opt(v: Option<f64>, decimals: usize, missing: &str) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => missing.to_string(),
    }
}

fn unit_clamp(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).map_or(0.0, |x| x.clamp(0.0, 1.0))
}

/// Score the operating rows of a window; any missing statistic contributes 0.
pub fn rule_score(rows: &[&AugmentedSample], config: &UnitConfig, lookback_days: u32) -> RuleScore {
    let Some(stats) = WindowStats::compute(rows, config) else {
        return RuleScore {
            score: 0.0,
            temp_s: 0.0,
            foul_s: 0.0,
            crit_s: 0.0,
            trend_s: 0.0,
            trend: TrendEstimate::empty(TrendState::NoData),
            notes: vec!["No data.".to_string()],
        };
    };
    let trend = rf_trend_to_critical(rows, config, lookback_days);

    let t_limit = config.t_acid_out_limit_c;
    let rf_design = config.rf_design_x1e4();
    let rf_crit = config.rf_critical_x1e4();

    let temp_s = unit_clamp(stats.t_out_p95.map(|t| (t - 0.95 * t_limit) / (0.05 * t_limit)));
    let foul_s = unit_clamp(
        stats
            .rf_p95
            .map(|rf| (rf - 1.2 * rf_design) / (rf_crit - 1.2 * rf_design + 1e-9)),
    );
    let crit_s = unit_clamp(stats.crit_mean.map(|c| (c - 30.0) / 50.0));
    let trend_s = unit_clamp(trend.days_to_critical.map(|d| (30.0 - d) / 30.0));

    let score = (0.35 * temp_s + 0.35 * foul_s + 0.20 * crit_s + 0.10 * trend_s).clamp(0.0, 1.0);

    let notes = vec![
        format!(
            "T_p95: {}°C / limit {:.0}°C",
            fmt_opt(stats.t_out_p95, 1, "N/A"),
            t_limit
        ),
        format!("Rf_p95: {}×10⁻⁴", fmt_opt(stats.rf_p95, 2, "N/A")),
        format!("Criticality: {}/100", fmt_opt(stats.crit_mean, 0, "N/A")),
        format!(
            "Days to critical: {}",
            fmt_opt(trend.days_to_critical, 0, "N/A")
        ),
    ];

    RuleScore {
        score,
        temp_s,
        foul_s,
        crit_s,
        trend_s,
        trend,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at_hour, design};
    use cw_results::{CriticalityFields, Sample, ThermalFields};

    fn rows(rf: impl Fn(i64) -> Option<f64>, n: i64, t_out: f64, crit: f64) -> Vec<AugmentedSample> {
        (0..n)
            .map(|h| AugmentedSample {
                sample: Sample {
                    timestamp: at_hour(h),
                    acid_out_c: Some(t_out),
                    ..Sample::default()
                },
                operating: true,
                thermal: ThermalFields {
                    rf_x1e4: rf(h),
                    ..ThermalFields::default()
                },
                crit: CriticalityFields {
                    criticality: Some(crit),
                    ..CriticalityFields::default()
                },
                ..AugmentedSample::default()
            })
            .collect()
    }

    #[test]
    fn trend_states() {
        let cfg = design();
        let few = rows(|_| Some(1.0), 10, 50.0, 10.0);
        let refs: Vec<&AugmentedSample> = few.iter().collect();
        assert_eq!(rf_trend_to_critical(&refs, &cfg, 30).state, TrendState::FewPoints);

        let flat = rows(|_| Some(1.0), 48, 50.0, 10.0);
        let refs: Vec<&AugmentedSample> = flat.iter().collect();
        let t = rf_trend_to_critical(&refs, &cfg, 30);
        assert_eq!(t.state, TrendState::Stable);
        assert_eq!(t.days_to_critical, None);

        let none = rows(|_| None, 48, 50.0, 10.0);
        let refs: Vec<&AugmentedSample> = none.iter().collect();
        assert_eq!(rf_trend_to_critical(&refs, &cfg, 30).state, TrendState::NoData);

        let rising = rows(|h| Some(1.0 + 0.01 * h as f64), 48, 50.0, 10.0);
        let refs: Vec<&AugmentedSample> = rising.iter().collect();
        let t = rf_trend_to_critical(&refs, &cfg, 30);
        assert_eq!(t.state, TrendState::Worsening);
        let expected = (cfg.rf_critical_x1e4() - 1.47) / 0.01 / 24.0;
        assert!((t.days_to_critical.unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn lookback_drops_old_points() {
        let cfg = design();
        // Rising long ago, flat over the last 30 days.
        let data = rows(|h| Some(if h < 24 * 40 { h as f64 * 0.01 } else { 2.0 }), 24 * 71, 50.0, 10.0);
        let refs: Vec<&AugmentedSample> = data.iter().collect();
        assert_eq!(rf_trend_to_critical(&refs, &cfg, 30).state, TrendState::Stable);
    }

    #[test]
    fn quiet_unit_scores_zero() {
        let cfg = design();
        let data = rows(|_| Some(0.5), 48, 50.0, 20.0);
        let refs: Vec<&AugmentedSample> = data.iter().collect();
        let r = rule_score(&refs, &cfg, 30);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.notes.len(), 4);
        assert_eq!(r.notes[3], "Days to critical: N/A");
    }

    #[test]
    fn hot_fouled_unit_saturates() {
        let cfg = design();
        let data = rows(|_| Some(cfg.rf_critical_x1e4() + 1.0), 48, 61.0, 85.0);
        let refs: Vec<&AugmentedSample> = data.iter().collect();
        let r = rule_score(&refs, &cfg, 30);
        assert_eq!(r.temp_s, 1.0);
        assert_eq!(r.foul_s, 1.0);
        assert_eq!(r.crit_s, 1.0);
        assert_eq!(r.trend_s, 0.0);
        assert!((r.score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn empty_window_scores_zero() {
        let r = rule_score(&[], &design(), 30);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.notes, vec!["No data.".to_string()]);
    }
}
