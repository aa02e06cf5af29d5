//! The per-unit pipeline.

use crate::criticality::{CriticalityInputs, score_criticality};
use crate::error::{AnalysisError, AnalysisResult};
use crate::filter::{OperatingFilter, classify};
use crate::thermal::thermal_fields;
use crate::trend::{TrendInput, TrendWindow, trend_features};
use crate::wash::{days_since_wash, wash_in_last_30d};
use crate::window::WindowKind;
use chrono::{Duration, NaiveDateTime};
use cw_project::{AnalysisParams, UnitConfig, UnitDef};
use cw_results::{AugmentedSample, UnitSeries};

/// Augmented history of one unit plus what later stages need alongside it.
#[derive(Debug, Clone)]
pub struct UnitAnalysis {
    pub unit: String,
    pub config: UnitConfig,
    pub rows: Vec<AugmentedSample>,
    /// Sorted wash times of this unit.
    pub wash_times: Vec<NaiveDateTime>,
}

/// Run filter, thermal model, wash features, criticality and trend features.
///
/// Fails only when the unit has no samples.
pub fn analyze_unit(
    series: &UnitSeries,
    unit: &UnitDef,
    wash_times: &[NaiveDateTime],
    params: &AnalysisParams,
) -> AnalysisResult<UnitAnalysis> {
    if series.samples.is_empty() {
        return Err(AnalysisError::NoData {
            unit: unit.key.clone(),
        });
    }

    let config = unit.design;
    let filter = OperatingFilter::from_params(params, series.blower_feed);
    let mut wash_times = wash_times.to_vec();
    wash_times.sort();

    let mut samples = series.samples.clone();
    samples.sort_by_key(|s| s.timestamp);

    let mut rows: Vec<AugmentedSample> = samples
        .into_iter()
        .map(|sample| {
            let operating = classify(&sample, &config, &filter);
            if !operating {
                return AugmentedSample {
                    sample,
                    ..AugmentedSample::default()
                };
            }
            let thermal = thermal_fields(&sample, &config);
            let days = days_since_wash(sample.timestamp, &wash_times);
            let crit = score_criticality(
                &CriticalityInputs {
                    t_acid_out_c: sample.acid_out_c,
                    rf_x1e4: thermal.rf_x1e4,
                    eff_u_pct: thermal.eff_u_pct,
                    days_since_wash: days,
                },
                &config,
            );
            AugmentedSample {
                sample,
                operating: true,
                thermal,
                days_since_wash: days,
                wash_in_last_30d: Some(wash_in_last_30d(days)),
                crit,
                ..AugmentedSample::default()
            }
        })
        .collect();

    let op_idx: Vec<usize> = (0..rows.len()).filter(|&i| rows[i].operating).collect();
    let inputs: Vec<TrendInput> = op_idx
        .iter()
        .map(|&i| TrendInput {
            t_acid_out_c: rows[i].sample.acid_out_c,
            rf_x1e4: rows[i].thermal.rf_x1e4,
            u_w_m2k: rows[i].thermal.u_w_m2k,
        })
        .collect();
    let trends = trend_features(
        &inputs,
        &config,
        TrendWindow::from_days(params.rolling_window_days),
    );
    for (&i, trend) in op_idx.iter().zip(trends) {
        rows[i].trend = trend;
    }

    tracing::debug!(
        unit = %unit.key,
        samples = rows.len(),
        operating = op_idx.len(),
        washes = wash_times.len(),
        "unit analyzed"
    );

    Ok(UnitAnalysis {
        unit: unit.key.clone(),
        config,
        rows,
        wash_times,
    })
}

impl UnitAnalysis {
    pub fn operating(&self) -> Vec<&AugmentedSample> {
        self.rows.iter().filter(|r| r.operating).collect()
    }

    pub fn operating_count(&self) -> usize {
        self.rows.iter().filter(|r| r.operating).count()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|r| r.timestamp())
    }

    pub fn last_operating(&self) -> Option<&AugmentedSample> {
        self.rows.iter().rev().find(|r| r.operating)
    }

    pub fn last_wash(&self) -> Option<NaiveDateTime> {
        self.wash_times.last().copied()
    }

    /// Start of the analysis window: the last wash, else the last `fallback_days` of data.
    pub fn analysis_window(&self, fallback_days: u32) -> Option<(NaiveDateTime, WindowKind)> {
        if let Some(wash) = self.last_wash() {
            return Some((wash, WindowKind::SinceLastWash));
        }
        let end = self.last_timestamp()?;
        Some((
            end - Duration::days(i64::from(fallback_days)),
            WindowKind::LastDays(fallback_days),
        ))
    }

    /// Operating rows at or after `start`; every operating row when `start` is `None`.
    pub fn operating_since(&self, start: Option<NaiveDateTime>) -> Vec<&AugmentedSample> {
        self.rows
            .iter()
            .filter(|r| r.operating && start.is_none_or(|s| r.timestamp() >= s))
            .collect()
    }

    /// Operating rows within the last `days` before the latest sample.
    pub fn operating_last_days(&self, days: u32) -> Vec<&AugmentedSample> {
        let start = self
            .last_timestamp()
            .map(|end| end - Duration::days(i64::from(days)));
        self.operating_since(start)
    }

    /// Operating rows of the analysis window.
    pub fn window_rows(&self, fallback_days: u32) -> Vec<&AugmentedSample> {
        self.operating_since(self.analysis_window(fallback_days).map(|(s, _)| s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at_hour, operating_sample, unit_def};
    use cw_results::{CriticalityLevel, ThermalFields, TrendFields};

    fn series(n: i64) -> UnitSeries {
        UnitSeries::from_samples("TS", (0..n).map(operating_sample).collect())
    }

    #[test]
    fn empty_stream_is_fatal_for_the_unit() {
        let empty = UnitSeries::from_samples("TS", vec![]);
        let err = analyze_unit(&empty, &unit_def(), &[], &AnalysisParams::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NoData { unit } if unit == "TS"));
    }

    #[test]
    fn derived_fields_only_on_operating_rows() {
        let mut s = series(60);
        s.samples[10].water_in_c = Some(5.0);
        s.samples[20].acid_in_c = None;
        let a = analyze_unit(&s, &unit_def(), &[], &AnalysisParams::default()).unwrap();

        for idx in [10, 20] {
            let row = &a.rows[idx];
            assert!(!row.operating);
            assert_eq!(row.thermal, ThermalFields::default());
            assert_eq!(row.crit.criticality, None);
            assert_eq!(row.crit.level, CriticalityLevel::NotAvailable);
            assert_eq!(row.trend, TrendFields::default());
            assert_eq!(row.days_since_wash, None);
            assert_eq!(row.wash_in_last_30d, None);
        }
        let ok = &a.rows[30];
        assert!(ok.operating);
        assert!(ok.thermal.rf_x1e4.is_some());
        // No wash history: neutral wash sub-score.
        assert_eq!(ok.crit.crit_wash, Some(0.5));
        assert_eq!(a.operating_count(), 58);
    }

    #[test]
    fn windows_follow_wash_history() {
        let s = series(24 * 40);
        let washes = [at_hour(24 * 20)];
        let a = analyze_unit(&s, &unit_def(), &washes, &AnalysisParams::default()).unwrap();
        let (start, kind) = a.analysis_window(30).unwrap();
        assert_eq!(start, at_hour(24 * 20));
        assert_eq!(kind, WindowKind::SinceLastWash);
        assert_eq!(a.window_rows(30).len(), 24 * 20);
        assert_eq!(a.last_operating().unwrap().days_since_wash, Some((24.0 * 20.0 - 1.0) / 24.0));

        let a = analyze_unit(&s, &unit_def(), &[], &AnalysisParams::default()).unwrap();
        let (start, kind) = a.analysis_window(30).unwrap();
        assert_eq!(kind, WindowKind::LastDays(30));
        assert_eq!(start, at_hour(24 * 40 - 1 - 24 * 30));
        assert_eq!(a.operating_last_days(1).len(), 25);
    }
}
