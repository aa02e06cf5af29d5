//! Rolling trend features over the operating subsequence.

use cw_core::stats::Window;
use cw_project::UnitConfig;
use cw_results::TrendFields;

/// Slopes at or below this count as flat [Rf×10⁴ per sample].
pub const MIN_RISING_SLOPE: f64 = 1e-6;

/// Horizon cap for the days-to-critical estimate.
pub const MAX_DAYS_TO_CRITICAL: f64 = 365.0;

/// Sample-count window derived from a window length in days, assuming hourly data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow(pub Window);

impl TrendWindow {
    pub fn from_days(days: u32) -> Self {
        let size = (days as usize * 24).max(24);
        let min_periods = (size / 4).max(12);
        Self(Window::new(size, min_periods))
    }

    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn min_periods(&self) -> usize {
        self.0.min_periods
    }
}

/// Days until the smoothed fouling level reaches critical.
///
/// Zero once the level is there; missing for a flat or improving trend.
pub fn days_to_critical(rf_ma: Option<f64>, slope: Option<f64>, rf_critical: f64) -> Option<f64> {
    let ma = rf_ma?;
    if ma >= rf_critical {
        return Some(0.0);
    }
    let slope = slope.filter(|s| *s > MIN_RISING_SLOPE)?;
    Some(((rf_critical - ma) / slope / 24.0).clamp(0.0, MAX_DAYS_TO_CRITICAL))
}

/// Inputs of one operating row for the trend builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendInput {
    pub t_acid_out_c: Option<f64>,
    pub rf_x1e4: Option<f64>,
    pub u_w_m2k: Option<f64>,
}

/// Trend features for each row of a time-ordered operating subsequence.
pub fn trend_features(rows: &[TrendInput], config: &UnitConfig, window: TrendWindow) -> Vec<TrendFields> {
    let w = window.0;
    let t_out: Vec<Option<f64>> = rows.iter().map(|r| r.t_acid_out_c).collect();
    let rf: Vec<Option<f64>> = rows.iter().map(|r| r.rf_x1e4).collect();
    let u: Vec<Option<f64>> = rows.iter().map(|r| r.u_w_m2k).collect();

    let t_out_ma = w.rolling_mean(&t_out);
    let t_out_p95 = w.rolling_quantile(&t_out, 0.95);
    let rf_ma = w.rolling_mean(&rf);
    let u_ma = w.rolling_mean(&u);
    let rf_slope = w.rolling_slope(&rf);
    let rf_critical = config.rf_critical_x1e4();

    (0..rows.len())
        .map(|i| TrendFields {
            t_out_ma: t_out_ma[i],
            rf_ma: rf_ma[i],
            u_ma: u_ma[i],
            t_out_p95: t_out_p95[i],
            rf_slope: rf_slope[i],
            rf_days_to_crit: days_to_critical(rf_ma[i], rf_slope[i], rf_critical),
        })
        .collect()
}
