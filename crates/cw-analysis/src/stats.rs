//! Summary statistics over a window of operating rows.

use cw_core::numeric::checked_div;
use cw_core::stats::{last, max, mean, quantile};
use cw_core::units::{in_mw, watts};
use cw_project::UnitConfig;
use cw_results::AugmentedSample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub t_out_mean: Option<f64>,
    pub t_out_p95: Option<f64>,
    pub t_out_max: Option<f64>,
    pub t_out_last: Option<f64>,
    pub u_mean: Option<f64>,
    pub u_last: Option<f64>,
    pub u_clean: Option<f64>,
    pub u_mean_pct: Option<f64>,
    pub rf_mean: Option<f64>,
    pub rf_p95: Option<f64>,
    pub rf_last: Option<f64>,
    pub q_mean_mw: Option<f64>,
    pub q_last_mw: Option<f64>,
    pub q_design_mw: Option<f64>,
    pub q_mean_pct: Option<f64>,
    pub crit_mean: Option<f64>,
    pub crit_last: Option<f64>,
    pub days_since_wash_last: Option<f64>,
}

fn column(rows: &[&AugmentedSample], f: impl Fn(&AugmentedSample) -> Option<f64>) -> Vec<Option<f64>> {
    rows.iter().map(|r| f(r)).collect()
}

fn megawatts(w: f64) -> f64 {
    in_mw(watts(w))
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

impl WindowStats {
    /// Statistics of `rows`; `None` for an empty window.
    ///
    /// Means and percentiles skip missing values; `*_last` is the value of the
    /// final row, which may itself be missing.
    pub fn compute(rows: &[&AugmentedSample], config: &UnitConfig) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let t_out = column(rows, |r| r.sample.acid_out_c);
        let u = column(rows, |r| r.thermal.u_w_m2k);
        let rf = column(rows, |r| r.thermal.rf_x1e4);
        let q = column(rows, |r| r.thermal.q_used_w);
        let crit = column(rows, |r| r.crit.criticality);
        let days = column(rows, |r| r.days_since_wash);

        let u_mean = mean(&u);
        let u_clean = positive(config.u_clean_w_m2k);
        let q_mean_mw = mean(&q).map(megawatts);
        let q_design_mw = positive(config.q_design_w).map(megawatts);

        Some(Self {
            t_out_mean: mean(&t_out),
            t_out_p95: quantile(&t_out, 0.95),
            t_out_max: max(&t_out),
            t_out_last: last(&t_out),
            u_mean,
            u_last: last(&u),
            u_clean,
            u_mean_pct: u_mean
                .zip(u_clean)
                .and_then(|(m, c)| checked_div(m, c))
                .map(|r| 100.0 * r),
            rf_mean: mean(&rf),
            rf_p95: quantile(&rf, 0.95),
            rf_last: last(&rf),
            q_mean_mw,
            q_last_mw: last(&q).map(megawatts),
            q_design_mw,
            q_mean_pct: q_mean_mw
                .zip(q_design_mw)
                .and_then(|(m, d)| checked_div(m, d))
                .map(|r| 100.0 * r),
            crit_mean: mean(&crit),
            crit_last: last(&crit),
            days_since_wash_last: last(&days),
        })
    }

    /// Metric name and value pairs, in display order.
    pub fn named(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("T_out_mean", self.t_out_mean),
            ("T_out_p95", self.t_out_p95),
            ("T_out_max", self.t_out_max),
            ("T_out_last", self.t_out_last),
            ("U_mean", self.u_mean),
            ("U_last", self.u_last),
            ("U_clean", self.u_clean),
            ("U_mean_pct", self.u_mean_pct),
            ("Rf_mean", self.rf_mean),
            ("Rf_p95", self.rf_p95),
            ("Rf_last", self.rf_last),
            ("Q_mean_MW", self.q_mean_mw),
            ("Q_last_MW", self.q_last_mw),
            ("Q_design_MW", self.q_design_mw),
            ("Q_mean_pct", self.q_mean_pct),
            ("crit_mean", self.crit_mean),
            ("crit_last", self.crit_last),
            ("days_since_wash_last", self.days_since_wash_last),
        ]
    }
}
