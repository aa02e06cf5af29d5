//! Report and series queries over analysed units.

use chrono::NaiveDateTime;
use cw_analysis::interpret::{self, Interpretation};
use cw_analysis::{
    FleetRow, UnitAnalysis, WashHistory, WashTrigger, WindowKind, WindowStats, fleet_comparison,
    global_window_days, requires_wash,
};
use cw_project::PlantConfig;
use cw_results::AugmentedSample;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Per-unit report over the unit's analysis window.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub window_start: Option<NaiveDateTime>,
    pub window_kind: Option<WindowKind>,
    pub samples: usize,
    pub operating_samples: usize,
    pub stats: Option<WindowStats>,
    pub thermal: Interpretation,
    pub fouling: Interpretation,
    pub criticality: Interpretation,
    pub washes: WashHistory,
    pub trigger: WashTrigger,
}

pub fn unit_report(config: &PlantConfig, analysis: &UnitAnalysis) -> UnitReport {
    let params = &config.analysis;
    let window = analysis.analysis_window(params.fallback_window_days);
    let rows = analysis.operating_since(window.map(|(start, _)| start));
    let stats = WindowStats::compute(&rows, &analysis.config);

    UnitReport {
        unit: analysis.unit.clone(),
        window_start: window.map(|(start, _)| start),
        window_kind: window.map(|(_, kind)| kind),
        samples: analysis.rows.len(),
        operating_samples: rows.len(),
        thermal: interpret::thermal(stats.as_ref(), &analysis.config),
        fouling: interpret::fouling(stats.as_ref(), &analysis.config),
        criticality: interpret::criticality(stats.as_ref()),
        stats,
        washes: wash_history(analysis),
        trigger: requires_wash(&rows, &analysis.config, params.trend_lookback_days),
    }
}

pub fn wash_history(analysis: &UnitAnalysis) -> WashHistory {
    WashHistory::from_times(&analysis.wash_times)
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub window_days: u32,
    pub rows: Vec<FleetRow>,
}

/// Side-by-side wash check of every unit over a common window.
pub fn fleet_report(config: &PlantConfig, analyses: &[&UnitAnalysis]) -> FleetReport {
    let params = &config.analysis;
    let window_days = global_window_days(analyses, params.fallback_window_days);
    FleetReport {
        window_days,
        rows: fleet_comparison(analyses, window_days, params.trend_lookback_days),
    }
}

/// Names accepted by [`extract_series`].
pub const SERIES_VARIABLES: [&str; 12] = [
    "t_acid_out",
    "t_acid_in",
    "water_flow",
    "q_used",
    "lmtd",
    "u",
    "rf_x1e4",
    "eff_u_pct",
    "criticality",
    "days_since_wash",
    "rf_ma",
    "rf_days_to_crit",
];

fn variable(row: &AugmentedSample, name: &str) -> Option<Option<f64>> {
    let v = match name {
        "t_acid_out" => row.sample.acid_out_c,
        "t_acid_in" => row.sample.acid_in_c,
        "water_flow" => row.sample.water_flow_m3h,
        "q_used" => row.thermal.q_used_w,
        "lmtd" => row.thermal.lmtd_k,
        "u" => row.thermal.u_w_m2k,
        "rf_x1e4" => row.thermal.rf_x1e4,
        "eff_u_pct" => row.thermal.eff_u_pct,
        "criticality" => row.crit.criticality,
        "days_since_wash" => row.days_since_wash,
        "rf_ma" => row.trend.rf_ma,
        "rf_days_to_crit" => row.trend.rf_days_to_crit,
        _ => return None,
    };
    Some(v)
}

/// Time series of one variable; missing values are left out.
pub fn extract_series(
    analysis: &UnitAnalysis,
    name: &str,
    operating_only: bool,
) -> AppResult<Vec<(NaiveDateTime, f64)>> {
    if !SERIES_VARIABLES.contains(&name) {
        return Err(AppError::InvalidInput(format!(
            "Unknown series variable: {name} (expected one of {})",
            SERIES_VARIABLES.join(", ")
        )));
    }
    Ok(analysis
        .rows
        .iter()
        .filter(|r| r.operating || !operating_only)
        .filter_map(|r| Some((r.timestamp(), variable(r, name)??)))
        .collect())
}
