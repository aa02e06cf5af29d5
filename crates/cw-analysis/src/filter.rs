//! Operating-point filter.

use cw_project::{AnalysisParams, UnitConfig};
use cw_results::Sample;

/// Water inlet temperatures outside this band mean instrument or utility trouble.
const WATER_IN_RANGE_C: (f64, f64) = (15.0, 50.0);

/// Minimum acid cooling across the unit [K].
const MIN_ACID_DROP_K: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingFilter {
    pub min_blower_pct: f64,
    pub min_water_flow_pct: f64,
    /// When false the blower condition is skipped.
    pub blower_feed: bool,
}

impl OperatingFilter {
    pub fn from_params(params: &AnalysisParams, blower_feed: bool) -> Self {
        Self {
            min_blower_pct: params.min_blower_pct,
            min_water_flow_pct: params.min_water_flow_pct,
            blower_feed,
        }
    }
}

fn within(v: Option<f64>, lo: f64, hi: f64) -> bool {
    v.is_some_and(|x| x >= lo && x <= hi)
}

fn at_least(v: Option<f64>, lo: f64) -> bool {
    v.is_some_and(|x| x >= lo)
}

/// True when the sample represents normal, steady operation.
///
/// Any missing or non-finite input fails its condition.
pub fn classify(sample: &Sample, config: &UnitConfig, filter: &OperatingFilter) -> bool {
    let acid_drop = match (sample.acid_in_c, sample.acid_out_c) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    };
    let water_rise = match (sample.water_in_c, sample.water_out_c) {
        (Some(a), Some(b)) => Some(b - a),
        _ => None,
    };

    let mut ok = within(sample.acid_in_c, config.t_acid_in_min_c, config.t_acid_in_max_c)
        && within(sample.acid_out_c, config.t_acid_out_min_c, config.t_acid_out_max_c)
        && at_least(
            sample.water_flow_m3h,
            config.water_flow_design_m3h * filter.min_water_flow_pct / 100.0,
        )
        && acid_drop.is_some_and(|d| d > MIN_ACID_DROP_K)
        && within(sample.water_in_c, WATER_IN_RANGE_C.0, WATER_IN_RANGE_C.1)
        && water_rise.is_some_and(|d| d > 0.0);

    if filter.blower_feed {
        ok = ok && at_least(sample.blower_speed_pct, filter.min_blower_pct);
    }
    ok
}
