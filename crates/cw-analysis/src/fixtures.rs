//! Shared unit-test fixtures: a drying-tower-like cooler and samples around its design point.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use cw_fluids::{WATER_CP_J_KGK, WATER_RHO_KG_M3, lmtd_counter_current};
use cw_project::{TagMap, UnitConfig, UnitDef};
use cw_results::Sample;

pub(crate) const ACID_IN: f64 = 75.0;
pub(crate) const ACID_OUT: f64 = 55.0;
pub(crate) const WATER_IN: f64 = 32.0;
pub(crate) const WATER_OUT: f64 = 49.0;

pub(crate) fn design() -> UnitConfig {
    UnitConfig {
        area_m2: 366.87,
        u_clean_w_m2k: 1718.0,
        q_design_w: 15.39e6,
        acid_conc_design_pct: 96.0,
        t_acid_in_design_c: 75.0,
        t_acid_out_design_c: 55.0,
        t_acid_out_limit_c: 60.0,
        t_water_in_design_c: 32.0,
        t_water_out_design_c: 49.0,
        lmtd_design_k: 24.4,
        fouling_design_m2k_w: 1.43e-4,
        acid_flow_design_m3h: 966.0,
        water_flow_design_m3h: 776.0,
        t_acid_in_min_c: 50.0,
        t_acid_in_max_c: 95.0,
        t_acid_out_min_c: 40.0,
        t_acid_out_max_c: 75.0,
    }
}

pub(crate) fn unit_def() -> UnitDef {
    UnitDef {
        key: "TS".to_string(),
        name: "Drying tower cooler".to_string(),
        short_name: "Drying tower".to_string(),
        wash_aliases: vec!["Secado".to_string()],
        tags: TagMap {
            water_flow: "F".to_string(),
            water_in: "WI".to_string(),
            water_out: "WO".to_string(),
            acid_in: "AI".to_string(),
            acid_out: "AO".to_string(),
            acid_conc: "C".to_string(),
            bypass: "B".to_string(),
            pump_current: "P".to_string(),
            conductivity: None,
        },
        design: design(),
    }
}

pub(crate) fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub(crate) fn at_hour(hour: i64) -> NaiveDateTime {
    t0() + Duration::hours(hour)
}

/// Water flow [m³/h] giving overall coefficient `u` at the fixture temperatures.
pub(crate) fn flow_for_u(u: f64) -> f64 {
    let lmtd = lmtd_counter_current(ACID_IN, ACID_OUT, WATER_IN, WATER_OUT).unwrap_or(f64::NAN);
    let duty = u * lmtd * design().area_m2;
    duty / (WATER_CP_J_KGK * (WATER_OUT - WATER_IN)) / WATER_RHO_KG_M3 * 3600.0
}

pub(crate) fn sample_with_u(hour: i64, u: f64) -> Sample {
    Sample {
        timestamp: at_hour(hour),
        water_flow_m3h: Some(flow_for_u(u)),
        water_in_c: Some(WATER_IN),
        water_out_c: Some(WATER_OUT),
        acid_in_c: Some(ACID_IN),
        acid_out_c: Some(ACID_OUT),
        acid_conc_pct: Some(96.0),
        bypass_pct: Some(10.0),
        pump_current_a: Some(120.0),
        blower_speed_pct: Some(80.0),
        conductivity: None,
    }
}

/// Operating sample at 90 % of clean U.
pub(crate) fn operating_sample(hour: i64) -> Sample {
    sample_with_u(hour, 0.9 * design().u_clean_w_m2k)
}
