#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use cw_fluids::{WATER_CP_J_KGK, WATER_RHO_KG_M3, lmtd_counter_current};
use cw_project::{PlantConfig, UnitDef, load_yaml};
use cw_results::Sample;
use std::path::PathBuf;

pub fn cap3() -> PlantConfig {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // go to crates
    path.pop(); // go to repo root
    path.push("configs");
    path.push("cap3.yaml");
    load_yaml(&path).unwrap()
}

pub fn ts_unit() -> UnitDef {
    cap3().unit("TS").unwrap().clone()
}

pub fn at_hour(hour: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(hour)
}

/// Operating sample of `unit` whose overall coefficient comes out as `u`.
pub fn sample_with_u(unit: &UnitDef, hour: i64, u: f64) -> Sample {
    let (ai, ao, wi, wo) = (75.0, 55.0, 32.0, 49.0);
    let lmtd = lmtd_counter_current(ai, ao, wi, wo).unwrap();
    let duty = u * lmtd * unit.design.area_m2;
    let flow_m3h = duty / (WATER_CP_J_KGK * (wo - wi)) / WATER_RHO_KG_M3 * 3600.0;
    Sample {
        timestamp: at_hour(hour),
        water_flow_m3h: Some(flow_m3h),
        water_in_c: Some(wi),
        water_out_c: Some(wo),
        acid_in_c: Some(ai),
        acid_out_c: Some(ao),
        acid_conc_pct: Some(96.0),
        bypass_pct: Some(10.0),
        pump_current_a: Some(120.0),
        blower_speed_pct: Some(80.0),
        conductivity: None,
    }
}
