//! Plant configuration validation.

use crate::schema::{PlantConfig, UnitDef};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration has no units")]
    NoUnits,

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_config(config: &PlantConfig) -> Result<(), ValidationError> {
    if config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.units.is_empty() {
        return Err(ValidationError::NoUnits);
    }

    let mut keys = HashSet::new();
    let mut aliases = HashSet::new();
    for unit in &config.units {
        if !keys.insert(&unit.key) {
            return Err(ValidationError::DuplicateId {
                id: unit.key.clone(),
                context: "units".to_string(),
            });
        }
        for alias in &unit.wash_aliases {
            if !aliases.insert(alias.trim()) {
                return Err(ValidationError::DuplicateId {
                    id: alias.clone(),
                    context: format!("wash aliases of unit '{}'", unit.key),
                });
            }
        }
        validate_unit(unit)?;
    }

    let a = &config.analysis;
    if !(0.0..=100.0).contains(&a.min_water_flow_pct) {
        return Err(invalid("analysis.min_water_flow_pct", a.min_water_flow_pct, "must be a percentage"));
    }
    if !(0.0..=100.0).contains(&a.min_blower_pct) {
        return Err(invalid("analysis.min_blower_pct", a.min_blower_pct, "must be a percentage"));
    }
    if a.rolling_window_days == 0 {
        return Err(invalid("analysis.rolling_window_days", 0, "must be at least one day"));
    }
    if a.horizon_days == 0 {
        return Err(invalid("analysis.horizon_days", 0, "must be at least one day"));
    }

    let t = &config.training;
    if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
        return Err(invalid("training.test_fraction", t.test_fraction, "must lie in (0, 1)"));
    }

    Ok(())
}

fn validate_unit(unit: &UnitDef) -> Result<(), ValidationError> {
    let d = &unit.design;
    let positive = [
        ("area_m2", d.area_m2),
        ("u_clean_w_m2k", d.u_clean_w_m2k),
        ("q_design_w", d.q_design_w),
        ("t_acid_out_limit_c", d.t_acid_out_limit_c),
        ("fouling_design_m2k_w", d.fouling_design_m2k_w),
        ("water_flow_design_m3h", d.water_flow_design_m3h),
        ("acid_flow_design_m3h", d.acid_flow_design_m3h),
    ];
    for (field, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(
                format!("units['{}'].design.{}", unit.key, field),
                value,
                "must be positive",
            ));
        }
    }

    let ranges = [
        ("t_acid_in", d.t_acid_in_min_c, d.t_acid_in_max_c),
        ("t_acid_out", d.t_acid_out_min_c, d.t_acid_out_max_c),
    ];
    for (field, lo, hi) in ranges {
        if !(lo < hi) {
            return Err(invalid(
                format!("units['{}'].design.{}_min/max", unit.key, field),
                format!("{lo}..{hi}"),
                "minimum must be below maximum",
            ));
        }
    }
    Ok(())
}
