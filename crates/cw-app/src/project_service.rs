//! Plant configuration loading, validation and introspection.

use crate::error::{AppError, AppResult};
use cw_project::{PlantConfig, UnitDef};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub key: String,
    pub name: String,
    pub area_m2: f64,
    pub u_clean_w_m2k: f64,
    pub t_limit_c: f64,
    pub rf_design_x1e4: f64,
    pub wash_aliases: Vec<String>,
}

/// Load and validate a plant configuration (YAML, or JSON by extension).
pub fn load_config(path: &Path) -> AppResult<PlantConfig> {
    if !path.exists() {
        return Err(AppError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(cw_project::load(path)?)
}

pub fn validate_config(config: &PlantConfig) -> AppResult<()> {
    cw_project::validate_config(config)?;
    Ok(())
}

pub fn list_units(config: &PlantConfig) -> Vec<UnitSummary> {
    config
        .units
        .iter()
        .map(|u| UnitSummary {
            key: u.key.clone(),
            name: u.name.clone(),
            area_m2: u.design.area_m2,
            u_clean_w_m2k: u.design.u_clean_w_m2k,
            t_limit_c: u.design.t_acid_out_limit_c,
            rf_design_x1e4: u.design.rf_design_x1e4(),
            wash_aliases: u.wash_aliases.clone(),
        })
        .collect()
}

pub fn get_unit<'a>(config: &'a PlantConfig, key: &str) -> AppResult<&'a UnitDef> {
    config
        .unit(key)
        .ok_or_else(|| AppError::UnitNotFound(key.to_string()))
}
