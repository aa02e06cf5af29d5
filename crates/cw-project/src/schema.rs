//! Plant configuration schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantConfig {
    pub version: u32,
    pub name: String,
    /// Shared blower-speed tag; when absent the blower condition is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blower_tag: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    #[serde(default)]
    pub analysis: AnalysisParams,
    #[serde(default)]
    pub training: TrainingParams,
}

impl PlantConfig {
    pub fn unit(&self, key: &str) -> Option<&UnitDef> {
        self.units.iter().find(|u| u.key == key)
    }

    /// Resolve a free-form cooler name from the wash log to a unit key.
    pub fn resolve_unit_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.units
            .iter()
            .find(|u| u.key == name || u.wash_aliases.iter().any(|a| a.trim() == name))
            .map(|u| u.key.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDef {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    /// Names the wash log may use for this unit.
    #[serde(default)]
    pub wash_aliases: Vec<String>,
    pub tags: TagMap,
    pub design: UnitConfig,
}

impl UnitDef {
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.key
        } else {
            &self.short_name
        }
    }
}

/// Instrument tags feeding one unit's samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagMap {
    pub water_flow: String,
    pub water_in: String,
    pub water_out: String,
    pub acid_in: String,
    pub acid_out: String,
    pub acid_conc: String,
    pub bypass: String,
    pub pump_current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductivity: Option<String>,
}

/// Static design parameters of one cooler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnitConfig {
    pub area_m2: f64,
    pub u_clean_w_m2k: f64,
    pub q_design_w: f64,
    pub acid_conc_design_pct: f64,
    pub t_acid_in_design_c: f64,
    pub t_acid_out_design_c: f64,
    pub t_acid_out_limit_c: f64,
    pub t_water_in_design_c: f64,
    pub t_water_out_design_c: f64,
    pub lmtd_design_k: f64,
    pub fouling_design_m2k_w: f64,
    pub acid_flow_design_m3h: f64,
    pub water_flow_design_m3h: f64,
    pub t_acid_in_min_c: f64,
    pub t_acid_in_max_c: f64,
    pub t_acid_out_min_c: f64,
    pub t_acid_out_max_c: f64,
}

/// Critical fouling level as a multiple of the design fouling factor.
pub const CRITICAL_FOULING_FACTOR: f64 = 5.0;

impl UnitConfig {
    /// Design fouling factor scaled ×10⁴.
    pub fn rf_design_x1e4(&self) -> f64 {
        self.fouling_design_m2k_w * 1e4
    }

    /// Critical fouling level scaled ×10⁴.
    pub fn rf_critical_x1e4(&self) -> f64 {
        self.rf_design_x1e4() * CRITICAL_FOULING_FACTOR
    }
}

/// Run-time parameters of the analysis pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisParams {
    pub min_blower_pct: f64,
    pub min_water_flow_pct: f64,
    pub rolling_window_days: u32,
    pub horizon_days: u32,
    pub fallback_window_days: u32,
    pub trend_lookback_days: u32,
    pub label_policy: LabelPolicy,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            min_blower_pct: 50.0,
            min_water_flow_pct: 30.0,
            rolling_window_days: 7,
            horizon_days: 30,
            fallback_window_days: 30,
            trend_lookback_days: 30,
            label_policy: LabelPolicy::default(),
        }
    }
}

/// How samples of a unit without any wash history are labelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// No history means "never required": every label is 0.
    #[default]
    NoHistoryIsNegative,
    /// No history means labels are unknown; the unit is not trainable.
    NoHistoryIsUnknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingParams {
    pub min_rows: usize,
    pub min_positives: usize,
    pub min_negatives: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub model_choice: ModelChoice,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            min_rows: 300,
            min_positives: 10,
            min_negatives: 10,
            test_fraction: 0.25,
            seed: 42,
            model_choice: ModelChoice::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    #[default]
    Auto,
    Logistic,
    GradientBoosting,
    RandomForest,
}

impl std::str::FromStr for ModelChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "logistic" | "model1" | "1" => Ok(Self::Logistic),
            "gradient_boosting" | "gb" | "model2" | "2" => Ok(Self::GradientBoosting),
            "random_forest" | "rf" | "model3" | "3" => Ok(Self::RandomForest),
            other => Err(format!("unknown model choice '{other}'")),
        }
    }
}
