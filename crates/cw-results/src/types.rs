//! Sample and wash-event data types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One timestamped sensor reading of one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub water_flow_m3h: Option<f64>,
    pub water_in_c: Option<f64>,
    pub water_out_c: Option<f64>,
    pub acid_in_c: Option<f64>,
    pub acid_out_c: Option<f64>,
    pub acid_conc_pct: Option<f64>,
    pub bypass_pct: Option<f64>,
    pub pump_current_a: Option<f64>,
    #[serde(default)]
    pub blower_speed_pct: Option<f64>,
    #[serde(default)]
    pub conductivity: Option<f64>,
}

/// Ordered sample stream of one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnitSeries {
    pub unit: String,
    /// Whether the feed carries a blower-speed signal at all.
    pub blower_feed: bool,
    pub samples: Vec<Sample>,
}

impl UnitSeries {
    /// Build from samples; the blower feed is considered present when any sample carries it.
    pub fn from_samples(unit: impl Into<String>, mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        let blower_feed = samples.iter().any(|s| s.blower_speed_pct.is_some());
        Self {
            unit: unit.into(),
            blower_feed,
            samples,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl CriticalityLevel {
    pub fn from_index(value: Option<f64>) -> Self {
        match value {
            None => Self::NotAvailable,
            Some(v) if v.is_nan() => Self::NotAvailable,
            Some(v) if v < 30.0 => Self::Low,
            Some(v) if v < 60.0 => Self::Medium,
            Some(v) if v < 80.0 => Self::High,
            Some(_) => Self::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::NotAvailable => "N/A",
        }
    }
}

impl std::fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Thermal fields derived from one operating sample.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ThermalFields {
    pub water_mass_flow_kgps: Option<f64>,
    pub acid_cp_j_kgk: Option<f64>,
    pub acid_rho_kg_m3: Option<f64>,
    pub q_water_w: Option<f64>,
    pub dt_acid_k: Option<f64>,
    pub acid_mass_flow_kgps: Option<f64>,
    pub q_acid_w: Option<f64>,
    pub q_used_w: Option<f64>,
    pub lmtd_k: Option<f64>,
    pub ua_w_k: Option<f64>,
    pub u_w_m2k: Option<f64>,
    pub rf_m2k_w: Option<f64>,
    pub rf_x1e4: Option<f64>,
    pub eff_q_pct: Option<f64>,
    pub eff_u_pct: Option<f64>,
}

/// Criticality sub-scores and composite.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CriticalityFields {
    pub crit_temp: Option<f64>,
    pub crit_fouling: Option<f64>,
    pub crit_eff: Option<f64>,
    pub crit_wash: Option<f64>,
    pub criticality: Option<f64>,
    pub level: CriticalityLevel,
}

/// Rolling trend features over the operating subsequence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TrendFields {
    pub t_out_ma: Option<f64>,
    pub rf_ma: Option<f64>,
    pub u_ma: Option<f64>,
    pub t_out_p95: Option<f64>,
    pub rf_slope: Option<f64>,
    pub rf_days_to_crit: Option<f64>,
}

/// A sample plus everything the pipeline derives from it.
///
/// Every derived field is `None` unless `operating` is true.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AugmentedSample {
    #[serde(flatten)]
    pub sample: Sample,
    pub operating: bool,
    #[serde(flatten)]
    pub thermal: ThermalFields,
    pub days_since_wash: Option<f64>,
    pub wash_in_last_30d: Option<bool>,
    #[serde(flatten)]
    pub crit: CriticalityFields,
    #[serde(flatten)]
    pub trend: TrendFields,
}

impl AugmentedSample {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.sample.timestamp
    }
}

/// One cleaning of one unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WashEvent {
    /// Unit key, when the cooler name could be resolved.
    pub unit: Option<String>,
    pub cooler: String,
    pub timestamp: NaiveDateTime,
    pub wash_type: String,
    pub comment: String,
    pub operator: String,
}

/// Metadata describing a stored analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: String,
    pub plant_name: String,
    pub timestamp: String,
    pub engine_version: String,
    pub units: Vec<String>,
    #[serde(default)]
    pub failed_units: Vec<String>,
}
