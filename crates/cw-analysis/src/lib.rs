//! cw-analysis: fouling, criticality and wash-prediction pipeline.
//!
//! Stages, in order: operating-point filter, thermal model, wash features,
//! criticality, rolling trend features. On top of the augmented rows sit
//! window statistics, interpretations, the rule score, the fleet trigger and
//! the wash predictor.

pub mod criticality;
pub mod error;
pub mod filter;
pub mod interpret;
pub mod labeler;
pub mod pipeline;
pub mod predictor;
pub mod rule;
pub mod stats;
pub mod thermal;
pub mod trend;
pub mod trigger;
pub mod wash;
pub mod window;

#[cfg(test)]
pub(crate) mod fixtures;

pub use criticality::{CriticalityInputs, score_criticality};
pub use error::{AnalysisError, AnalysisResult};
pub use filter::{OperatingFilter, classify};
pub use interpret::{Interpretation, Status};
pub use labeler::label_rows;
pub use pipeline::{UnitAnalysis, analyze_unit};
pub use predictor::{
    ML_FEATURES, Prediction, Trainability, WashDecision, check_trainable, fuse, predict_unit,
};
pub use rule::{RuleScore, TrendEstimate, TrendState, rf_trend_to_critical, rule_score};
pub use stats::WindowStats;
pub use thermal::thermal_fields;
pub use trend::{TrendInput, TrendWindow, trend_features};
pub use trigger::{WashTrigger, requires_wash};
pub use wash::{WashHistory, days_since_wash, wash_times_for};
pub use window::{FleetRow, WindowKind, fleet_comparison, global_window_days};
