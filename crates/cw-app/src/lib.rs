//! Shared service layer for coolwatch frontends.
//!
//! Loads plant configurations, runs the per-unit analysis over an ingested
//! data file (with run caching), and answers report, prediction and series
//! queries against the result.

pub mod error;
pub mod predict_service;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use error::{AppError, AppResult};
pub use predict_service::{predict, predict_all};
pub use project_service::{UnitSummary, get_unit, list_units, load_config, validate_config};
pub use query::{
    FleetReport, SERIES_VARIABLES, UnitReport, extract_series, fleet_report, unit_report,
    wash_history,
};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, UnitOutcome, analyze_plant, ensure_run, list_runs,
};
