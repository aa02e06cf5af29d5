//! Analysis runs with per-unit failure isolation and a content-addressed cache.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use cw_analysis::{UnitAnalysis, analyze_unit, wash_times_for};
use cw_project::PlantConfig;
use cw_results::{
    RunManifest, RunStore, UnitSeries, WashEvent, WashLog, explode_wide_records,
    read_wide_records,
};

use crate::error::{AppError, AppResult};
use crate::project_service;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct RunRequest<'a> {
    pub config_path: &'a Path,
    /// JSON-lines wide records.
    pub data_path: &'a Path,
    pub wash_log_path: Option<&'a Path>,
    pub options: RunOptions,
}

/// Result of analysing one unit.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    Analyzed(UnitAnalysis),
    Failed { unit: String, reason: String },
}

impl UnitOutcome {
    pub fn unit(&self) -> &str {
        match self {
            UnitOutcome::Analyzed(a) => &a.unit,
            UnitOutcome::Failed { unit, .. } => unit,
        }
    }

    pub fn analysis(&self) -> Option<&UnitAnalysis> {
        match self {
            UnitOutcome::Analyzed(a) => Some(a),
            UnitOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub config: PlantConfig,
    pub events: Vec<WashEvent>,
    pub outcomes: Vec<UnitOutcome>,
    pub loaded_from_cache: bool,
    /// Input lines that could not be read as records.
    pub skipped_records: usize,
    pub elapsed_s: f64,
}

impl RunResponse {
    /// Successfully analysed units, in configuration order.
    pub fn analyses(&self) -> Vec<&UnitAnalysis> {
        self.outcomes.iter().filter_map(UnitOutcome::analysis).collect()
    }

    pub fn analysis(&self, unit: &str) -> AppResult<&UnitAnalysis> {
        let outcome = self
            .outcomes
            .iter()
            .find(|o| o.unit() == unit)
            .ok_or_else(|| AppError::UnitNotFound(unit.to_string()))?;
        match outcome {
            UnitOutcome::Analyzed(a) => Ok(a),
            UnitOutcome::Failed { reason, .. } => {
                Err(AppError::UnitFailed(format!("{unit}: {reason}")))
            }
        }
    }
}

/// Run the pipeline for every configured unit.
///
/// A unit without samples becomes `UnitOutcome::Failed`; the other units
/// still run.
pub fn analyze_plant(
    config: &PlantConfig,
    series: &BTreeMap<String, UnitSeries>,
    events: &[WashEvent],
) -> Vec<UnitOutcome> {
    config
        .units
        .iter()
        .map(|unit| {
            let empty = UnitSeries {
                unit: unit.key.clone(),
                ..UnitSeries::default()
            };
            let unit_series = series.get(&unit.key).unwrap_or(&empty);
            let washes = wash_times_for(events, &unit.key);
            match analyze_unit(unit_series, unit, &washes, &config.analysis) {
                Ok(analysis) => UnitOutcome::Analyzed(analysis),
                Err(e) => {
                    tracing::warn!(unit = %unit.key, error = %e, "unit analysis failed");
                    UnitOutcome::Failed {
                        unit: unit.key.clone(),
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

fn read_bytes(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Analyse the data file, or load the stored run for identical inputs.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();

    let config = project_service::load_config(request.config_path)?;
    let data = read_bytes(request.data_path)?;
    let wash_bytes = match request.wash_log_path {
        Some(p) if p.exists() => read_bytes(p)?,
        _ => Vec::new(),
    };
    let events = match request.wash_log_path {
        Some(p) => WashLog::new(p).load(&config)?,
        None => Vec::new(),
    };

    let run_id = cw_results::compute_run_id(
        &config,
        &[&data, &wash_bytes],
        &request.options.engine_version,
    );
    let store = RunStore::for_config(request.config_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let manifest = store.load_manifest(&run_id)?;
        let outcomes = load_outcomes(&store, &manifest, &config, &events)?;
        tracing::info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            config,
            events,
            outcomes,
            loaded_from_cache: true,
            skipped_records: 0,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    let read = read_wide_records(BufReader::new(data.as_slice()))?;
    let series = explode_wide_records(&read.records, &config);
    let outcomes = analyze_plant(&config, &series, &events);

    let manifest = RunManifest {
        run_id: run_id.clone(),
        plant_name: config.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        engine_version: request.options.engine_version.clone(),
        units: outcomes
            .iter()
            .filter_map(|o| o.analysis().map(|a| a.unit.clone()))
            .collect(),
        failed_units: outcomes
            .iter()
            .filter(|o| o.analysis().is_none())
            .map(|o| o.unit().to_string())
            .collect(),
    };
    store.save_run(
        &manifest,
        outcomes
            .iter()
            .filter_map(UnitOutcome::analysis)
            .map(|a| (a.unit.as_str(), a.rows.as_slice())),
    )?;
    tracing::info!(
        run_id = %run_id,
        analyzed = manifest.units.len(),
        failed = manifest.failed_units.len(),
        "run completed"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        config,
        events,
        outcomes,
        loaded_from_cache: false,
        skipped_records: read.skipped,
        elapsed_s: started.elapsed().as_secs_f64(),
    })
}

/// Rebuild outcomes from stored rows; configuration and washes are the
/// inputs the run id was computed from.
fn load_outcomes(
    store: &RunStore,
    manifest: &RunManifest,
    config: &PlantConfig,
    events: &[WashEvent],
) -> AppResult<Vec<UnitOutcome>> {
    let mut outcomes = Vec::new();
    for unit in &config.units {
        if manifest.units.contains(&unit.key) {
            let rows = store.load_unit(&manifest.run_id, &unit.key)?;
            outcomes.push(UnitOutcome::Analyzed(UnitAnalysis {
                unit: unit.key.clone(),
                config: unit.design,
                rows,
                wash_times: wash_times_for(events, &unit.key),
            }));
        } else {
            outcomes.push(UnitOutcome::Failed {
                unit: unit.key.clone(),
                reason: cw_analysis::AnalysisError::NoData {
                    unit: unit.key.clone(),
                }
                .to_string(),
            });
        }
    }
    Ok(outcomes)
}

/// Stored runs for the configuration's plant, oldest first.
pub fn list_runs(config_path: &Path) -> AppResult<Vec<RunManifest>> {
    let config = project_service::load_config(config_path)?;
    let store = RunStore::for_config(config_path)?;
    Ok(store.list_runs(&config.name)?)
}
