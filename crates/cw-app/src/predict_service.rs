//! Wash-prediction service over analysed units.

use cw_analysis::{Prediction, predict_unit};
use cw_project::ModelChoice;

use crate::error::AppResult;
use crate::run_service::{RunResponse, UnitOutcome};

/// Predict one unit, optionally overriding the configured model choice.
pub fn predict(
    response: &RunResponse,
    unit: &str,
    model_choice: Option<ModelChoice>,
) -> AppResult<Prediction> {
    let analysis = response.analysis(unit)?;
    let mut training = response.config.training;
    if let Some(choice) = model_choice {
        training.model_choice = choice;
    }
    Ok(predict_unit(analysis, &response.config.analysis, &training)?)
}

/// Predict every analysed unit; a failure stays with its unit.
pub fn predict_all(
    response: &RunResponse,
    model_choice: Option<ModelChoice>,
) -> Vec<(String, AppResult<Prediction>)> {
    response
        .outcomes
        .iter()
        .filter_map(UnitOutcome::analysis)
        .map(|a| (a.unit.clone(), predict(response, &a.unit, model_choice)))
        .collect()
}
