//! Wash prediction: feature matrix, training preconditions, model selection,
//! rule score and fusion.

use crate::error::AnalysisResult;
use crate::labeler::label_rows;
use crate::pipeline::UnitAnalysis;
use crate::rule::{RuleScore, rule_score};
use cw_ml::{CandidateScore, DMatrix, ModelKind, train_and_select};
use cw_project::{AnalysisParams, ModelChoice, TrainingParams};
use cw_results::AugmentedSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate features, in matrix column order.
pub const ML_FEATURES: [&str; 14] = [
    "T_out_ma",
    "T_out_p95",
    "Rf_ma",
    "Rf_slope",
    "Rf_days_to_crit",
    "U_ma",
    "Q_used_W",
    "LMTD_K",
    "dT_acid",
    "F_w",
    "eff_U_pct",
    "Rf_x1e4",
    "T_a_out",
    "days_since_wash",
];

/// Upper clamp of the days-since-wash feature.
pub const MAX_DAYS_SINCE_WASH_FEATURE: f64 = 365.0;

/// Weight of the classifier probability in the fused result.
pub const ML_WEIGHT: f64 = 0.6;

pub const TOP_IMPORTANCES: usize = 12;

fn feature_row(r: &AugmentedSample) -> [Option<f64>; 14] {
    [
        r.trend.t_out_ma,
        r.trend.t_out_p95,
        r.trend.rf_ma,
        r.trend.rf_slope,
        r.trend.rf_days_to_crit,
        r.trend.u_ma,
        r.thermal.q_used_w,
        r.thermal.lmtd_k,
        r.thermal.dt_acid_k,
        r.sample.water_flow_m3h,
        r.thermal.eff_u_pct,
        r.thermal.rf_x1e4,
        r.sample.acid_out_c,
        r.days_since_wash
            .map(|d| d.clamp(0.0, MAX_DAYS_SINCE_WASH_FEATURE)),
    ]
    .map(|v| v.filter(|x| x.is_finite()))
}

/// Values of the selected columns, or `None` when any of them is missing.
fn complete(r: &AugmentedSample, columns: &[usize]) -> Option<Vec<f64>> {
    let all = feature_row(r);
    columns.iter().map(|&j| all[j]).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Trainability {
    Trainable,
    NotTrainable { reason: String },
}

impl Trainability {
    pub fn is_trainable(&self) -> bool {
        matches!(self, Trainability::Trainable)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Trainability::Trainable => None,
            Trainability::NotTrainable { reason } => Some(reason),
        }
    }

    fn not(reason: impl Into<String>) -> Self {
        Trainability::NotTrainable {
            reason: reason.into(),
        }
    }
}

/// Preconditions for training, checked in order: data, both classes,
/// per-class counts, total rows.
pub fn check_trainable(y: &[u8], params: &TrainingParams) -> Trainability {
    if y.is_empty() {
        return Trainability::not("No data.");
    }
    let pos = y.iter().filter(|&&v| v == 1).count();
    let neg = y.len() - pos;
    if pos == 0 || neg == 0 {
        let class = u8::from(pos > 0);
        return Trainability::not(format!("Only one class: [{class}]."));
    }
    if pos < params.min_positives || neg < params.min_negatives {
        return Trainability::not(format!("Insufficient counts (pos={pos}, neg={neg})."));
    }
    if y.len() < params.min_rows {
        return Trainability::not(format!("Insufficient rows ({}).", y.len()));
    }
    Trainability::Trainable
}

/// Fixed bands over the fused probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashDecision {
    NoWashNeeded,
    Monitor,
    WashRequired,
}

impl WashDecision {
    pub fn from_probability(p: f64) -> Self {
        if p < 0.3 {
            WashDecision::NoWashNeeded
        } else if p < 0.7 {
            WashDecision::Monitor
        } else {
            WashDecision::WashRequired
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WashDecision::NoWashNeeded => "no wash needed",
            WashDecision::Monitor => "intermediate/monitor",
            WashDecision::WashRequired => "wash required",
        }
    }
}

impl fmt::Display for WashDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Blend classifier and rule score; the rule score alone when no classifier
/// probability is available.
pub fn fuse(ml: Option<f64>, rule: f64) -> f64 {
    match ml {
        Some(p) => ML_WEIGHT * p + (1.0 - ML_WEIGHT) * rule,
        None => rule,
    }
}

fn model_kind(choice: ModelChoice) -> Option<ModelKind> {
    match choice {
        ModelChoice::Auto => None,
        ModelChoice::Logistic => Some(ModelKind::Logistic),
        ModelChoice::GradientBoosting => Some(ModelKind::GradientBoosting),
        ModelChoice::RandomForest => Some(ModelKind::RandomForest),
    }
}

/// Top `n` importances, normalised to sum to one.
pub fn top_importances(names: &[&str], importances: &[f64], n: usize) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = names
        .iter()
        .zip(importances)
        .map(|(name, &v)| (name.to_string(), v))
        .collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.truncate(n);
    let total: f64 = pairs.iter().map(|(_, v)| v).sum();
    if total > 0.0 {
        for (_, v) in &mut pairs {
            *v /= total;
        }
    }
    pairs
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub unit: String,
    pub trainability: Trainability,
    /// Columns used for training.
    pub features: Vec<String>,
    pub rows: usize,
    pub positives: usize,
    pub negatives: usize,
    /// Held-out scores of every fitted candidate.
    pub candidates: Vec<CandidateScore>,
    pub selected: Option<ModelKind>,
    pub ml_probability: Option<f64>,
    pub rule: RuleScore,
    pub probability: f64,
    pub decision: WashDecision,
    pub importances: Vec<(String, f64)>,
}

/// Train on the unit's full operating history and score its latest state.
///
/// The rule score covers the analysis window; classifiers see every
/// operating row.
pub fn predict_unit(
    analysis: &UnitAnalysis,
    params: &AnalysisParams,
    training: &TrainingParams,
) -> AnalysisResult<Prediction> {
    let window = analysis.window_rows(params.fallback_window_days);
    let rule = rule_score(&window, &analysis.config, params.trend_lookback_days);

    let history = analysis.operating();
    let columns: Vec<usize> = (0..ML_FEATURES.len())
        .filter(|&j| history.iter().any(|r| feature_row(r)[j].is_some()))
        .collect();
    let features: Vec<String> = columns.iter().map(|&j| ML_FEATURES[j].to_string()).collect();

    let times: Vec<_> = history.iter().map(|r| r.timestamp()).collect();
    let labels = label_rows(
        &times,
        &analysis.wash_times,
        params.horizon_days,
        params.label_policy,
    );

    let mut data: Vec<f64> = Vec::new();
    let mut y: Vec<u8> = Vec::new();
    if let Some(labels) = &labels {
        for (r, &label) in history.iter().zip(labels) {
            if let Some(values) = complete(r, &columns) {
                data.extend(values);
                y.push(label);
            }
        }
    }
    let positives = y.iter().filter(|&&v| v == 1).count();
    let negatives = y.len() - positives;

    let trainability = match labels {
        None => Trainability::not("No wash history."),
        Some(_) if columns.is_empty() => Trainability::not("No data."),
        Some(_) => check_trainable(&y, training),
    };
    tracing::debug!(
        unit = %analysis.unit,
        rows = y.len(),
        positives,
        negatives,
        trainable = trainability.is_trainable(),
        "training set prepared"
    );

    let mut candidates = Vec::new();
    let mut selected = None;
    let mut ml_probability = None;
    let mut importances = Vec::new();

    if trainability.is_trainable() {
        let x = DMatrix::from_row_slice(y.len(), columns.len(), &data);
        let selection = train_and_select(
            &x,
            &y,
            training.test_fraction,
            training.seed,
            model_kind(training.model_choice),
        )?;

        let latest = history.iter().rev().find_map(|r| complete(r, &columns));
        if let Some(values) = latest {
            let row = DMatrix::from_row_slice(1, columns.len(), &values);
            ml_probability = selection.model.predict_proba(&row)?.first().copied();
        }
        let names: Vec<&str> = columns.iter().map(|&j| ML_FEATURES[j]).collect();
        if let Some(imp) = selection.model.feature_importances() {
            importances = top_importances(&names, &imp, TOP_IMPORTANCES);
        }
        selected = Some(selection.model.kind);
        candidates = selection.scores;
    } else if let Some(reason) = trainability.reason() {
        tracing::info!(unit = %analysis.unit, reason, "classifier not trained");
    }

    let probability = fuse(ml_probability, rule.score).clamp(0.0, 1.0);
    Ok(Prediction {
        unit: analysis.unit.clone(),
        trainability,
        features,
        rows: y.len(),
        positives,
        negatives,
        candidates,
        selected,
        ml_probability,
        rule,
        probability,
        decision: WashDecision::from_probability(probability),
        importances,
    })
}
