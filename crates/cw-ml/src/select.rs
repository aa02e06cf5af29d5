//! Candidate pool, fitting and model selection.

use crate::classifier::Classifier;
use crate::metrics::{average_precision, roc_auc};
use crate::scaler::Scaler;
use crate::split::stratified_split;
use crate::{GradientBoosting, LogisticRegression, MlError, MlResult, RandomForest};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Logistic,
    GradientBoosting,
    RandomForest,
}

impl ModelKind {
    /// Candidate pool, in tie-breaking order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Logistic,
        ModelKind::GradientBoosting,
        ModelKind::RandomForest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Logistic => "LogisticRegression",
            Self::GradientBoosting => "GradientBoosting",
            Self::RandomForest => "RandomForest",
        }
    }

    fn scaler_for(&self, x: &DMatrix<f64>) -> Scaler {
        match self {
            Self::Logistic => Scaler::fit_robust(x),
            Self::GradientBoosting => Scaler::fit_standard(x),
            Self::RandomForest => Scaler::Identity,
        }
    }

    fn classifier(&self, seed: u64) -> Box<dyn Classifier> {
        match self {
            Self::Logistic => Box::new(LogisticRegression::default()),
            Self::GradientBoosting => Box::new(GradientBoosting::new(seed)),
            Self::RandomForest => Box::new(RandomForest::new(seed)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classifier together with the scaler fitted on its training rows.
pub struct FittedModel {
    pub kind: ModelKind,
    scaler: Scaler,
    model: Box<dyn Classifier>,
}

impl std::fmt::Debug for FittedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FittedModel")
            .field("kind", &self.kind)
            .field("scaler", &self.scaler)
            .finish_non_exhaustive()
    }
}

impl FittedModel {
    pub fn fit(kind: ModelKind, x: &DMatrix<f64>, y: &[u8], seed: u64) -> MlResult<Self> {
        let scaler = kind.scaler_for(x);
        let mut model = kind.classifier(seed);
        model.fit(&scaler.transform(x), y)?;
        Ok(Self {
            kind,
            scaler,
            model,
        })
    }

    pub fn predict_proba(&self, x: &DMatrix<f64>) -> MlResult<Vec<f64>> {
        self.model.predict_proba(&self.scaler.transform(x))
    }

    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        self.model.feature_importances()
    }
}

/// Held-out scores of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub kind: ModelKind,
    pub pr_auc: Option<f64>,
    pub roc_auc: Option<f64>,
}

#[derive(Debug)]
pub struct Selection {
    pub model: FittedModel,
    /// Every fitted candidate, in pool order.
    pub scores: Vec<CandidateScore>,
}

impl Selection {
    pub fn chosen_score(&self) -> Option<&CandidateScore> {
        self.scores.iter().find(|s| s.kind == self.model.kind)
    }

    /// Candidates by descending PR-AUC, missing last.
    pub fn ranked(&self) -> Vec<CandidateScore> {
        let mut out = self.scores.clone();
        out.sort_by(|a, b| {
            let ka = a.pr_auc.unwrap_or(f64::NEG_INFINITY);
            let kb = b.pr_auc.unwrap_or(f64::NEG_INFINITY);
            kb.total_cmp(&ka)
        });
        out
    }
}

fn rows(x: &DMatrix<f64>, idx: &[usize]) -> DMatrix<f64> {
    x.select_rows(idx.iter())
}

/// Split, fit every candidate on the training part, score on the held-out part.
///
/// With `choice = None` the candidate with the highest PR-AUC wins, ties going
/// to the earlier candidate. An explicit choice wins whenever it fitted.
pub fn train_and_select(
    x: &DMatrix<f64>,
    y: &[u8],
    test_fraction: f64,
    seed: u64,
    choice: Option<ModelKind>,
) -> MlResult<Selection> {
    if y.len() != x.nrows() {
        return Err(MlError::ShapeMismatch {
            what: "labels",
            expected: x.nrows(),
            got: y.len(),
        });
    }
    let (train_idx, test_idx) = stratified_split(y, test_fraction, seed);
    let x_train = rows(x, &train_idx);
    let x_test = rows(x, &test_idx);
    let y_train: Vec<u8> = train_idx.iter().map(|&i| y[i]).collect();
    let y_test: Vec<u8> = test_idx.iter().map(|&i| y[i]).collect();

    let mut fitted: Vec<(FittedModel, CandidateScore)> = Vec::new();
    for kind in ModelKind::ALL {
        let model = match FittedModel::fit(kind, &x_train, &y_train, seed) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(model = %kind, error = %e, "candidate failed to fit");
                continue;
            }
        };
        let proba = model.predict_proba(&x_test)?;
        let score = CandidateScore {
            kind,
            pr_auc: average_precision(&y_test, &proba),
            roc_auc: roc_auc(&y_test, &proba),
        };
        tracing::debug!(model = %kind, pr_auc = ?score.pr_auc, roc_auc = ?score.roc_auc, "candidate scored");
        fitted.push((model, score));
    }

    if fitted.is_empty() {
        return Err(MlError::NoCandidate);
    }

    let explicit = choice.and_then(|k| fitted.iter().position(|(m, _)| m.kind == k));
    if let (Some(k), None) = (choice, explicit) {
        tracing::warn!(model = %k, "requested model unavailable; selecting automatically");
    }
    let chosen = explicit.unwrap_or_else(|| best_by_pr_auc(fitted.iter().map(|(_, s)| s)));

    let scores: Vec<CandidateScore> = fitted.iter().map(|(_, s)| *s).collect();
    let (model, _) = fitted.swap_remove(chosen);
    tracing::info!(model = %model.kind, "model selected");
    Ok(Selection { model, scores })
}

/// Index of the highest PR-AUC; the first one wins a tie.
fn best_by_pr_auc<'a>(scores: impl Iterator<Item = &'a CandidateScore>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, s) in scores.enumerate() {
        let v = s.pr_auc.unwrap_or(f64::NEG_INFINITY);
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
