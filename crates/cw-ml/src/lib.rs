//! cw-ml: binary classifiers for wash prediction.
//!
//! Contains:
//! - classifier (the `Classifier` trait every model implements)
//! - scaler (robust and standard feature scaling)
//! - logistic, boosting, forest (the three candidate models)
//! - metrics (average precision, ROC-AUC)
//! - split (stratified train/test split)
//! - select (candidate pool, fitting and model selection)

pub mod boosting;
pub mod classifier;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod scaler;
pub mod select;
pub mod split;
mod tree;

pub use boosting::GradientBoosting;
pub use classifier::Classifier;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use metrics::{average_precision, roc_auc};
pub use scaler::Scaler;
pub use select::{CandidateScore, FittedModel, ModelKind, Selection, train_and_select};
pub use split::stratified_split;

pub use nalgebra::DMatrix;

pub type MlResult<T> = Result<T, MlError>;

#[derive(thiserror::Error, Debug)]
pub enum MlError {
    #[error("Empty training set")]
    EmptyTrainingSet,

    #[error("Shape mismatch: {what} (expected {expected}, got {got})")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Training set needs both classes")]
    SingleClass,

    #[error("Model not fitted: {model}")]
    NotFitted { model: &'static str },

    #[error("Solver failed: {what}")]
    Solver { what: &'static str },

    #[error("No candidate model could be fitted")]
    NoCandidate,
}

/// Fail unless `y` has one label per row of `x` and contains both classes.
pub(crate) fn check_training_set(x: &DMatrix<f64>, y: &[u8]) -> MlResult<()> {
    if x.nrows() == 0 {
        return Err(MlError::EmptyTrainingSet);
    }
    if y.len() != x.nrows() {
        return Err(MlError::ShapeMismatch {
            what: "labels",
            expected: x.nrows(),
            got: y.len(),
        });
    }
    let positives = y.iter().filter(|&&v| v == 1).count();
    if positives == 0 || positives == y.len() {
        return Err(MlError::SingleClass);
    }
    Ok(())
}

/// Balanced class weights: `n / (2 * n_class)`, given per-row multiplicities.
pub(crate) fn balanced_weights(y: &[u8], counts: &[f64]) -> Vec<f64> {
    let (mut pos, mut neg) = (0.0, 0.0);
    for (label, c) in y.iter().zip(counts) {
        if *label == 1 {
            pos += c;
        } else {
            neg += c;
        }
    }
    let total = pos + neg;
    let w_pos = if pos > 0.0 { total / (2.0 * pos) } else { 0.0 };
    let w_neg = if neg > 0.0 { total / (2.0 * neg) } else { 0.0 };
    y.iter()
        .zip(counts)
        .map(|(label, c)| c * if *label == 1 { w_pos } else { w_neg })
        .collect()
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
