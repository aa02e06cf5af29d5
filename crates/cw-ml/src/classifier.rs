//! The classifier seam.

use crate::MlResult;
use nalgebra::DMatrix;

/// A binary classifier over dense feature rows.
///
/// Labels are `0` / `1`; `predict_proba` returns P(y = 1) per row.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &DMatrix<f64>, y: &[u8]) -> MlResult<()>;

    fn predict_proba(&self, x: &DMatrix<f64>) -> MlResult<Vec<f64>>;

    /// Per-feature importance, unnormalised; `None` before fitting.
    fn feature_importances(&self) -> Option<Vec<f64>>;
}
