use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The unit has no samples at all; only this unit's run stops.
    #[error("No data for unit {unit}")]
    NoData { unit: String },

    #[error("Model error: {0}")]
    Ml(#[from] cw_ml::MlError),
}
