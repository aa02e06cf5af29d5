//! Error types for the cw-app service layer.

use std::path::PathBuf;

/// Unified error for CLI and other frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("Unit has no analysis: {0}")]
    UnitFailed(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<cw_project::ProjectError> for AppError {
    fn from(err: cw_project::ProjectError) -> Self {
        match err {
            cw_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<cw_project::ValidationError> for AppError {
    fn from(err: cw_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<cw_results::ResultsError> for AppError {
    fn from(err: cw_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<cw_analysis::AnalysisError> for AppError {
    fn from(err: cw_analysis::AnalysisError) -> Self {
        AppError::Analysis(err.to_string())
    }
}
