//! Error types for the hx-app service layer.

use std::path::PathBuf;

/// Unified error for every frontend over the report pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read input file: {path}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Load(#[from] hx_input::LoadError),

    #[error(transparent)]
    Pipeline(#[from] hx_pipeline::PipelineError),

    #[error(transparent)]
    Report(#[from] hx_report::ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hx-app operations.
pub type AppResult<T> = Result<T, AppError>;
