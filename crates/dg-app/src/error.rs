//! Error types for the dg-app service layer.

use std::path::PathBuf;

/// Application error shared by the scheduler, the report worker and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("Failed to write report: {path}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Simulation actor is no longer running")]
    ActorStopped,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dg-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<dg_config::ConfigError> for AppError {
    fn from(err: dg_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<dg_sim::SimError> for AppError {
    fn from(err: dg_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Report {
            message: err.to_string(),
        }
    }
}
