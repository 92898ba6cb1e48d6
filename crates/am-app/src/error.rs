//! Error types for the am-app service layer.

use std::path::PathBuf;

/// Unified error for CLI front-ends over all backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Mission not found: {0}")]
    MissionNotFound(String),

    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("Mission error: {0}")]
    Mission(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for am-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<am_project::ProjectError> for AppError {
    fn from(err: am_project::ProjectError) -> Self {
        match err {
            am_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<am_project::ValidationError> for AppError {
    fn from(err: am_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<am_mission::MissionError> for AppError {
    fn from(err: am_mission::MissionError) -> Self {
        if err.is_config() {
            AppError::Compile(err.to_string())
        } else {
            AppError::Mission(err.to_string())
        }
    }
}

impl From<am_results::ResultsError> for AppError {
    fn from(err: am_results::ResultsError) -> Self {
        match err {
            am_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

macro_rules! compile_error_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AppError {
            fn from(err: $ty) -> Self {
                AppError::Compile(err.to_string())
            }
        })*
    };
}

compile_error_from!(
    am_network::NetworkError,
    am_energy::EnergyError,
    am_propulsion::PropulsionError,
    am_state::StateError
);
