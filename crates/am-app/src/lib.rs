//! Shared application service layer for aeromission.
//!
//! Loads and validates projects, compiles them into a vehicle plus
//! missions, runs them (optionally over several mission days with battery
//! aging in between), caches runs in the project's run store and
//! extracts series from stored results.

pub mod compile;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use compile::{ProjectRuntime, compile_mission, compile_project, compile_vehicle};
pub use am_results::{RunManifest, RunResults};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{MissionOverview, list_missions, load_project, save_project, validate_project};
pub use query::{RunSummary, extract_series, get_run_summary, list_paths, series_to_csv};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run,
};
