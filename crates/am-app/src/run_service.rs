//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use am_project::schema::Project;
use am_results::{DayResults, MissionSummary, RunManifest, RunResults, RunStore};

use crate::compile;
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service;

/// Options for running missions.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Mission days to fly; batteries age between days.
    pub days: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: "0.1.0".to_string(),
            days: 1,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

/// Concise timing summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub total_evaluations: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    event: RunProgressEvent,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let elapsed = || started.elapsed().as_secs_f64();

    if request.options.days == 0 {
        return Err(AppError::InvalidInput(
            "a run needs at least one mission day".to_string(),
        ));
    }

    emit_progress(
        &mut progress_cb,
        RunProgressEvent::stage(
            RunStage::LoadingProject,
            elapsed(),
            Some("Loading project".to_string()),
        ),
    );
    let project = project_service::load_project(request.project_path)?;

    emit_progress(
        &mut progress_cb,
        RunProgressEvent::stage(
            RunStage::CheckingCache,
            elapsed(),
            Some("Checking run cache".to_string()),
        ),
    );
    let run_id = am_results::compute_run_id(
        &project,
        request.options.days,
        &request.options.solver_version,
    );
    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunProgressEvent::stage(
                RunStage::LoadingCachedResult,
                elapsed(),
                Some("Loading cached run".to_string()),
            ),
        );
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        let timing = RunTimingSummary {
            load_cache_time_s: load_started.elapsed().as_secs_f64(),
            total_time_s: elapsed(),
            ..RunTimingSummary::default()
        };
        emit_progress(
            &mut progress_cb,
            RunProgressEvent::stage(
                RunStage::Completed,
                elapsed(),
                Some("Loaded cached run".to_string()),
            ),
        );
        tracing::info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let mut timing = RunTimingSummary::default();
    let results = execute_run(&project, request.options.days, &mut timing, &mut progress_cb, &elapsed)?;

    let missions = results
        .days
        .iter()
        .flat_map(|d| {
            d.missions
                .iter()
                .map(move |m| MissionSummary::from_results(d.day, m))
        })
        .collect();
    let manifest = RunManifest::new(
        run_id.clone(),
        &project.name,
        &request.options.solver_version,
        request.options.days,
        missions,
    );

    emit_progress(
        &mut progress_cb,
        RunProgressEvent::stage(
            RunStage::SavingResults,
            elapsed(),
            Some("Saving run".to_string()),
        ),
    );
    let save_started = Instant::now();
    store.save_run(&manifest, &results)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = elapsed();

    emit_progress(
        &mut progress_cb,
        RunProgressEvent::stage(RunStage::Completed, elapsed(), Some("Run complete".to_string())),
    );
    tracing::info!(
        run_id = %run_id,
        all_converged = manifest.all_converged(),
        evaluations = timing.total_evaluations,
        total_time_s = timing.total_time_s,
        "run complete"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// Fly every mission once per day. Missions are recompiled each day so
/// every day starts from the (aged) vehicle rather than yesterday's states.
fn execute_run(
    project: &Project,
    days: u32,
    timing: &mut RunTimingSummary,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    elapsed: &dyn Fn() -> f64,
) -> AppResult<RunResults> {
    emit_progress(
        progress_cb,
        RunProgressEvent::stage(
            RunStage::Compiling,
            elapsed(),
            Some("Compiling vehicle".to_string()),
        ),
    );
    let compile_started = Instant::now();
    let mut vehicle = compile::compile_vehicle(&project.vehicle)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    let solve_started = Instant::now();
    let mut results = RunResults::default();
    for day in 1..=days {
        let mut flown = Vec::with_capacity(project.missions.len());
        for def in &project.missions {
            emit_progress(
                progress_cb,
                RunProgressEvent {
                    stage: RunStage::FlyingMission,
                    elapsed_wall_s: elapsed(),
                    day: Some(day),
                    mission: Some(def.tag.clone()),
                    message: None,
                },
            );
            let mut mission = compile::compile_mission(def, &project.solver)?;
            let mission_results = mission.evaluate(&vehicle)?;
            timing.total_evaluations += mission_results.total_evaluations();
            flown.push(mission_results);
        }

        if day < days {
            emit_progress(
                progress_cb,
                RunProgressEvent {
                    stage: RunStage::AgingBatteries,
                    elapsed_wall_s: elapsed(),
                    day: Some(day),
                    mission: None,
                    message: None,
                },
            );
            for (i, mission_results) in flown.iter().enumerate() {
                vehicle.update_battery_age(mission_results, i == 0)?;
            }
        }
        results.days.push(DayResults {
            day,
            missions: flown,
        });
    }
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    Ok(results)
}

pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(&project.name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)); // Most recent first
    Ok(runs)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<(RunManifest, RunResults)> {
    let store = RunStore::for_project(project_path)?;

    let manifest = store.load_manifest(run_id)?;
    let results = store.load_results(run_id)?;

    Ok((manifest, results))
}
