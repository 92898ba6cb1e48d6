use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use am_mission::{MissionResults, SegmentResult, SegmentStatus};
use am_results::*;
use am_state::Conditions;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn mission() -> MissionResults {
    let mut conditions = Conditions::new();
    conditions
        .set_values("frames.inertial.time", &[0.0, 0.1 + 0.2, 12.5])
        .unwrap();
    MissionResults {
        tag: "survey".to_string(),
        segments: vec![SegmentResult {
            tag: "cruise".to_string(),
            status: SegmentStatus::Converged,
            converged: true,
            evaluations: 40,
            residual_norm: 3.2e-9,
            conditions,
        }],
    }
}

#[test]
fn save_list_load_roundtrip() {
    let project_dir = unique_temp_dir("am_results_project");
    fs::create_dir_all(&project_dir).expect("failed to create temp project dir");
    let project_path = project_dir.join("project.yaml");
    fs::write(&project_path, "version: 1\n").expect("failed to write project file");

    let store = RunStore::for_project(&project_path).expect("failed to create run store");
    let results = RunResults {
        days: vec![DayResults {
            day: 1,
            missions: vec![mission()],
        }],
    };
    let manifest = RunManifest {
        run_id: "run-123".to_string(),
        project_name: "uav".to_string(),
        timestamp: "2026-02-26T00:00:00Z".to_string(),
        solver_version: "0.1.0".to_string(),
        days: 1,
        missions: vec![MissionSummary::from_results(1, &mission())],
    };

    store.save_run(&manifest, &results).expect("failed to save run");
    assert!(store.has_run("run-123"));

    let runs = store.list_runs("uav").expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert!(runs[0].all_converged());
    assert!(store.list_runs("other").unwrap().is_empty());

    let loaded = store.load_results("run-123").expect("failed to load results");
    assert_eq!(loaded, results);
    let time = loaded
        .last_day()
        .and_then(|d| d.mission("survey"))
        .unwrap()
        .deep_get("cruise.frames.inertial.time")
        .unwrap()
        .values();
    assert_eq!(time[1], 0.1 + 0.2);

    store.delete_run("run-123").unwrap();
    assert!(!store.has_run("run-123"));
    assert!(matches!(
        store.load_manifest("run-123"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn failed_segment_with_non_finite_values_reloads() {
    let project_dir = unique_temp_dir("am_results_failed");
    fs::create_dir_all(&project_dir).unwrap();
    let project_path = project_dir.join("project.yaml");
    let store = RunStore::for_project(&project_path).unwrap();

    let mut failed = mission();
    let segment = &mut failed.segments[0];
    segment.status = SegmentStatus::Failed;
    segment.converged = false;
    segment.residual_norm = f64::INFINITY;
    segment
        .conditions
        .set_values("aerodynamics.lift_force", &[1.0, f64::NAN, 3.0])
        .unwrap();

    let results = RunResults {
        days: vec![DayResults {
            day: 1,
            missions: vec![failed.clone()],
        }],
    };
    let manifest = RunManifest::new(
        "run-failed".to_string(),
        "uav",
        "0.1.0",
        1,
        vec![MissionSummary::from_results(1, &failed)],
    );
    store.save_run(&manifest, &results).unwrap();

    let manifest = store.load_manifest("run-failed").unwrap();
    assert!(!manifest.all_converged());
    assert!(manifest.missions[0].segments[0].residual_norm.is_nan());

    let loaded = store.load_results("run-failed").unwrap();
    let lift = loaded.days[0].missions[0]
        .deep_get("cruise.aerodynamics.lift_force")
        .unwrap()
        .values();
    assert_eq!(lift[0], 1.0);
    assert!(lift[1].is_nan());

    let _ = fs::remove_dir_all(&project_dir);
}
