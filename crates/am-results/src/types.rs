//! Result data types.

use am_mission::{MissionResults, SegmentStatus};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    pub timestamp: String,
    pub solver_version: String,
    /// Mission days flown, aging the batteries in between.
    pub days: u32,
    pub missions: Vec<MissionSummary>,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        project_name: impl Into<String>,
        solver_version: impl Into<String>,
        days: u32,
        missions: Vec<MissionSummary>,
    ) -> Self {
        Self {
            run_id,
            project_name: project_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            days,
            missions,
        }
    }

    pub fn all_converged(&self) -> bool {
        self.missions.iter().all(|m| m.all_converged)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSummary {
    pub tag: String,
    pub day: u32,
    pub all_converged: bool,
    pub total_evaluations: usize,
    pub segments: Vec<SegmentSummary>,
}

impl MissionSummary {
    pub fn from_results(day: u32, results: &MissionResults) -> Self {
        Self {
            tag: results.tag.clone(),
            day,
            all_converged: results.all_converged(),
            total_evaluations: results.total_evaluations(),
            segments: results
                .segments
                .iter()
                .map(|s| SegmentSummary {
                    tag: s.tag.clone(),
                    status: s.status,
                    converged: s.converged,
                    evaluations: s.evaluations,
                    residual_norm: s.residual_norm,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub tag: String,
    pub status: SegmentStatus,
    pub converged: bool,
    pub evaluations: usize,
    #[serde(with = "am_state::nonfinite::scalar")]
    pub residual_norm: f64,
}

/// Full per-point results of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub days: Vec<DayResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResults {
    pub day: u32,
    pub missions: Vec<MissionResults>,
}

impl RunResults {
    pub fn last_day(&self) -> Option<&DayResults> {
        self.days.last()
    }

    pub fn day(&self, day: u32) -> Option<&DayResults> {
        self.days.iter().find(|d| d.day == day)
    }
}

impl DayResults {
    pub fn mission(&self, tag: &str) -> Option<&MissionResults> {
        self.missions.iter().find(|m| m.tag == tag)
    }
}
