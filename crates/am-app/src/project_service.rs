//! Project loading, saving, validation, and introspection.

use am_project::schema::Project;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a mission for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionOverview {
    pub tag: String,
    pub segment_count: usize,
    pub segment_tags: Vec<String>,
}

/// Load and validate a project (YAML or JSON by extension).
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(am_project::load(path)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => am_project::save_json(path, project)?,
        _ => am_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Schema validation plus a full compile, so vehicle errors that only the
/// models detect (e.g. an unsizeable engine) surface here too.
pub fn validate_project(project: &Project) -> AppResult<()> {
    am_project::validate_project(project)?;
    crate::compile::compile_project(project)?;
    Ok(())
}

pub fn list_missions(project: &Project) -> Vec<MissionOverview> {
    project
        .missions
        .iter()
        .map(|m| MissionOverview {
            tag: m.tag.clone(),
            segment_count: m.segments.len(),
            segment_tags: m.segments.iter().map(|s| s.tag.clone()).collect(),
        })
        .collect()
}
