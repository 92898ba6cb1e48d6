//! Content-based hashing for run IDs.

use am_project::Project;
use sha2::{Digest, Sha256};

pub fn compute_run_id(project: &Project, days: u32, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());
    hasher.update(days.to_le_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_project::schema::*;

    fn project(name: &str) -> Project {
        Project {
            version: 1,
            name: name.to_string(),
            vehicle: VehicleDef {
                tag: "v".to_string(),
                mass_takeoff_kg: 10.0,
                reference_area_m2: 1.0,
                aerodynamics: AerodynamicsDef::DragPolar {
                    cl0: 0.2,
                    cl_alpha: 5.0,
                    cl_max: 1.3,
                    cd0: 0.03,
                    induced_factor: 0.05,
                },
                distributors: vec![],
            },
            missions: vec![],
            solver: Default::default(),
        }
    }

    #[test]
    fn hash_stability() {
        let p = project("a");
        assert_eq!(compute_run_id(&p, 1, "v1"), compute_run_id(&p, 1, "v1"));
        assert_eq!(compute_run_id(&p, 1, "v1").len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = project("a");
        let b = project("b");
        assert_ne!(compute_run_id(&a, 1, "v1"), compute_run_id(&b, 1, "v1"));
        assert_ne!(compute_run_id(&a, 1, "v1"), compute_run_id(&a, 2, "v1"));
        assert_ne!(compute_run_id(&a, 1, "v1"), compute_run_id(&a, 1, "v2"));
    }
}
