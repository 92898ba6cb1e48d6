use am_mission::SegmentKind;
use am_project::schema::*;
use am_project::{ValidationError, validate_project};
use proptest::prelude::*;
use std::path::Path;

fn demo() -> Project {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/uav_survey.yaml");
    am_project::load_yaml(&path).unwrap()
}

#[test]
fn duplicate_vehicle_tags_rejected() {
    let mut project = demo();
    project.vehicle.distributors[0].propulsors[1].tag = "left_rotor".to_string();
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::DuplicateTag { .. })
    ));
}

#[test]
fn fuel_tank_on_bus_rejected() {
    let mut project = demo();
    project.vehicle.distributors[0].sources.push(SourceDef::FuelTank {
        tag: "tank".to_string(),
        fuel_mass_kg: 1.0,
        fuel_selector_ratio: 1.0,
    });
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::Topology { .. })
    ));
}

#[test]
fn unknown_throttle_group_rejected() {
    let mut project = demo();
    project.missions[0].segments[0].throttle_groups = vec!["cargo".to_string()];
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn duplicate_segment_rejected() {
    let mut project = demo();
    let first = project.missions[0].segments[0].clone();
    project.missions[0].segments.push(first);
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::DuplicateTag { .. })
    ));
}

#[test]
fn climb_rate_in_wrong_direction_rejected() {
    let mut project = demo();
    project.missions[0].segments[0].kind = SegmentKind::ClimbConstantRate {
        altitude_start: Some(300.0),
        altitude_end: 100.0,
        air_speed: 25.0,
        climb_rate: 2.0,
    };
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn future_version_rejected() {
    let mut project = demo();
    project.version = am_project::LATEST_VERSION + 1;
    assert!(matches!(
        validate_project(&project),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}

proptest! {
    #[test]
    fn non_positive_mass_always_rejected(mass in -1.0e4f64..=0.0) {
        let mut project = demo();
        project.vehicle.mass_takeoff_kg = mass;
        prop_assert!(validate_project(&project).is_err());
    }

    #[test]
    fn too_few_control_points_rejected(n in 0usize..2) {
        let mut project = demo();
        project.missions[0].segments[1].control_points = n;
        prop_assert!(validate_project(&project).is_err());
    }
}
