use std::path::Path;

#[test]
fn demos_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    for name in ["uav_survey.yaml", "jet_ferry.yaml"] {
        let path = root.join(name);
        let project =
            am_project::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        am_project::validate_project(&project)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
        assert!(!project.missions.is_empty());
    }
}

#[test]
fn anchored_rotors_are_identical() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/uav_survey.yaml");
    let project = am_project::load_yaml(&path).unwrap();
    let bus = &project.vehicle.distributors[0];
    assert_eq!(bus.propulsors[0].model, bus.propulsors[1].model);
    assert_eq!(project.missions[0].segments.len(), 3);
}
