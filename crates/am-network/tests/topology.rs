//! Integration tests for am-network.

use am_network::{DistributorKind, NetworkBuilder, NetworkError, SourceKind, TagRef};

#[test]
fn build_hybrid_network() {
    // bus: battery + 4 identical lift rotors; fuel line: 2 tanks + 1 engine
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", true);
    b.set_auxiliary_power(bus, 250.0);
    let battery = b.add_battery("battery", bus);
    let lift: Vec<_> = (0..4)
        .map(|i| b.add_propulsor(format!("lift_rotor_{i}"), bus, "lift"))
        .collect();
    let line = b.add_fuel_line("fuel_line", false);
    b.add_fuel_tank("wing_tank", line);
    b.add_fuel_tank("body_tank", line);
    let engine = b.add_propulsor("engine", line, "cruise");

    let net = b.build().unwrap();

    assert_eq!(net.distributors().len(), 2);
    assert_eq!(net.distributor(bus).unwrap().kind, DistributorKind::ElectricBus);
    assert_eq!(net.distributor(bus).unwrap().auxiliary_power, 250.0);
    assert_eq!(net.battery_of(bus), Some(battery));
    assert_eq!(net.sources_of(line).len(), 2);
    assert!(net.sources_of(line)
        .iter()
        .all(|s| net.source(*s).unwrap().kind == SourceKind::FuelTank));
    assert_eq!(net.propulsors_of(bus), lift.as_slice());
    assert_eq!(net.propulsors_of(line), &[engine]);

    // only the first lift rotor and the engine are evaluated
    assert_eq!(net.evaluated_propulsors(), vec![lift[0], engine]);
    assert_eq!(net.evaluation_leader(lift[3]), lift[0]);
    assert_eq!(net.evaluation_leader(engine), engine);

    assert_eq!(net.lookup("engine").unwrap(), TagRef::Propulsor(engine));
    assert_eq!(
        net.result_prefix("lift_rotor_2").unwrap(),
        "energy.bus.lift_rotor_2"
    );
    assert_eq!(net.result_prefix("bus").unwrap(), "energy.bus");
}

#[test]
fn identical_flag_respects_groups() {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", true);
    b.add_battery("battery", bus);
    let l0 = b.add_propulsor("l0", bus, "lift");
    let c0 = b.add_propulsor("c0", bus, "cruise");
    let l1 = b.add_propulsor("l1", bus, "lift");
    let net = b.build().unwrap();
    assert_eq!(net.evaluated_propulsors(), vec![l0, c0]);
    assert_eq!(net.evaluation_leader(l1), l0);
}

#[test]
fn duplicate_tags_rejected() {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", false);
    b.add_battery("pack", bus);
    b.add_propulsor("pack", bus, "main");
    assert!(matches!(b.build(), Err(NetworkError::DuplicateTag { .. })));
}

#[test]
fn dotted_tags_rejected() {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus.main", false);
    b.add_battery("pack", bus);
    assert!(matches!(b.build(), Err(NetworkError::InvalidTag { .. })));
}

#[test]
fn battery_on_fuel_line_rejected() {
    let mut b = NetworkBuilder::new();
    let line = b.add_fuel_line("line", false);
    b.add_battery("pack", line);
    assert!(matches!(b.build(), Err(NetworkError::KindMismatch { .. })));
}

#[test]
fn bus_needs_exactly_one_battery() {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", false);
    b.add_battery("a", bus);
    b.add_battery("b", bus);
    assert!(matches!(
        b.build(),
        Err(NetworkError::SourceCount { count: 2, .. })
    ));

    let mut b = NetworkBuilder::new();
    b.add_bus("bus", false);
    assert!(matches!(
        b.build(),
        Err(NetworkError::SourceCount { count: 0, .. })
    ));
}

#[test]
fn unknown_tag_lookup_fails() {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", false);
    b.add_battery("pack", bus);
    let net = b.build().unwrap();
    assert!(matches!(
        net.lookup("nope"),
        Err(NetworkError::TagNotFound { .. })
    ));
}
