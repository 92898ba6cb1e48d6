#![allow(dead_code)]

use am_atmosphere::UsStandard1976;
use am_core::units::{kg, m2};
use am_energy::{BatteryPack, Cell, EnergyStore, FuelTank, ThermalModel};
use am_mission::{DragPolar, Vehicle};
use am_network::NetworkBuilder;
use am_propulsion::rotor::RotorGeometry;
use am_propulsion::{
    Airfoil, CycleParameters, DesignPoint, ElectricRotor, EngineRotor, Esc, GasTurbine, Motor,
    Propulsor, ReciprocatingEngine, Rotor,
};
use std::sync::Arc;

pub fn jet() -> Vehicle {
    jet_with_identical(true)
}

/// Twin-engine jet; `identical` toggles the shared-evaluation shortcut.
pub fn jet_with_identical(identical: bool) -> Vehicle {
    let mut b = NetworkBuilder::new();
    let line = b.add_fuel_line("fuel_line", identical);
    b.add_fuel_tank("main_tank", line);
    b.add_propulsor("left_engine", line, "main");
    b.add_propulsor("right_engine", line, "main");
    let network = b.build().unwrap();

    let design = DesignPoint {
        altitude: 10_000.0,
        mach: 0.7,
        thrust: 4_500.0,
    };
    let engine =
        GasTurbine::size(CycleParameters::default(), design, 0.0, &UsStandard1976::new()).unwrap();
    let polar = DragPolar {
        cl0: 0.2,
        cl_alpha: 5.0,
        cl_max: 1.4,
        cd0: 0.022,
        induced_factor: 0.045,
    };
    Vehicle::new(
        "business_jet",
        kg(8000.0),
        m2(25.0),
        network,
        vec![
            Propulsor::GasTurbine(engine.clone()),
            Propulsor::GasTurbine(engine),
        ],
        vec![EnergyStore::FuelTank(FuelTank::new(kg(1500.0), 1.0).unwrap())],
        Arc::new(polar),
    )
    .unwrap()
}

pub fn electric_uav() -> Vehicle {
    let mut b = NetworkBuilder::new();
    let bus = b.add_bus("bus", true);
    b.set_auxiliary_power(bus, 20.0);
    b.add_battery("pack", bus);
    b.add_propulsor("left_rotor", bus, "lift");
    b.add_propulsor("right_rotor", bus, "lift");
    let network = b.build().unwrap();

    let rotor = Rotor::helical(
        RotorGeometry {
            tip_radius: 0.25,
            hub_radius: 0.025,
            number_of_blades: 2,
            station_count: 16,
        },
        0.03,
        0.429,
        Airfoil::default(),
        600.0,
    )
    .unwrap();
    let unit = ElectricRotor::new(
        Esc::new(0.95).unwrap(),
        Motor::direct_drive(30.0, 0.02, 0.5),
        rotor,
        0.0,
    )
    .unwrap();
    let pack =
        BatteryPack::new(Cell::nmc_18650(), 6, 10, None, ThermalModel::Isothermal).unwrap();
    let polar = DragPolar {
        cl0: 0.3,
        cl_alpha: 5.5,
        cl_max: 1.4,
        cd0: 0.03,
        induced_factor: 0.05,
    };
    Vehicle::new(
        "uav",
        kg(25.0),
        m2(1.0),
        network,
        vec![
            Propulsor::ElectricRotor(unit.clone()),
            Propulsor::ElectricRotor(unit),
        ],
        vec![EnergyStore::Battery(pack)],
        Arc::new(polar),
    )
    .unwrap()
}

pub fn piston() -> Vehicle {
    let mut b = NetworkBuilder::new();
    let line = b.add_fuel_line("fuel_line", false);
    b.add_fuel_tank("main_tank", line);
    b.add_propulsor("engine", line, "main");
    let network = b.build().unwrap();

    let rotor = Rotor::helical(
        RotorGeometry {
            tip_radius: 0.95,
            hub_radius: 0.1,
            number_of_blades: 2,
            station_count: 20,
        },
        0.12,
        1.5,
        Airfoil::default(),
        250.0,
    )
    .unwrap();
    let engine = ReciprocatingEngine {
        rated_power: 150.0e3,
        rated_speed: 280.0,
        brake_specific_fuel_consumption: 8.0e-8,
    };
    let unit = EngineRotor::new(engine, rotor, 1.0, 0.0).unwrap();
    let polar = DragPolar {
        cl0: 0.3,
        cl_alpha: 5.5,
        cl_max: 1.5,
        cd0: 0.027,
        induced_factor: 0.045,
    };
    Vehicle::new(
        "trainer",
        kg(1100.0),
        m2(16.0),
        network,
        vec![Propulsor::EngineRotor(unit)],
        vec![EnergyStore::FuelTank(FuelTank::new(kg(100.0), 1.0).unwrap())],
        Arc::new(polar),
    )
    .unwrap()
}
