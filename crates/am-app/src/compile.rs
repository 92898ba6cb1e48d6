//! Project → runtime model compilation.
//!
//! ```text
//! VehicleDef  ──► NetworkBuilder ──► Network
//!     │                               │
//!     ├─ sources    ──► EnergyStore   ├─ slot order == arena order
//!     ├─ propulsors ──► Propulsor     ┘
//!     └─ aerodynamics ──► Arc<dyn Aerodynamics>
//! MissionDef  ──► Mission { Segment, ... }
//! ```

use am_atmosphere::{AtmosphereModel, UsStandard1976};
use am_core::units::{kg, m2};
use am_energy::{BatteryPack, Cell, EnergyStore, FuelTank, ThermalModel};
use am_mission::{Aerodynamics, DragPolar, Mission, MissionSet, Segment, TabulatedAerodynamics, Vehicle};
use am_network::NetworkBuilder;
use am_project::schema::{
    AerodynamicsDef, AirfoilDef, BladeDef, CellDef, CycleDef, DistributorKindDef, MissionDef,
    Project, PropulsorDef, PropulsorModelDef, RotorDef, SourceDef, ThermalDef, VehicleDef,
};
use am_propulsion::rotor::RotorGeometry;
use am_propulsion::{
    Airfoil, CycleParameters, DesignPoint, ElectricRotor, EngineRotor, Esc, GasTurbine, Motor,
    Propulsor, ReciprocatingEngine, Rotor,
};
use am_solver::SolveSettings;
use am_state::Conditions;
use std::sync::Arc;

use crate::error::AppResult;

/// A compiled project: the vehicle and the missions it flies.
#[derive(Debug, Clone)]
pub struct ProjectRuntime {
    pub vehicle: Vehicle,
    pub missions: MissionSet,
}

pub fn compile_project(project: &Project) -> AppResult<ProjectRuntime> {
    let vehicle = compile_vehicle(&project.vehicle)?;
    let missions = project
        .missions
        .iter()
        .map(|m| compile_mission(m, &project.solver))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ProjectRuntime {
        vehicle,
        missions: MissionSet { missions },
    })
}

pub fn compile_vehicle(def: &VehicleDef) -> AppResult<Vehicle> {
    let atmosphere = UsStandard1976::new();
    let mut builder = NetworkBuilder::new();
    let mut sources = Vec::new();
    let mut propulsors = Vec::new();

    for distributor in &def.distributors {
        let id = match distributor.kind {
            DistributorKindDef::ElectricBus => {
                builder.add_bus(&distributor.tag, distributor.identical_propulsors)
            }
            DistributorKindDef::FuelLine => {
                builder.add_fuel_line(&distributor.tag, distributor.identical_propulsors)
            }
        };
        builder.set_auxiliary_power(id, distributor.auxiliary_power_w);

        for source in &distributor.sources {
            match source {
                SourceDef::Battery { tag, .. } => builder.add_battery(tag, id),
                SourceDef::FuelTank { tag, .. } => builder.add_fuel_tank(tag, id),
            };
            sources.push(compile_source(source)?);
        }
        for propulsor in &distributor.propulsors {
            builder.add_propulsor(&propulsor.tag, id, &propulsor.group);
            propulsors.push(compile_propulsor(propulsor, &atmosphere)?);
        }
    }

    let network = builder.build()?;
    let vehicle = Vehicle::new(
        &def.tag,
        kg(def.mass_takeoff_kg),
        m2(def.reference_area_m2),
        network,
        propulsors,
        sources,
        compile_aerodynamics(&def.aerodynamics)?,
    )?;
    tracing::debug!(vehicle = %vehicle.tag, stored_energy = vehicle.stored_energy(), "vehicle compiled");
    Ok(vehicle)
}

fn compile_aerodynamics(def: &AerodynamicsDef) -> AppResult<Arc<dyn Aerodynamics>> {
    Ok(match def {
        AerodynamicsDef::DragPolar {
            cl0,
            cl_alpha,
            cl_max,
            cd0,
            induced_factor,
        } => {
            let polar = DragPolar {
                cl0: *cl0,
                cl_alpha: *cl_alpha,
                cl_max: *cl_max,
                cd0: *cd0,
                induced_factor: *induced_factor,
            };
            polar.validate()?;
            Arc::new(polar)
        }
        AerodynamicsDef::Table {
            angle_of_attack,
            mach,
            lift,
            drag,
        } => Arc::new(TabulatedAerodynamics::new(
            angle_of_attack.clone(),
            mach.clone(),
            lift.clone(),
            drag.clone(),
        )?),
    })
}

fn compile_source(def: &SourceDef) -> AppResult<EnergyStore> {
    Ok(match def {
        SourceDef::Battery {
            cell,
            cells_series,
            cells_parallel,
            mass_kg,
            thermal,
            ..
        } => {
            let cell = match cell {
                CellDef::Nmc18650 => Cell::nmc_18650(),
            };
            let thermal = match *thermal {
                ThermalDef::Isothermal => ThermalModel::Isothermal,
                ThermalDef::Lumped {
                    conductance_w_per_k,
                } => ThermalModel::Lumped {
                    conductance: conductance_w_per_k,
                },
            };
            EnergyStore::Battery(BatteryPack::new(
                cell,
                *cells_series,
                *cells_parallel,
                mass_kg.map(kg),
                thermal,
            )?)
        }
        SourceDef::FuelTank {
            fuel_mass_kg,
            fuel_selector_ratio,
            ..
        } => EnergyStore::FuelTank(FuelTank::new(kg(*fuel_mass_kg), *fuel_selector_ratio)?),
    })
}

fn compile_propulsor(def: &PropulsorDef, atmosphere: &dyn AtmosphereModel) -> AppResult<Propulsor> {
    Ok(match &def.model {
        PropulsorModelDef::ElectricRotor {
            esc_efficiency,
            motor,
            rotor,
        } => {
            let motor = Motor {
                speed_constant: motor.speed_constant,
                resistance: motor.resistance,
                no_load_current: motor.no_load_current,
                gear_ratio: motor.gear_ratio,
                gearbox_efficiency: motor.gearbox_efficiency,
            };
            Propulsor::ElectricRotor(ElectricRotor::new(
                Esc::new(*esc_efficiency)?,
                motor,
                compile_rotor(rotor)?,
                def.thrust_angle,
            )?)
        }
        PropulsorModelDef::EngineRotor {
            rated_power_w,
            rated_speed,
            brake_specific_fuel_consumption,
            gear_ratio,
            rotor,
        } => {
            let engine = ReciprocatingEngine {
                rated_power: *rated_power_w,
                rated_speed: *rated_speed,
                brake_specific_fuel_consumption: *brake_specific_fuel_consumption,
            };
            Propulsor::EngineRotor(EngineRotor::new(
                engine,
                compile_rotor(rotor)?,
                *gear_ratio,
                def.thrust_angle,
            )?)
        }
        PropulsorModelDef::GasTurbine {
            cycle,
            design_altitude_m,
            design_mach,
            design_thrust_n,
        } => {
            let design = DesignPoint {
                altitude: *design_altitude_m,
                mach: *design_mach,
                thrust: *design_thrust_n,
            };
            Propulsor::GasTurbine(GasTurbine::size(
                cycle_parameters(cycle),
                design,
                def.thrust_angle,
                atmosphere,
            )?)
        }
    })
}

fn cycle_parameters(def: &CycleDef) -> CycleParameters {
    match *def {
        CycleDef::Turbojet {
            compressor_pressure_ratio,
            turbine_inlet_temperature_k,
        } => {
            let base = CycleParameters::turbojet();
            CycleParameters {
                high_pressure_compressor_ratio: compressor_pressure_ratio
                    .unwrap_or(base.high_pressure_compressor_ratio),
                turbine_inlet_temperature: turbine_inlet_temperature_k
                    .unwrap_or(base.turbine_inlet_temperature),
                ..base
            }
        }
        CycleDef::Turbofan {
            bypass_ratio,
            fan_pressure_ratio,
            compressor_pressure_ratio,
            turbine_inlet_temperature_k,
        } => {
            let base = CycleParameters::default();
            CycleParameters {
                bypass_ratio: bypass_ratio.unwrap_or(base.bypass_ratio),
                fan_pressure_ratio: fan_pressure_ratio.unwrap_or(base.fan_pressure_ratio),
                high_pressure_compressor_ratio: compressor_pressure_ratio
                    .unwrap_or(base.high_pressure_compressor_ratio),
                turbine_inlet_temperature: turbine_inlet_temperature_k
                    .unwrap_or(base.turbine_inlet_temperature),
                ..base
            }
        }
    }
}

fn compile_rotor(def: &RotorDef) -> AppResult<Rotor> {
    let geometry = RotorGeometry {
        tip_radius: def.tip_radius_m,
        hub_radius: def.hub_radius_m,
        number_of_blades: def.number_of_blades,
        station_count: def.station_count,
    };
    let airfoil = def.airfoil.map(airfoil_section).unwrap_or_default();
    let rotor = match def.blade {
        BladeDef::Helical { pitch_m } => {
            Rotor::helical(geometry, def.chord_m, pitch_m, airfoil, def.design_rotor_speed)?
        }
        BladeDef::Linear {
            twist_root,
            twist_tip,
        } => Rotor::linear(
            geometry,
            def.chord_m,
            twist_root,
            twist_tip,
            airfoil,
            def.design_rotor_speed,
        )?,
    };
    Ok(rotor)
}

fn airfoil_section(def: AirfoilDef) -> Airfoil {
    Airfoil {
        lift_slope: def.lift_slope,
        zero_lift_angle: def.zero_lift_angle,
        cl_max: def.cl_max,
        cd0: def.cd0,
        cd2: def.cd2,
    }
}

/// Build a fresh mission. Segments without their own solver settings use
/// `defaults`.
pub fn compile_mission(def: &MissionDef, defaults: &SolveSettings) -> AppResult<Mission> {
    let mut mission = Mission::new(&def.tag);
    if !def.initial_conditions.is_empty() {
        let mut conditions = Conditions::new();
        for (path, value) in &def.initial_conditions {
            conditions.set_values(path, &[*value])?;
        }
        mission = mission.with_initial_conditions(conditions);
    }

    for seg in &def.segments {
        let mut segment = Segment::new(&seg.tag, seg.kind.clone())
            .with_control_points(seg.control_points)
            .with_force_axes(seg.force_axes)
            .with_throttle_groups(seg.throttle_groups.clone())
            .with_settings(seg.solver.unwrap_or(*defaults));
        if let Some(theta) = seg.fixed_body_angle {
            segment = segment.with_fixed_body_angle(theta);
        }
        for (group, throttle) in &seg.fixed_throttles {
            segment = segment.with_fixed_throttle(group, *throttle);
        }
        mission = mission.with_segment(segment);
    }
    mission.validate().map_err(am_mission::MissionError::from)?;
    Ok(mission)
}
