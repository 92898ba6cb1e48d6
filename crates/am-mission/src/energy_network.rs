//! Energy network evaluation over all control points of a segment.
//!
//! Propulsors are evaluated per point (leaders only on identical
//! distributors, followers get a bit-identical copy), then each
//! distributor settles its sources: a bus marches its battery through the
//! demanded power and compares the resulting under-load voltage with the
//! voltage unknown; a fuel line splits its flow over its tanks by
//! selector ratio and integrates the remaining fuel.

use crate::chebyshev::Discretization;
use crate::error::{ConfigError, MissionError, MissionResult};
use crate::unknowns::{EntryLength, ResidualSpec, SystemLayout, UnknownSpec};
use crate::vehicle::Vehicle;
use am_atmosphere::Freestream;
use am_core::numeric::guarded_div;
use am_core::{DistributorId, PropulsorId, SourceId};
use am_energy::{BatteryPoint, EnergyStore};
use am_network::DistributorKind;
use am_propulsion::{PropulsorInput, PropulsorOutput, ThrustProducer};
use am_state::{Conditions, Series};
use nalgebra::DVector;
use std::collections::BTreeMap;

/// Bus voltage unknown, normalized by the pack nominal voltage.
#[derive(Clone, Debug, PartialEq)]
pub struct BusUnknown {
    pub distributor: DistributorId,
    pub tag: String,
    pub battery: SourceId,
    pub nominal_voltage: f64,
}

/// Rotor speed unknown, normalized by the design rotor speed.
#[derive(Clone, Debug, PartialEq)]
pub struct RotorUnknown {
    pub propulsor: PropulsorId,
    pub tag: String,
    pub design_speed: f64,
}

/// Unknowns and residuals the network contributes to every segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkLayout {
    pub buses: Vec<BusUnknown>,
    pub rotors: Vec<RotorUnknown>,
}

impl NetworkLayout {
    pub fn new(vehicle: &Vehicle) -> MissionResult<Self> {
        let network = &vehicle.network;
        let mut buses = Vec::new();
        for dist in network.distributors() {
            if dist.kind != DistributorKind::ElectricBus {
                continue;
            }
            let battery = network.battery_of(dist.id).ok_or_else(|| ConfigError::InvalidVehicle {
                what: format!("bus '{}' has no battery", dist.tag),
            })?;
            let pack = vehicle.battery(battery).ok_or_else(|| ConfigError::InvalidVehicle {
                what: format!("bus '{}' battery model missing", dist.tag),
            })?;
            buses.push(BusUnknown {
                distributor: dist.id,
                tag: dist.tag.clone(),
                battery,
                nominal_voltage: pack.nominal_voltage(),
            });
        }

        let mut rotors = Vec::new();
        for id in network.evaluated_propulsors() {
            let (Some(slot), Some(model)) = (network.propulsor(id), vehicle.propulsor(id)) else {
                continue;
            };
            if let Some(design_speed) = model.design_rotor_speed() {
                rotors.push(RotorUnknown {
                    propulsor: id,
                    tag: slot.tag.clone(),
                    design_speed,
                });
            }
        }
        Ok(Self { buses, rotors })
    }

    fn voltage_name(tag: &str) -> String {
        format!("{tag}_voltage")
    }

    fn rotor_speed_name(tag: &str) -> String {
        format!("{tag}_rotor_speed")
    }

    fn torque_name(tag: &str) -> String {
        format!("{tag}_torque")
    }

    pub fn unknowns(&self) -> Vec<UnknownSpec> {
        let buses = self.buses.iter().map(|b| {
            let name = Self::voltage_name(&b.tag);
            UnknownSpec::uniform(name.clone(), name, EntryLength::PerPoint, 1.0)
        });
        let rotors = self.rotors.iter().map(|r| {
            UnknownSpec::uniform(
                Self::rotor_speed_name(&r.tag),
                Self::torque_name(&r.tag),
                EntryLength::PerPoint,
                1.0,
            )
        });
        buses.chain(rotors).collect()
    }

    pub fn residuals(&self) -> Vec<ResidualSpec> {
        let buses = self
            .buses
            .iter()
            .map(|b| ResidualSpec::new(Self::voltage_name(&b.tag), EntryLength::PerPoint));
        let rotors = self
            .rotors
            .iter()
            .map(|r| ResidualSpec::new(Self::torque_name(&r.tag), EntryLength::PerPoint));
        buses.chain(rotors).collect()
    }

    /// Physical bus voltages and rotor speeds from the solver vector.
    pub fn unpack(
        &self,
        system: &SystemLayout,
        x: &DVector<f64>,
    ) -> MissionResult<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
        let voltages = self
            .buses
            .iter()
            .map(|b| {
                let v = system.unknown(x, &Self::voltage_name(&b.tag))?;
                Ok(v.iter().map(|v| v * b.nominal_voltage).collect())
            })
            .collect::<MissionResult<Vec<Vec<f64>>>>()?;
        let speeds = self
            .rotors
            .iter()
            .map(|r| {
                let w = system.unknown(x, &Self::rotor_speed_name(&r.tag))?;
                Ok(w.iter().map(|w| w * r.design_speed).collect())
            })
            .collect::<MissionResult<Vec<Vec<f64>>>>()?;
        Ok((voltages, speeds))
    }

    fn bus_index(&self, id: DistributorId) -> Option<usize> {
        self.buses.iter().position(|b| b.distributor == id)
    }

    fn rotor_index(&self, id: PropulsorId) -> Option<usize> {
        self.rotors.iter().position(|r| r.propulsor == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceSeed {
    Battery(BatteryPoint),
    /// Fuel on board at the segment start, kg.
    Fuel(f64),
}

/// Source states at the first control point, captured once per segment.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkSeed {
    pub sources: Vec<SourceSeed>,
}

impl NetworkSeed {
    /// Read chained source states from row 0 of `conditions`, falling back
    /// to full packs and tanks.
    pub fn capture(
        vehicle: &Vehicle,
        conditions: &Conditions,
        ambient_temperature: f64,
    ) -> MissionResult<Self> {
        let mut sources = Vec::with_capacity(vehicle.sources.len());
        for (slot, store) in vehicle.network.sources().iter().zip(&vehicle.sources) {
            let prefix = vehicle.network.result_prefix(&slot.tag)?;
            let scope = conditions.branch(&prefix).ok();
            let seed = match store {
                EnergyStore::Battery(pack) => SourceSeed::Battery(BatteryPoint::from_conditions(
                    scope,
                    pack.initial_point(1.0, ambient_temperature),
                )),
                EnergyStore::FuelTank(tank) => SourceSeed::Fuel(
                    scope
                        .and_then(|s| s.deep_get("mass").ok())
                        .map(|s| s.first())
                        .filter(|m| m.is_finite())
                        .unwrap_or(tank.fuel_mass),
                ),
            };
            sources.push(seed);
        }
        Ok(Self { sources })
    }
}

/// Per-point operating conditions handed to the network.
pub struct NetworkInputs<'a> {
    pub time: &'a [f64],
    pub duration: f64,
    pub discretization: &'a Discretization,
    pub freestream: &'a [Freestream],
    /// Throttle per point for each throttle group, in network group order.
    pub group_throttle: &'a [Vec<f64>],
    /// Physical bus voltages, aligned with [`NetworkLayout::buses`].
    pub bus_voltage: &'a [Vec<f64>],
    /// Physical rotor speeds, aligned with [`NetworkLayout::rotors`].
    pub rotor_speed: &'a [Vec<f64>],
}

/// Forces, mass flow and residuals produced by one network evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkResponse {
    /// Summed thrust along body x, N.
    pub thrust_x: Vec<f64>,
    /// Summed thrust along body z (up), N.
    pub thrust_z: Vec<f64>,
    /// Total fuel burned, kg/s.
    pub fuel_mass_rate: Vec<f64>,
    pub residuals: BTreeMap<String, Vec<f64>>,
}

pub fn evaluate_network(
    vehicle: &Vehicle,
    layout: &NetworkLayout,
    seed: &NetworkSeed,
    inputs: &NetworkInputs<'_>,
    conditions: &mut Conditions,
) -> MissionResult<NetworkResponse> {
    let network = &vehicle.network;
    let n = inputs.time.len();
    let missing = |what: &'static str| MissionError::InvalidArg { what };

    let group_index = |id: PropulsorId| {
        network
            .groups()
            .iter()
            .position(|g| g.members.contains(&id))
    };

    let mut outputs: Vec<Option<Vec<PropulsorOutput>>> = vec![None; network.propulsors().len()];
    for id in network.evaluated_propulsors() {
        let slot = network.propulsor(id).ok_or(missing("propulsor slot"))?;
        let model = vehicle.propulsor(id).ok_or(missing("propulsor model"))?;
        let throttle = group_index(id)
            .and_then(|g| inputs.group_throttle.get(g))
            .ok_or(missing("throttle group"))?;
        let voltage = layout
            .bus_index(slot.distributor)
            .and_then(|i| inputs.bus_voltage.get(i));
        let speed = layout.rotor_index(id).and_then(|i| inputs.rotor_speed.get(i));

        let mut series = Vec::with_capacity(n);
        for i in 0..n {
            let input = PropulsorInput {
                throttle: throttle[i],
                freestream: inputs.freestream[i],
                bus_voltage: voltage.map_or(0.0, |v| v[i]),
                rotor_speed: speed.map_or(0.0, |w| w[i]),
                pitch_command: 0.0,
            };
            series.push(model.evaluate(&input)?);
        }
        outputs[id.slot()] = Some(series);
    }
    for slot in network.propulsors() {
        if outputs[slot.id.slot()].is_none() {
            let leader = network.evaluation_leader(slot.id);
            outputs[slot.id.slot()] = outputs[leader.slot()].clone();
        }
    }

    let mut response = NetworkResponse {
        thrust_x: vec![0.0; n],
        thrust_z: vec![0.0; n],
        fuel_mass_rate: vec![0.0; n],
        residuals: BTreeMap::new(),
    };

    for dist in network.distributors() {
        let members = network.propulsors_of(dist.id);
        let mut draw_current = vec![0.0; n];
        let mut draw_power = vec![dist.auxiliary_power; n];
        let mut fuel_flow = vec![0.0; n];

        for &id in members {
            let slot = network.propulsor(id).ok_or(missing("propulsor slot"))?;
            let model = vehicle.propulsor(id).ok_or(missing("propulsor model"))?;
            let outs = outputs[id.slot()].as_deref().ok_or(missing("propulsor output"))?;
            let throttle = group_index(id)
                .and_then(|g| inputs.group_throttle.get(g))
                .ok_or(missing("throttle group"))?;
            let (sin_e, cos_e) = model.thrust_angle().sin_cos();
            for (i, out) in outs.iter().enumerate() {
                response.thrust_x[i] += out.thrust * cos_e;
                response.thrust_z[i] += out.thrust * sin_e;
                draw_current[i] += out.current;
                draw_power[i] += out.electrical_power;
                fuel_flow[i] += out.fuel_flow;
            }
            let prefix = network.result_prefix(&slot.tag)?;
            record_propulsor(conditions.scope_mut(&prefix)?, outs, throttle)?;
        }

        let dist_scope = format!("energy.{}", dist.tag);
        match dist.kind {
            DistributorKind::ElectricBus => {
                let (bus, voltage) = layout
                    .bus_index(dist.id)
                    .and_then(|i| layout.buses.get(i).zip(inputs.bus_voltage.get(i)))
                    .ok_or(missing("bus voltage unknown"))?;
                let pack = vehicle.battery(bus.battery).ok_or(missing("battery model"))?;
                let Some(SourceSeed::Battery(initial)) =
                    seed.sources.get(bus.battery.slot()).copied()
                else {
                    return Err(missing("battery seed"));
                };
                for i in 0..n {
                    draw_current[i] += guarded_div(dist.auxiliary_power, voltage[i], 0.0);
                }
                let ambient: Vec<f64> = inputs.freestream.iter().map(|f| f.temperature).collect();
                let history = pack.march(initial, &draw_power, inputs.time, &ambient)?;
                let battery_prefix = network.result_prefix(&network_tag(vehicle, bus.battery)?)?;
                history.record(conditions.scope_mut(&battery_prefix)?)?;

                let residual = voltage
                    .iter()
                    .zip(&history.voltage_under_load)
                    .map(|(guess, actual)| (guess - actual) / bus.nominal_voltage)
                    .collect();
                response
                    .residuals
                    .insert(NetworkLayout::voltage_name(&dist.tag), residual);

                let scope = conditions.scope_mut(&dist_scope)?;
                scope.set_values("voltage", voltage)?;
                scope.set_values("current", &draw_current)?;
                scope.set_values("power_draw", &draw_power)?;
            }
            DistributorKind::FuelLine => {
                let tanks = network.sources_of(dist.id);
                let ratio_total: f64 = tanks
                    .iter()
                    .filter_map(|&s| vehicle.store(s).and_then(EnergyStore::fuel_tank))
                    .map(|t| t.fuel_selector_ratio)
                    .sum();
                for &sid in tanks {
                    let tank = vehicle
                        .store(sid)
                        .and_then(EnergyStore::fuel_tank)
                        .ok_or(missing("fuel tank model"))?;
                    let Some(SourceSeed::Fuel(initial)) = seed.sources.get(sid.slot()).copied()
                    else {
                        return Err(missing("fuel tank seed"));
                    };
                    let share = guarded_div(tank.fuel_selector_ratio, ratio_total, 0.0);
                    let rate: Vec<f64> = fuel_flow.iter().map(|f| f * share).collect();
                    let drawn = inputs.discretization.integrate(&rate, inputs.duration);
                    let remaining = tank.remaining(initial, &drawn);
                    let prefix = network.result_prefix(&network_tag(vehicle, sid)?)?;
                    let scope = conditions.scope_mut(&prefix)?;
                    scope.set_values("mass", &remaining)?;
                    scope.set_values("mass_rate", &rate)?;
                }
                for (total, f) in response.fuel_mass_rate.iter_mut().zip(&fuel_flow) {
                    *total += f;
                }
                let scope = conditions.scope_mut(&dist_scope)?;
                scope.set_values("fuel_flow_rate", &fuel_flow)?;
                scope.deep_set(
                    "auxiliary_power",
                    Series::filled(n, 1, dist.auxiliary_power),
                )?;
            }
        }
    }

    for rotor in &layout.rotors {
        let outs = outputs[rotor.propulsor.slot()]
            .as_deref()
            .ok_or(missing("rotor output"))?;
        let residual = outs.iter().map(|o| o.torque_residual.unwrap_or(0.0)).collect();
        response
            .residuals
            .insert(NetworkLayout::torque_name(&rotor.tag), residual);
    }

    Ok(response)
}

fn network_tag(vehicle: &Vehicle, id: SourceId) -> MissionResult<String> {
    vehicle
        .network
        .source(id)
        .map(|s| s.tag.clone())
        .ok_or(MissionError::InvalidArg { what: "source slot" })
}

fn record_propulsor(
    scope: &mut Conditions,
    outs: &[PropulsorOutput],
    throttle: &[f64],
) -> MissionResult<()> {
    let fields: [(&str, fn(&PropulsorOutput) -> f64); 11] = [
        ("thrust", |o| o.thrust),
        ("shaft_power", |o| o.shaft_power),
        ("torque", |o| o.torque),
        ("rotor_speed", |o| o.rotor_speed),
        ("current", |o| o.current),
        ("electrical_power", |o| o.electrical_power),
        ("fuel_flow_rate", |o| o.fuel_flow),
        ("thrust_coefficient", |o| o.thrust_coefficient),
        ("power_coefficient", |o| o.power_coefficient),
        ("efficiency", |o| o.efficiency),
        ("tip_mach", |o| o.tip_mach),
    ];
    scope.set_values("throttle", throttle)?;
    for (key, field) in fields {
        let values: Vec<f64> = outs.iter().map(field).collect();
        scope.set_values(key, &values)?;
    }
    Ok(())
}
