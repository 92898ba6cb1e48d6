//! Propulsor inputs, outputs and the family dispatch.

use crate::electric::ElectricRotor;
use crate::engine::EngineRotor;
use crate::envelope;
use crate::error::PropulsionResult;
use crate::gas_turbine::GasTurbine;
use am_atmosphere::Freestream;

/// Operating point handed to a propulsor by the network evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropulsorInput {
    /// Commanded throttle; values above 1 over-drive proportionally.
    pub throttle: f64,
    pub freestream: Freestream,
    /// Distributor voltage, V. Ignored by fuel-burning families.
    pub bus_voltage: f64,
    /// Rotor speed guess, rad/s. Ignored by gas turbines.
    pub rotor_speed: f64,
    /// Collective pitch offset, rad.
    pub pitch_command: f64,
}

impl PropulsorInput {
    pub fn new(throttle: f64, freestream: Freestream) -> Self {
        Self {
            throttle,
            freestream,
            bus_voltage: 0.0,
            rotor_speed: 0.0,
            pitch_command: 0.0,
        }
    }

    pub fn with_throttle(&self, throttle: f64) -> Self {
        Self { throttle, ..*self }
    }
}

/// Per-point performance of one propulsor unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PropulsorOutput {
    /// Thrust along the propulsor axis, N.
    pub thrust: f64,
    /// Shaft power absorbed by the rotor (or jet power), W.
    pub shaft_power: f64,
    /// Rotor torque, N·m.
    pub torque: f64,
    /// Rotor speed, rad/s.
    pub rotor_speed: f64,
    /// Current drawn from the bus, A.
    pub current: f64,
    /// Electrical power drawn from the bus, W.
    pub electrical_power: f64,
    /// Fuel mass flow, kg/s.
    pub fuel_flow: f64,
    pub thrust_coefficient: f64,
    pub power_coefficient: f64,
    /// Propulsive efficiency T·V/P.
    pub efficiency: f64,
    pub tip_mach: f64,
    /// Normalized torque balance for families carrying a rotor-speed unknown.
    pub torque_residual: Option<f64>,
}

impl PropulsorOutput {
    /// All-zero output at the given rotor speed.
    pub fn idle(rotor_speed: f64) -> Self {
        Self {
            rotor_speed,
            ..Self::default()
        }
    }

    /// Scale the extensive quantities (forces, powers, flows) by `k`.
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            thrust: self.thrust * k,
            shaft_power: self.shaft_power * k,
            torque: self.torque * k,
            current: self.current * k,
            electrical_power: self.electrical_power * k,
            fuel_flow: self.fuel_flow * k,
            ..*self
        }
    }
}

/// Behavior shared by all propulsor families.
pub trait ThrustProducer {
    fn family(&self) -> &'static str;

    /// Design rotor speed for families that carry a rotor-speed unknown.
    fn design_rotor_speed(&self) -> Option<f64> {
        None
    }

    /// Thrust line inclination relative to the body x axis, rad.
    fn thrust_angle(&self) -> f64 {
        0.0
    }

    /// Raw evaluation for a throttle in (0, 1].
    fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput>;

    /// Evaluation with the throttle envelope applied.
    fn evaluate(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
        envelope::apply(self, input)
    }
}

/// Closed set of propulsor families.
#[derive(Clone, Debug, PartialEq)]
pub enum Propulsor {
    ElectricRotor(ElectricRotor),
    EngineRotor(EngineRotor),
    GasTurbine(GasTurbine),
}

impl Propulsor {
    fn producer(&self) -> &dyn ThrustProducer {
        match self {
            Propulsor::ElectricRotor(p) => p,
            Propulsor::EngineRotor(p) => p,
            Propulsor::GasTurbine(p) => p,
        }
    }

    pub fn is_electric(&self) -> bool {
        matches!(self, Propulsor::ElectricRotor(_))
    }

    pub fn burns_fuel(&self) -> bool {
        !self.is_electric()
    }
}

impl ThrustProducer for Propulsor {
    fn family(&self) -> &'static str {
        self.producer().family()
    }

    fn design_rotor_speed(&self) -> Option<f64> {
        self.producer().design_rotor_speed()
    }

    fn thrust_angle(&self) -> f64 {
        self.producer().thrust_angle()
    }

    fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
        self.producer().evaluate_unit(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_leaves_intensive_terms() {
        let out = PropulsorOutput {
            thrust: 10.0,
            fuel_flow: 0.1,
            rotor_speed: 300.0,
            efficiency: 0.7,
            torque_residual: Some(0.2),
            ..PropulsorOutput::default()
        };
        let s = out.scaled(2.0);
        assert_eq!(s.thrust, 20.0);
        assert_eq!(s.fuel_flow, 0.2);
        assert_eq!(s.rotor_speed, 300.0);
        assert_eq!(s.efficiency, 0.7);
        assert_eq!(s.torque_residual, Some(0.2));
    }
}
