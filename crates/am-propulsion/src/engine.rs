//! Reciprocating engine driving a rotor through a fixed gear.
//!
//! Available power lapses with density ratio (Gagg-Ferrar):
//! `P = P_rated · max(σ − (1 − σ)/7.55, 0) · τ`.

use crate::common::{check_finite, check_positive, power_to_torque};
use crate::error::PropulsionResult;
use crate::propulsor::{PropulsorInput, PropulsorOutput, ThrustProducer};
use crate::rotor::Rotor;
use am_core::constants::SEA_LEVEL_DENSITY_KGPM3;

const GAGG_FERRAR_LAPSE: f64 = 7.55;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReciprocatingEngine {
    /// W
    pub rated_power: f64,
    /// Crankshaft speed at rated power, rad/s.
    pub rated_speed: f64,
    /// kg/J
    pub brake_specific_fuel_consumption: f64,
}

impl ReciprocatingEngine {
    pub fn validate(&self) -> PropulsionResult<()> {
        check_positive(self.rated_power, "engine rated power")?;
        check_positive(self.rated_speed, "engine rated speed")?;
        check_positive(
            self.brake_specific_fuel_consumption,
            "brake specific fuel consumption",
        )?;
        Ok(())
    }

    /// Full-throttle power at density `density`.
    pub fn available_power(&self, density: f64) -> f64 {
        let sigma = density / SEA_LEVEL_DENSITY_KGPM3;
        self.rated_power * (sigma - (1.0 - sigma) / GAGG_FERRAR_LAPSE).max(0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineRotor {
    pub engine: ReciprocatingEngine,
    pub rotor: Rotor,
    /// Crankshaft speed over rotor speed.
    pub gear_ratio: f64,
    pub thrust_angle: f64,
}

impl EngineRotor {
    pub fn new(
        engine: ReciprocatingEngine,
        rotor: Rotor,
        gear_ratio: f64,
        thrust_angle: f64,
    ) -> PropulsionResult<Self> {
        engine.validate()?;
        check_positive(gear_ratio, "gear ratio")?;
        check_finite(thrust_angle, "thrust angle")?;
        Ok(Self {
            engine,
            rotor,
            gear_ratio,
            thrust_angle,
        })
    }

    fn reference_torque(&self) -> f64 {
        self.engine.rated_power / self.engine.rated_speed * self.gear_ratio
    }
}

impl ThrustProducer for EngineRotor {
    fn family(&self) -> &'static str {
        "engine_rotor"
    }

    fn design_rotor_speed(&self) -> Option<f64> {
        Some(self.rotor.design_rotor_speed)
    }

    fn thrust_angle(&self) -> f64 {
        self.thrust_angle
    }

    fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
        check_finite(input.rotor_speed, "rotor speed")?;
        let omega = input.rotor_speed;
        let power = self.engine.available_power(input.freestream.density) * input.throttle;
        let engine_speed = omega * self.gear_ratio;
        let available = power_to_torque(power, engine_speed) * self.gear_ratio;

        let perf = self.rotor.performance(&input.freestream, omega, input.pitch_command);
        let residual = (available - perf.torque) / self.reference_torque();

        Ok(PropulsorOutput {
            thrust: perf.thrust,
            shaft_power: perf.power,
            torque: perf.torque,
            rotor_speed: omega,
            current: 0.0,
            electrical_power: 0.0,
            fuel_flow: self.engine.brake_specific_fuel_consumption * power,
            thrust_coefficient: perf.thrust_coefficient,
            power_coefficient: perf.power_coefficient,
            efficiency: perf.efficiency,
            tip_mach: perf.tip_mach,
            torque_residual: Some(residual),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotor::{Airfoil, RotorGeometry};
    use am_atmosphere::{Freestream, UsStandard1976};

    fn unit() -> EngineRotor {
        let rotor = Rotor::helical(
            RotorGeometry {
                tip_radius: 0.95,
                hub_radius: 0.1,
                number_of_blades: 2,
                station_count: 20,
            },
            0.08,
            1.5,
            Airfoil::default(),
            260.0,
        )
        .unwrap();
        let engine = ReciprocatingEngine {
            rated_power: 120.0e3,
            rated_speed: 280.0,
            brake_specific_fuel_consumption: 8.5e-8,
        };
        EngineRotor::new(engine, rotor, 1.0, 0.0).unwrap()
    }

    #[test]
    fn power_lapses_with_altitude() {
        let engine = unit().engine;
        let sl = engine.available_power(SEA_LEVEL_DENSITY_KGPM3);
        assert!((sl - engine.rated_power).abs() < 1e-9);
        let fs = Freestream::at(&UsStandard1976::new(), 3000.0, 0.0).unwrap();
        assert!(engine.available_power(fs.density) < 0.8 * sl);
    }

    #[test]
    fn fuel_flow_follows_throttle() {
        let prop = unit();
        let mut input = PropulsorInput::new(0.5, Freestream::sea_level_static());
        input.rotor_speed = 250.0;
        let half = prop.evaluate(&input).unwrap();
        input.throttle = 1.0;
        let full = prop.evaluate(&input).unwrap();
        assert!((full.fuel_flow - 2.0 * half.fuel_flow).abs() < 1e-12);
        assert!(half.torque_residual.is_some());
    }

    #[test]
    fn zero_throttle_burns_nothing() {
        let prop = unit();
        let mut input = PropulsorInput::new(0.0, Freestream::sea_level_static());
        input.rotor_speed = 130.0;
        let out = prop.evaluate(&input).unwrap();
        assert_eq!(out.fuel_flow, 0.0);
        assert_eq!(out.thrust, 0.0);
        assert_eq!(out.torque_residual, Some(0.5));
    }
}
