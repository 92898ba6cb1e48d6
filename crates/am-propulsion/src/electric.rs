//! Electric rotor: ESC → DC motor → gearbox → rotor.
//!
//! Rotor speed is an unknown owned by the mission solver. For a guessed
//! speed the motor delivers
//!
//! ```text
//! v_m = τ·V_bus
//! i_m = (v_m − ω_m/Kv)/R_m
//! Q   = (i_m − i0)/Kv · gear · η_gb
//! ```
//!
//! and the torque residual `(Q − Q_rotor)/Q_ref` closes the loop.

use crate::common::{check_finite, check_fraction, check_positive};
use crate::error::PropulsionResult;
use crate::propulsor::{PropulsorInput, PropulsorOutput, ThrustProducer};
use crate::rotor::Rotor;
use am_atmosphere::Freestream;

const REFERENCE_TORQUE_FLOOR: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Esc {
    pub efficiency: f64,
}

impl Esc {
    pub fn new(efficiency: f64) -> PropulsionResult<Self> {
        check_fraction(efficiency, "ESC efficiency")?;
        Ok(Self { efficiency })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motor {
    /// Kv, rad/s per V.
    pub speed_constant: f64,
    /// Winding resistance, Ω.
    pub resistance: f64,
    /// A
    pub no_load_current: f64,
    /// Motor speed over rotor speed.
    pub gear_ratio: f64,
    pub gearbox_efficiency: f64,
}

impl Motor {
    pub fn direct_drive(speed_constant: f64, resistance: f64, no_load_current: f64) -> Self {
        Self {
            speed_constant,
            resistance,
            no_load_current,
            gear_ratio: 1.0,
            gearbox_efficiency: 1.0,
        }
    }

    pub fn validate(&self) -> PropulsionResult<()> {
        check_positive(self.speed_constant, "motor speed constant")?;
        check_positive(self.resistance, "motor resistance")?;
        check_finite(self.no_load_current, "motor no-load current")?;
        check_positive(self.gear_ratio, "gear ratio")?;
        check_fraction(self.gearbox_efficiency, "gearbox efficiency")?;
        Ok(())
    }

    /// Armature current for terminal voltage `voltage` at rotor speed `omega`.
    pub fn current(&self, voltage: f64, omega: f64) -> f64 {
        let back_emf = omega * self.gear_ratio / self.speed_constant;
        (voltage - back_emf) / self.resistance
    }

    /// Torque delivered at the rotor shaft for armature current `current`.
    pub fn output_torque(&self, current: f64) -> f64 {
        (current - self.no_load_current) / self.speed_constant
            * self.gear_ratio
            * self.gearbox_efficiency
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElectricRotor {
    pub esc: Esc,
    pub motor: Motor,
    pub rotor: Rotor,
    /// rad
    pub thrust_angle: f64,
    /// Rotor torque at design speed, sea level static; residual scale.
    pub reference_torque: f64,
}

impl ElectricRotor {
    pub fn new(esc: Esc, motor: Motor, rotor: Rotor, thrust_angle: f64) -> PropulsionResult<Self> {
        motor.validate()?;
        check_finite(thrust_angle, "thrust angle")?;
        let reference_torque = rotor
            .performance(&Freestream::sea_level_static(), rotor.design_rotor_speed, 0.0)
            .torque
            .max(REFERENCE_TORQUE_FLOOR);
        Ok(Self {
            esc,
            motor,
            rotor,
            thrust_angle,
            reference_torque,
        })
    }
}

impl ThrustProducer for ElectricRotor {
    fn family(&self) -> &'static str {
        "electric_rotor"
    }

    fn design_rotor_speed(&self) -> Option<f64> {
        Some(self.rotor.design_rotor_speed)
    }

    fn thrust_angle(&self) -> f64 {
        self.thrust_angle
    }

    fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
        check_finite(input.bus_voltage, "bus voltage")?;
        check_finite(input.rotor_speed, "rotor speed")?;
        let omega = input.rotor_speed;
        let throttle = input.throttle;

        let motor_voltage = throttle * input.bus_voltage;
        let motor_current = self.motor.current(motor_voltage, omega);
        let available = self.motor.output_torque(motor_current);

        let perf = self.rotor.performance(&input.freestream, omega, input.pitch_command);
        let residual = (available - perf.torque) / self.reference_torque;

        let current = throttle * motor_current / self.esc.efficiency;
        let electrical_power = input.bus_voltage * current;

        Ok(PropulsorOutput {
            thrust: perf.thrust,
            shaft_power: perf.power,
            torque: perf.torque,
            rotor_speed: omega,
            current,
            electrical_power,
            fuel_flow: 0.0,
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

    fn unit() -> ElectricRotor {
        let rotor = Rotor::helical(
            RotorGeometry {
                tip_radius: 0.25,
                hub_radius: 0.025,
                number_of_blades: 2,
                station_count: 20,
            },
            0.03,
            0.429,
            Airfoil::default(),
            600.0,
        )
        .unwrap();
        ElectricRotor::new(
            Esc::new(0.95).unwrap(),
            Motor::direct_drive(30.0, 0.02, 0.5),
            rotor,
            0.0,
        )
        .unwrap()
    }

    fn input(throttle: f64, omega: f64) -> PropulsorInput {
        PropulsorInput {
            bus_voltage: 22.0,
            rotor_speed: omega,
            ..PropulsorInput::new(throttle, Freestream::sea_level_static())
        }
    }

    #[test]
    fn zero_throttle_is_idle() {
        let out = unit().evaluate(&input(0.0, 300.0)).unwrap();
        assert_eq!(out.thrust, 0.0);
        assert_eq!(out.current, 0.0);
        assert_eq!(out.electrical_power, 0.0);
        assert_eq!(out.torque_residual, Some(0.5));
    }

    #[test]
    fn residual_changes_sign_across_speed() {
        let prop = unit();
        let slow = prop.evaluate(&input(0.8, 50.0)).unwrap();
        let fast = prop.evaluate(&input(0.8, 1000.0)).unwrap();
        assert!(slow.torque_residual.unwrap() > 0.0);
        assert!(fast.torque_residual.unwrap() < 0.0);
    }

    #[test]
    fn bus_power_is_voltage_times_current() {
        let prop = unit();
        let out = prop.evaluate(&input(0.8, 400.0)).unwrap();
        assert!(out.current > 0.0);
        assert!((out.electrical_power - 22.0 * out.current).abs() < 1e-9);
    }

    #[test]
    fn invalid_motor_rejected() {
        let prop = unit();
        let bad = Motor {
            resistance: 0.0,
            ..prop.motor
        };
        assert!(ElectricRotor::new(prop.esc, bad, prop.rotor.clone(), 0.0).is_err());
    }
}
