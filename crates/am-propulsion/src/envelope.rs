//! Throttle envelope shared by every propulsor family.
//!
//! ```text
//! throttle <= 0 : all outputs zero
//! 0 < t <= 1    : raw evaluation
//! t > 1         : evaluate at 1, scale extensive outputs by t
//! ```

use crate::error::{PropulsionError, PropulsionResult};
use crate::propulsor::{PropulsorInput, PropulsorOutput, ThrustProducer};

pub fn apply<P: ThrustProducer + ?Sized>(
    producer: &P,
    input: &PropulsorInput,
) -> PropulsionResult<PropulsorOutput> {
    let throttle = input.throttle;
    if !throttle.is_finite() {
        return Err(PropulsionError::NonPhysical { what: "throttle" });
    }

    if throttle <= 0.0 {
        let mut out = PropulsorOutput::idle(input.rotor_speed);
        // A stopped motor drives the rotor-speed unknown to zero.
        out.torque_residual = producer
            .design_rotor_speed()
            .map(|design| input.rotor_speed / design);
        return Ok(out);
    }

    if throttle > 1.0 {
        tracing::trace!(family = producer.family(), throttle, "over-throttle");
        let out = producer.evaluate_unit(&input.with_throttle(1.0))?;
        return Ok(out.scaled(throttle));
    }

    producer.evaluate_unit(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_atmosphere::Freestream;

    struct Linear;

    impl ThrustProducer for Linear {
        fn family(&self) -> &'static str {
            "linear"
        }

        fn design_rotor_speed(&self) -> Option<f64> {
            Some(100.0)
        }

        fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
            Ok(PropulsorOutput {
                thrust: 1000.0 * input.throttle,
                fuel_flow: 0.01 * input.throttle,
                rotor_speed: input.rotor_speed,
                ..PropulsorOutput::default()
            })
        }
    }

    fn input(throttle: f64) -> PropulsorInput {
        PropulsorInput {
            rotor_speed: 50.0,
            ..PropulsorInput::new(throttle, Freestream::sea_level_static())
        }
    }

    #[test]
    fn zero_and_negative_throttle_give_zero_output() {
        for t in [0.0, -0.5] {
            let out = apply(&Linear, &input(t)).unwrap();
            assert_eq!(out.thrust, 0.0);
            assert_eq!(out.fuel_flow, 0.0);
            assert_eq!(out.torque_residual, Some(0.5));
        }
    }

    #[test]
    fn over_throttle_scales_full_power() {
        let out = apply(&Linear, &input(1.5)).unwrap();
        assert!((out.thrust - 1500.0).abs() < 1e-12);
        assert!((out.fuel_flow - 0.015).abs() < 1e-15);
    }

    #[test]
    fn nan_throttle_rejected() {
        assert!(apply(&Linear, &input(f64::NAN)).is_err());
    }
}
