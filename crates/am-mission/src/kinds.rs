//! Segment kinds: boundary conditions, unknowns and kinematics.

use crate::chebyshev::Discretization;
use crate::error::MissionResult;
use crate::unknowns::{EntryLength, ResidualSpec, SystemLayout, UnknownSpec};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MIN_DURATION: f64 = 1e-3;
const INITIAL_THROTTLE: f64 = 0.5;
const INITIAL_BODY_ANGLE: f64 = 0.05;
const INITIAL_WIND_ANGLE: f64 = 0.1;
/// Acceleration assumed for the first elapsed-time guess, m/s².
const INITIAL_ACCELERATION: f64 = 1.0;

pub const FORCES_X: &str = "forces_x";
pub const FORCES_Y: &str = "forces_y";
pub const FORCES_Z: &str = "forces_z";
pub const THROTTLE: &str = "throttle";
pub const BODY_ANGLE: &str = "body_angle";
pub const WIND_ANGLE: &str = "wind_angle";
pub const VELOCITY: &str = "velocity";
pub const ELAPSED_TIME: &str = "elapsed_time";
pub const FINAL_ALTITUDE: &str = "final_altitude";
pub const FINAL_VELOCITY: &str = "final_velocity";

/// Boundary conditions of one segment. Optional start values are taken
/// from the end of the previous segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Constant air speed and altitude over a ground distance.
    Cruise {
        altitude: Option<f64>,
        air_speed: f64,
        distance: f64,
    },
    /// Constant air speed and climb rate; a negative rate descends.
    ClimbConstantRate {
        altitude_start: Option<f64>,
        altitude_end: f64,
        air_speed: f64,
        climb_rate: f64,
    },
    /// Constant air speed and throttle; the flight path angle is solved.
    ClimbConstantThrottle {
        altitude_start: Option<f64>,
        altitude_end: f64,
        air_speed: f64,
        throttle: f64,
    },
    /// Level acceleration at constant throttle.
    AccelerationConstantThrottle {
        altitude: Option<f64>,
        air_speed_start: Option<f64>,
        air_speed_end: f64,
        throttle: f64,
    },
}

/// Force residual rows requested from the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Default for ForceAxes {
    fn default() -> Self {
        Self {
            x: true,
            y: false,
            z: true,
        }
    }
}

/// Start values of a segment after chaining.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    /// m
    pub altitude: f64,
    /// m/s
    pub air_speed: f64,
}

/// Flight path over the control points.
#[derive(Clone, Debug, PartialEq)]
pub struct Kinematics {
    pub duration: f64,
    pub altitude: Vec<f64>,
    /// Inertial velocity, forward and up, m/s.
    pub velocity_x: Vec<f64>,
    pub velocity_z: Vec<f64>,
}

fn finite(v: f64, what: &str) -> Result<(), String> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(format!("{what} must be finite"))
    }
}

fn positive(v: f64, what: &str) -> Result<(), String> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be positive"))
    }
}

impl SegmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Cruise { .. } => "cruise",
            SegmentKind::ClimbConstantRate { .. } => "climb_constant_rate",
            SegmentKind::ClimbConstantThrottle { .. } => "climb_constant_throttle",
            SegmentKind::AccelerationConstantThrottle { .. } => "acceleration_constant_throttle",
        }
    }

    /// Checks that do not depend on the previous segment.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            SegmentKind::Cruise {
                altitude,
                air_speed,
                distance,
            } => {
                if let Some(h) = altitude {
                    finite(h, "altitude")?;
                }
                positive(air_speed, "air speed")?;
                positive(distance, "distance")
            }
            SegmentKind::ClimbConstantRate {
                altitude_start,
                altitude_end,
                air_speed,
                climb_rate,
            } => {
                finite(altitude_end, "end altitude")?;
                positive(air_speed, "air speed")?;
                finite(climb_rate, "climb rate")?;
                if climb_rate == 0.0 {
                    return Err("climb rate must be non-zero".into());
                }
                if climb_rate.abs() >= air_speed {
                    return Err("climb rate must be smaller than the air speed".into());
                }
                match altitude_start {
                    Some(h0) => check_climb_direction(h0, altitude_end, climb_rate),
                    None => Ok(()),
                }
            }
            SegmentKind::ClimbConstantThrottle {
                altitude_start,
                altitude_end,
                air_speed,
                throttle,
            } => {
                finite(altitude_end, "end altitude")?;
                positive(air_speed, "air speed")?;
                finite(throttle, "throttle")?;
                if altitude_start == Some(altitude_end) {
                    return Err("start and end altitude coincide".into());
                }
                Ok(())
            }
            SegmentKind::AccelerationConstantThrottle {
                altitude,
                air_speed_start,
                air_speed_end,
                throttle,
            } => {
                if let Some(h) = altitude {
                    finite(h, "altitude")?;
                }
                if let Some(v0) = air_speed_start {
                    positive(v0, "start air speed")?;
                    if v0 == air_speed_end {
                        return Err("start and end air speed coincide".into());
                    }
                }
                positive(air_speed_end, "end air speed")?;
                finite(throttle, "throttle")
            }
        }
    }

    /// Resolve start values against the chained `altitude` and `air_speed`.
    pub fn resolve(&self, altitude: Option<f64>, air_speed: Option<f64>) -> Result<Boundary, String> {
        let need = |v: Option<f64>, what: &str| {
            v.filter(|v| v.is_finite())
                .ok_or_else(|| format!("{what} not given and no previous segment provides it"))
        };
        let boundary = match *self {
            SegmentKind::Cruise {
                altitude: h,
                air_speed: v,
                ..
            } => Boundary {
                altitude: need(h.or(altitude), "altitude")?,
                air_speed: v,
            },
            SegmentKind::ClimbConstantRate {
                altitude_start,
                altitude_end,
                air_speed,
                climb_rate,
            } => {
                let h0 = need(altitude_start.or(altitude), "start altitude")?;
                check_climb_direction(h0, altitude_end, climb_rate)?;
                Boundary {
                    altitude: h0,
                    air_speed,
                }
            }
            SegmentKind::ClimbConstantThrottle {
                altitude_start,
                altitude_end,
                air_speed,
                ..
            } => {
                let h0 = need(altitude_start.or(altitude), "start altitude")?;
                if h0 == altitude_end {
                    return Err("start and end altitude coincide".into());
                }
                Boundary {
                    altitude: h0,
                    air_speed,
                }
            }
            SegmentKind::AccelerationConstantThrottle {
                altitude: h,
                air_speed_start,
                air_speed_end,
                ..
            } => {
                let v0 = need(air_speed_start.or(air_speed), "start air speed")?;
                if v0 == air_speed_end {
                    return Err("start and end air speed coincide".into());
                }
                Boundary {
                    altitude: need(h.or(altitude), "altitude")?,
                    air_speed: v0,
                }
            }
        };
        Ok(boundary)
    }

    /// Throttle of the segment's assigned groups when it is fixed.
    pub fn fixed_throttle(&self) -> Option<f64> {
        match *self {
            SegmentKind::ClimbConstantThrottle { throttle, .. }
            | SegmentKind::AccelerationConstantThrottle { throttle, .. } => Some(throttle),
            _ => None,
        }
    }

    pub(crate) fn forces_x_length(&self) -> EntryLength {
        match self {
            SegmentKind::AccelerationConstantThrottle { .. } => EntryLength::Interior,
            _ => EntryLength::PerPoint,
        }
    }

    pub fn unknowns(
        &self,
        boundary: &Boundary,
        fixed_body_angle: Option<f64>,
        n: usize,
    ) -> Vec<UnknownSpec> {
        let mut out = Vec::new();
        match *self {
            SegmentKind::Cruise { .. } | SegmentKind::ClimbConstantRate { .. } => {
                out.push(UnknownSpec::uniform(
                    THROTTLE,
                    FORCES_X,
                    EntryLength::PerPoint,
                    INITIAL_THROTTLE,
                ));
            }
            SegmentKind::ClimbConstantThrottle {
                altitude_end,
                air_speed,
                ..
            } => {
                let dh = altitude_end - boundary.altitude;
                let gamma = INITIAL_WIND_ANGLE.copysign(dh);
                out.push(UnknownSpec::uniform(
                    WIND_ANGLE,
                    FORCES_X,
                    EntryLength::PerPoint,
                    gamma,
                ));
                out.push(UnknownSpec::uniform(
                    ELAPSED_TIME,
                    FINAL_ALTITUDE,
                    EntryLength::Scalar,
                    (dh / (air_speed * gamma.sin())).abs(),
                ));
            }
            SegmentKind::AccelerationConstantThrottle { air_speed_end, .. } => {
                let v0 = boundary.air_speed;
                let last = n.saturating_sub(1).max(1) as f64;
                let ramp = (1..n)
                    .map(|i| v0 + (air_speed_end - v0) * i as f64 / last)
                    .collect();
                out.push(UnknownSpec::with_values(
                    VELOCITY,
                    FORCES_X,
                    EntryLength::Interior,
                    ramp,
                ));
                out.push(UnknownSpec::uniform(
                    ELAPSED_TIME,
                    FINAL_VELOCITY,
                    EntryLength::Scalar,
                    ((air_speed_end - v0).abs() / INITIAL_ACCELERATION).max(1.0),
                ));
            }
        }
        if fixed_body_angle.is_none() {
            out.push(UnknownSpec::uniform(
                BODY_ANGLE,
                FORCES_Z,
                EntryLength::PerPoint,
                INITIAL_BODY_ANGLE,
            ));
        }
        out
    }

    pub fn residuals(&self, axes: ForceAxes) -> Vec<ResidualSpec> {
        let mut out = Vec::new();
        if axes.x {
            out.push(ResidualSpec::new(FORCES_X, self.forces_x_length()));
        }
        if axes.y {
            out.push(ResidualSpec::new(FORCES_Y, EntryLength::PerPoint));
        }
        if axes.z {
            out.push(ResidualSpec::new(FORCES_Z, EntryLength::PerPoint));
        }
        match self {
            SegmentKind::ClimbConstantThrottle { .. } => {
                out.push(ResidualSpec::new(FINAL_ALTITUDE, EntryLength::Scalar));
            }
            SegmentKind::AccelerationConstantThrottle { .. } => {
                out.push(ResidualSpec::new(FINAL_VELOCITY, EntryLength::Scalar));
            }
            _ => {}
        }
        out
    }

    /// Flight path for the unknowns in `x`.
    pub fn kinematics(
        &self,
        boundary: &Boundary,
        system: &SystemLayout,
        x: &DVector<f64>,
        discretization: &Discretization,
    ) -> MissionResult<Kinematics> {
        let n = discretization.len();
        let h0 = boundary.altitude;
        let kinematics = match *self {
            SegmentKind::Cruise {
                air_speed,
                distance,
                ..
            } => Kinematics {
                duration: distance / air_speed,
                altitude: vec![h0; n],
                velocity_x: vec![air_speed; n],
                velocity_z: vec![0.0; n],
            },
            SegmentKind::ClimbConstantRate {
                altitude_end,
                air_speed,
                climb_rate,
                ..
            } => {
                let duration = (altitude_end - h0) / climb_rate;
                let gamma = (climb_rate / air_speed).asin();
                Kinematics {
                    duration,
                    altitude: discretization
                        .points
                        .iter()
                        .map(|p| h0 + climb_rate * p * duration)
                        .collect(),
                    velocity_x: vec![air_speed * gamma.cos(); n],
                    velocity_z: vec![climb_rate; n],
                }
            }
            SegmentKind::ClimbConstantThrottle { air_speed, .. } => {
                let gamma = system.unknown(x, WIND_ANGLE)?;
                let duration = system.unknown(x, ELAPSED_TIME)?[0].max(MIN_DURATION);
                let velocity_x: Vec<f64> = gamma.iter().map(|g| air_speed * g.cos()).collect();
                let velocity_z: Vec<f64> = gamma.iter().map(|g| air_speed * g.sin()).collect();
                let altitude = discretization
                    .integrate(&velocity_z, duration)
                    .into_iter()
                    .map(|dh| h0 + dh)
                    .collect();
                Kinematics {
                    duration,
                    altitude,
                    velocity_x,
                    velocity_z,
                }
            }
            SegmentKind::AccelerationConstantThrottle { .. } => {
                let interior = system.unknown(x, VELOCITY)?;
                let duration = system.unknown(x, ELAPSED_TIME)?[0].max(MIN_DURATION);
                let mut velocity_x = Vec::with_capacity(n);
                velocity_x.push(boundary.air_speed);
                velocity_x.extend_from_slice(interior);
                Kinematics {
                    duration,
                    altitude: vec![h0; n],
                    velocity_x,
                    velocity_z: vec![0.0; n],
                }
            }
        };
        Ok(kinematics)
    }

    /// Kind-specific closure residuals.
    pub fn boundary_residuals(&self, boundary: &Boundary, kinematics: &Kinematics) -> BTreeMap<String, Vec<f64>> {
        let mut out = BTreeMap::new();
        match *self {
            SegmentKind::ClimbConstantThrottle { altitude_end, .. } => {
                let reached = kinematics.altitude.last().copied().unwrap_or(boundary.altitude);
                let scale = (altitude_end - boundary.altitude).abs().max(1.0);
                out.insert(
                    FINAL_ALTITUDE.to_string(),
                    vec![(reached - altitude_end) / scale],
                );
            }
            SegmentKind::AccelerationConstantThrottle { air_speed_end, .. } => {
                let reached = kinematics
                    .velocity_x
                    .last()
                    .copied()
                    .unwrap_or(boundary.air_speed);
                out.insert(
                    FINAL_VELOCITY.to_string(),
                    vec![(reached - air_speed_end) / air_speed_end.max(1.0)],
                );
            }
            _ => {}
        }
        out
    }
}

fn check_climb_direction(h0: f64, h_end: f64, rate: f64) -> Result<(), String> {
    let dh = h_end - h0;
    if dh == 0.0 || dh.signum() != rate.signum() {
        return Err(format!(
            "climb rate {rate} cannot take the aircraft from {h0} m to {h_end} m"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climb_rate_must_match_direction() {
        let kind = SegmentKind::ClimbConstantRate {
            altitude_start: Some(1000.0),
            altitude_end: 500.0,
            air_speed: 50.0,
            climb_rate: 2.0,
        };
        assert!(kind.validate().is_err());
        let descent = SegmentKind::ClimbConstantRate {
            altitude_start: Some(1000.0),
            altitude_end: 500.0,
            air_speed: 50.0,
            climb_rate: -2.0,
        };
        assert!(descent.validate().is_ok());
    }

    #[test]
    fn climb_rate_faster_than_air_speed_rejected() {
        let kind = SegmentKind::ClimbConstantRate {
            altitude_start: None,
            altitude_end: 500.0,
            air_speed: 10.0,
            climb_rate: 12.0,
        };
        assert!(kind.validate().is_err());
    }

    #[test]
    fn missing_start_needs_previous_segment() {
        let kind = SegmentKind::Cruise {
            altitude: None,
            air_speed: 25.0,
            distance: 1000.0,
        };
        assert!(kind.resolve(None, None).is_err());
        let b = kind.resolve(Some(300.0), Some(20.0)).unwrap();
        assert_eq!(b.altitude, 300.0);
        assert_eq!(b.air_speed, 25.0);
    }

    #[test]
    fn acceleration_layout_is_square() {
        let kind = SegmentKind::AccelerationConstantThrottle {
            altitude: Some(1000.0),
            air_speed_start: Some(100.0),
            air_speed_end: 120.0,
            throttle: 0.9,
        };
        let b = kind.resolve(None, None).unwrap();
        let n = 6;
        let layout = SystemLayout::pair(
            &kind.unknowns(&b, None, n),
            &kind.residuals(ForceAxes::default()),
            n,
        )
        .unwrap();
        assert_eq!(layout.size(), (n - 1) + 1 + n);
        let x = layout.initial();
        assert_eq!(*layout.unknown(&x, VELOCITY).unwrap().last().unwrap(), 120.0);
    }

    #[test]
    fn constant_rate_kinematics() {
        let kind = SegmentKind::ClimbConstantRate {
            altitude_start: Some(0.0),
            altitude_end: 300.0,
            air_speed: 30.0,
            climb_rate: 3.0,
        };
        let b = kind.resolve(None, None).unwrap();
        let d = Discretization::chebyshev(5).unwrap();
        let layout = SystemLayout::pair(
            &kind.unknowns(&b, None, 5),
            &kind.residuals(ForceAxes::default()),
            5,
        )
        .unwrap();
        let k = kind.kinematics(&b, &layout, &layout.initial(), &d).unwrap();
        assert_eq!(k.duration, 100.0);
        assert!((k.altitude[4] - 300.0).abs() < 1e-9);
        let speed = (k.velocity_x[0].powi(2) + k.velocity_z[0].powi(2)).sqrt();
        assert!((speed - 30.0).abs() < 1e-12);
    }

    #[test]
    fn side_force_axis_leaves_residual_unpaired() {
        let kind = SegmentKind::Cruise {
            altitude: Some(0.0),
            air_speed: 25.0,
            distance: 100.0,
        };
        let b = kind.resolve(None, None).unwrap();
        let axes = ForceAxes {
            y: true,
            ..ForceAxes::default()
        };
        let err = SystemLayout::pair(&kind.unknowns(&b, None, 4), &kind.residuals(axes), 4);
        assert!(err.is_err());
    }

    #[test]
    fn kind_serde_is_tagged() {
        let kind: SegmentKind = serde_json::from_str(
            r#"{"kind":"cruise","air_speed":25.0,"distance":1000.0}"#,
        )
        .unwrap();
        assert_eq!(
            kind,
            SegmentKind::Cruise {
                altitude: None,
                air_speed: 25.0,
                distance: 1000.0
            }
        );
    }
}
