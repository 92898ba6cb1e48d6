//! Mission segments: unknown setup, residual evaluation and solve.
//!
//! A segment discretizes its time span on Chebyshev points and solves for
//! trim. Each evaluation runs the same pipeline:
//!
//! ```text
//! kinematics -> freestream -> body angle, angle of attack
//!            -> aerodynamic forces (wind axes, rotated to inertial)
//!            -> energy network (thrust in body axes, rotated by theta)
//!            -> mass = m0 - ∫ fuel flow
//!            -> R = (F/m - dV/dt) / g  per force axis
//! ```
//!
//! Inertial axes are x forward and z up.

use crate::aerodynamics::AeroInputs;
use crate::chebyshev::Discretization;
use crate::energy_network::{NetworkInputs, NetworkLayout, NetworkSeed, evaluate_network};
use crate::error::{ConfigError, MissionError, MissionResult};
use crate::kinds::{
    BODY_ANGLE, Boundary, FORCES_X, FORCES_Y, FORCES_Z, ForceAxes, SegmentKind, THROTTLE,
};
use crate::results::{SegmentResult, SegmentStatus};
use crate::unknowns::{EntryLength, SystemLayout};
use crate::vehicle::Vehicle;
use am_atmosphere::Freestream;
use am_solver::{SolveSettings, SolverResult, solver_for};
use am_state::{Conditions, Series};
use nalgebra::DVector;
use std::collections::BTreeMap;

pub const DEFAULT_CONTROL_POINTS: usize = 16;

const TIME: &str = "frames.inertial.time";
const POSITION: &str = "frames.inertial.position_vector";
const TOTAL_MASS: &str = "weights.total_mass";

/// Chained start state read from row 0 of a segment's conditions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSeed {
    /// s
    pub time: f64,
    /// Distance flown, m.
    pub range: f64,
    pub altitude: Option<f64>,
    pub air_speed: Option<f64>,
    /// kg
    pub mass: f64,
}

impl SegmentSeed {
    pub fn capture(conditions: &Conditions, mass_takeoff: f64) -> Self {
        let first = |path: &str, col: usize| {
            conditions
                .deep_get(path)
                .ok()
                .and_then(|s| s.get(0, col))
                .filter(|v| v.is_finite())
        };
        Self {
            time: first(TIME, 0).unwrap_or(0.0),
            range: first(POSITION, 0).unwrap_or(0.0),
            altitude: first(POSITION, 2).or_else(|| first("freestream.altitude", 0)),
            air_speed: first("freestream.velocity", 0),
            mass: first(TOTAL_MASS, 0).unwrap_or(mass_takeoff),
        }
    }
}

/// Everything fixed between initialization and the end of a solve.
#[derive(Clone, Debug)]
struct Prepared {
    discretization: Discretization,
    system: SystemLayout,
    network: NetworkLayout,
    network_seed: NetworkSeed,
    seed: SegmentSeed,
    boundary: Boundary,
    /// Per network throttle group: driven by the segment throttle.
    assigned: Vec<bool>,
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub tag: String,
    pub kind: SegmentKind,
    pub control_points: usize,
    pub force_axes: ForceAxes,
    /// Hold the body angle instead of solving for it, rad.
    pub fixed_body_angle: Option<f64>,
    /// Throttle groups driven by the segment throttle. Empty means all.
    pub throttle_groups: Vec<String>,
    /// Throttle of the remaining groups. Missing groups idle.
    pub fixed_throttles: BTreeMap<String, f64>,
    pub settings: SolveSettings,
    pub conditions: Conditions,
    status: SegmentStatus,
    prepared: Option<Prepared>,
}

impl Segment {
    pub fn new(tag: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            tag: tag.into(),
            kind,
            control_points: DEFAULT_CONTROL_POINTS,
            force_axes: ForceAxes::default(),
            fixed_body_angle: None,
            throttle_groups: Vec::new(),
            fixed_throttles: BTreeMap::new(),
            settings: SolveSettings::default(),
            conditions: Conditions::new(),
            status: SegmentStatus::Uninitialized,
            prepared: None,
        }
    }

    pub fn with_control_points(mut self, n: usize) -> Self {
        self.control_points = n;
        self
    }

    pub fn with_force_axes(mut self, axes: ForceAxes) -> Self {
        self.force_axes = axes;
        self
    }

    pub fn with_fixed_body_angle(mut self, angle: f64) -> Self {
        self.fixed_body_angle = Some(angle);
        self
    }

    pub fn with_throttle_groups(mut self, groups: Vec<String>) -> Self {
        self.throttle_groups = groups;
        self
    }

    pub fn with_fixed_throttle(mut self, group: impl Into<String>, throttle: f64) -> Self {
        self.fixed_throttles.insert(group.into(), throttle);
        self
    }

    pub fn with_settings(mut self, settings: SolveSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn status(&self) -> SegmentStatus {
        self.status
    }

    fn invalid(&self, what: impl Into<String>) -> ConfigError {
        ConfigError::InvalidSegment {
            segment: self.tag.clone(),
            what: what.into(),
        }
    }

    /// Checks that need no vehicle and no previous segment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.is_empty() || self.tag.contains('.') {
            return Err(self.invalid("tag must be non-empty and contain no '.'"));
        }
        if self.control_points < 2 {
            return Err(self.invalid("at least 2 control points are required"));
        }
        if let Some(theta) = self.fixed_body_angle {
            if !theta.is_finite() {
                return Err(self.invalid("fixed body angle must be finite"));
            }
        }
        if self.fixed_throttles.values().any(|t| !t.is_finite()) {
            return Err(self.invalid("fixed throttles must be finite"));
        }
        self.kind.validate().map_err(|what| self.invalid(what))
    }

    /// Resolve chained start values, size the state and pair unknowns with
    /// residuals.
    pub fn initialize(&mut self, vehicle: &Vehicle) -> MissionResult<()> {
        self.validate()?;
        let n = self.control_points;
        let groups = vehicle.network.groups();
        for name in self.throttle_groups.iter().chain(self.fixed_throttles.keys()) {
            if !groups.iter().any(|g| &g.tag == name) {
                return Err(self.invalid(format!("no throttle group '{name}'")).into());
            }
        }
        let assigned = groups
            .iter()
            .map(|g| self.throttle_groups.is_empty() || self.throttle_groups.contains(&g.tag))
            .collect();

        self.conditions.expand_override(n)?;
        let seed = SegmentSeed::capture(&self.conditions, vehicle.mass_takeoff);
        let boundary = self
            .kind
            .resolve(seed.altitude, seed.air_speed)
            .map_err(|what| self.invalid(what))?;
        let ambient = vehicle.atmosphere.state(boundary.altitude)?;
        let network_seed = NetworkSeed::capture(
            vehicle,
            &self.conditions,
            ambient.temperature.value,
        )?;

        let network = NetworkLayout::new(vehicle)?;
        let mut unknowns = self.kind.unknowns(&boundary, self.fixed_body_angle, n);
        unknowns.extend(network.unknowns());
        let mut residuals = self.kind.residuals(self.force_axes);
        residuals.extend(network.residuals());
        let system = SystemLayout::pair(&unknowns, &residuals, n)?;

        tracing::debug!(
            segment = %self.tag,
            kind = self.kind.name(),
            unknowns = system.size(),
            "segment initialized"
        );
        self.prepared = Some(Prepared {
            discretization: Discretization::chebyshev(n)?,
            system,
            network,
            network_seed,
            seed,
            boundary,
            assigned,
        });
        self.status = SegmentStatus::UnknownsSet;
        Ok(())
    }

    /// Initial guess of the paired unknowns.
    pub fn initial_guess(&self) -> MissionResult<DVector<f64>> {
        Ok(self.prepared()?.system.initial())
    }

    fn prepared(&self) -> MissionResult<&Prepared> {
        self.prepared.as_ref().ok_or(MissionError::InvalidArg {
            what: "segment is not initialized",
        })
    }

    /// Evaluate the residual vector at `x` and record the state.
    pub fn evaluate(&mut self, vehicle: &Vehicle, x: &DVector<f64>) -> MissionResult<DVector<f64>> {
        let prepared = self.prepared.as_ref().ok_or(MissionError::InvalidArg {
            what: "segment is not initialized",
        })?;
        let problem = SegmentProblem {
            kind: &self.kind,
            vehicle,
            prepared,
            fixed_body_angle: self.fixed_body_angle,
            force_axes: self.force_axes,
            fixed_throttles: &self.fixed_throttles,
        };
        let residual = problem.evaluate(x, &mut self.conditions)?;
        self.status = SegmentStatus::Evaluated;
        Ok(residual)
    }

    /// Initialize, solve and record the converged (or best) state.
    ///
    /// Non-convergence is reported in the result, not as an error.
    pub fn solve(&mut self, vehicle: &Vehicle) -> MissionResult<SegmentResult> {
        self.initialize(vehicle)?;
        let prepared = self.prepared.as_ref().ok_or(MissionError::InvalidArg {
            what: "segment is not initialized",
        })?;
        let problem = SegmentProblem {
            kind: &self.kind,
            vehicle,
            prepared,
            fixed_body_angle: self.fixed_body_angle,
            force_axes: self.force_axes,
            fixed_throttles: &self.fixed_throttles,
        };
        let tag = self.tag.as_str();
        let conditions = &mut self.conditions;

        let outcome = {
            let mut residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
                match problem.evaluate(x, conditions) {
                    Ok(r) => Ok(r),
                    Err(err) => {
                        tracing::debug!(segment = tag, error = %err, "evaluation failed");
                        Ok(DVector::from_element(x.len(), f64::INFINITY))
                    }
                }
            };
            solver_for(self.settings.method).solve(
                &mut residual,
                prepared.system.initial(),
                &self.settings,
            )?
        };

        let recorded = match problem.evaluate(&outcome.x, conditions) {
            Ok(_) => true,
            Err(err) if err.is_config() => return Err(err),
            Err(err) => {
                tracing::warn!(segment = tag, error = %err, "final state could not be evaluated");
                false
            }
        };
        let converged = outcome.converged && recorded;
        if converged {
            tracing::debug!(
                segment = tag,
                evaluations = outcome.evaluations,
                iterations = outcome.iterations,
                "segment converged"
            );
        } else {
            tracing::warn!(
                segment = tag,
                evaluations = outcome.evaluations,
                residual_norm = outcome.residual_norm,
                "segment did not converge"
            );
        }
        self.status = if converged {
            SegmentStatus::Converged
        } else {
            SegmentStatus::Failed
        };
        Ok(SegmentResult {
            tag: self.tag.clone(),
            status: self.status,
            converged,
            evaluations: outcome.evaluations,
            residual_norm: outcome.residual_norm,
            conditions: self.conditions.clone(),
        })
    }
}

/// Borrowed view of a segment for one residual evaluation.
struct SegmentProblem<'a> {
    kind: &'a SegmentKind,
    vehicle: &'a Vehicle,
    prepared: &'a Prepared,
    fixed_body_angle: Option<f64>,
    force_axes: ForceAxes,
    fixed_throttles: &'a BTreeMap<String, f64>,
}

impl SegmentProblem<'_> {
    fn evaluate(&self, x: &DVector<f64>, conditions: &mut Conditions) -> MissionResult<DVector<f64>> {
        let p = self.prepared;
        let vehicle = self.vehicle;
        let d = &p.discretization;
        let n = d.len();

        let k = self.kind.kinematics(&p.boundary, &p.system, x, d)?;
        if !k.duration.is_finite() || k.duration <= 0.0 {
            return Err(MissionError::NonPhysical {
                what: "segment duration must be positive",
            });
        }
        let time = d.time_grid(p.seed.time, k.duration);
        let range: Vec<f64> = d
            .integrate(&k.velocity_x, k.duration)
            .into_iter()
            .map(|s| p.seed.range + s)
            .collect();
        let accel_x = d.differentiate(&k.velocity_x, k.duration);
        let accel_z = d.differentiate(&k.velocity_z, k.duration);

        let freestream = (0..n)
            .map(|i| {
                let speed = k.velocity_x[i].hypot(k.velocity_z[i]);
                Freestream::at(vehicle.atmosphere.as_ref(), k.altitude[i], speed)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let gamma: Vec<f64> = (0..n)
            .map(|i| k.velocity_z[i].atan2(k.velocity_x[i]))
            .collect();
        let theta = match self.fixed_body_angle {
            Some(angle) => vec![angle; n],
            None => p.system.unknown(x, BODY_ANGLE)?.to_vec(),
        };

        let segment_throttle = match self.kind.fixed_throttle() {
            Some(t) => vec![t; n],
            None => p.system.unknown(x, THROTTLE)?.to_vec(),
        };
        let group_throttle: Vec<Vec<f64>> = vehicle
            .network
            .groups()
            .iter()
            .zip(&p.assigned)
            .map(|(g, &assigned)| {
                if assigned {
                    segment_throttle.clone()
                } else {
                    vec![self.fixed_throttles.get(&g.tag).copied().unwrap_or(0.0); n]
                }
            })
            .collect();
        let (bus_voltage, rotor_speed) = p.network.unpack(&p.system, x)?;
        let inputs = NetworkInputs {
            time: &time,
            duration: k.duration,
            discretization: d,
            freestream: &freestream,
            group_throttle: &group_throttle,
            bus_voltage: &bus_voltage,
            rotor_speed: &rotor_speed,
        };
        let network = evaluate_network(vehicle, &p.network, &p.network_seed, &inputs, conditions)?;

        let burned = d.integrate(&network.fuel_mass_rate, k.duration);
        let mass: Vec<f64> = burned.iter().map(|b| p.seed.mass - b).collect();
        if mass.iter().any(|m| !m.is_finite() || *m <= 0.0) {
            return Err(MissionError::NonPhysical {
                what: "vehicle mass must stay positive",
            });
        }

        let s_ref = vehicle.reference_area;
        let mut alpha = vec![0.0; n];
        let mut cl = vec![0.0; n];
        let mut cd = vec![0.0; n];
        let mut lift = vec![0.0; n];
        let mut drag = vec![0.0; n];
        let mut aero_x = vec![0.0; n];
        let mut aero_z = vec![0.0; n];
        let mut thrust_x = vec![0.0; n];
        let mut thrust_z = vec![0.0; n];
        let mut weight = vec![0.0; n];
        let mut force_x = vec![0.0; n];
        let mut force_z = vec![0.0; n];
        let mut residual_x = vec![0.0; n];
        let mut residual_z = vec![0.0; n];

        for i in 0..n {
            let fs = &freestream[i];
            alpha[i] = theta[i] - gamma[i];
            let coefficients = vehicle.aerodynamics.coefficients(&AeroInputs {
                angle_of_attack: alpha[i],
                sideslip: 0.0,
                mach_number: fs.mach_number,
                reynolds_per_length: fs.reynolds_per_length,
            })?;
            cl[i] = coefficients.lift;
            cd[i] = coefficients.drag;
            lift[i] = fs.dynamic_pressure * s_ref * cl[i];
            drag[i] = fs.dynamic_pressure * s_ref * cd[i];

            let (sin_g, cos_g) = gamma[i].sin_cos();
            aero_x[i] = -drag[i] * cos_g - lift[i] * sin_g;
            aero_z[i] = -drag[i] * sin_g + lift[i] * cos_g;

            let (sin_t, cos_t) = theta[i].sin_cos();
            thrust_x[i] = network.thrust_x[i] * cos_t - network.thrust_z[i] * sin_t;
            thrust_z[i] = network.thrust_x[i] * sin_t + network.thrust_z[i] * cos_t;

            weight[i] = -mass[i] * fs.gravity;
            force_x[i] = aero_x[i] + thrust_x[i];
            force_z[i] = aero_z[i] + thrust_z[i] + weight[i];
            residual_x[i] = (force_x[i] / mass[i] - accel_x[i]) / fs.gravity;
            residual_z[i] = (force_z[i] / mass[i] - accel_z[i]) / fs.gravity;
        }

        let mut residuals = network.residuals;
        if self.force_axes.x {
            let rx = match self.kind.forces_x_length() {
                EntryLength::Interior => residual_x[1..].to_vec(),
                _ => residual_x,
            };
            residuals.insert(FORCES_X.to_string(), rx);
        }
        if self.force_axes.y {
            residuals.insert(FORCES_Y.to_string(), vec![0.0; n]);
        }
        if self.force_axes.z {
            residuals.insert(FORCES_Z.to_string(), residual_z);
        }
        residuals.extend(self.kind.boundary_residuals(&p.boundary, &k));

        let zeros = vec![0.0; n];
        let zeros = zeros.as_slice();
        let vector = |x: &[f64], z: &[f64]| Series::from_columns(&[x, zeros, z]);
        conditions.set_values(TIME, &time)?;
        conditions.deep_set(POSITION, vector(&range, &k.altitude)?)?;
        conditions.deep_set(
            "frames.inertial.velocity_vector",
            vector(&k.velocity_x, &k.velocity_z)?,
        )?;
        conditions.deep_set(
            "frames.inertial.acceleration_vector",
            vector(&accel_x, &accel_z)?,
        )?;
        conditions.deep_set(
            "frames.inertial.total_force_vector",
            vector(&force_x, &force_z)?,
        )?;
        conditions.deep_set(
            "frames.inertial.gravity_force_vector",
            vector(zeros, &weight)?,
        )?;
        conditions.deep_set(
            "frames.inertial.aerodynamic_force_vector",
            vector(&aero_x, &aero_z)?,
        )?;
        conditions.deep_set(
            "frames.inertial.thrust_force_vector",
            vector(&thrust_x, &thrust_z)?,
        )?;
        conditions.deep_set(
            "frames.body.inertial_rotations",
            Series::from_columns(&[zeros, theta.as_slice(), zeros])?,
        )?;
        conditions.deep_set(
            "frames.wind.inertial_rotations",
            Series::from_columns(&[zeros, gamma.as_slice(), zeros])?,
        )?;
        record_freestream(conditions.scope_mut("freestream")?, &freestream)?;
        let aero = conditions.scope_mut("aerodynamics")?;
        aero.set_values("angle_of_attack", &alpha)?;
        aero.set_values("coefficients.lift", &cl)?;
        aero.set_values("coefficients.drag", &cd)?;
        aero.set_values("lift_force", &lift)?;
        aero.set_values("drag_force", &drag)?;
        let weights = conditions.scope_mut("weights")?;
        weights.set_values("total_mass", &mass)?;
        weights.set_values(
            "vehicle_mass_rate",
            &network.fuel_mass_rate.iter().map(|m| -m).collect::<Vec<_>>(),
        )?;

        p.system.assemble(&residuals)
    }
}

fn record_freestream(scope: &mut Conditions, freestream: &[Freestream]) -> MissionResult<()> {
    let fields: [(&str, fn(&Freestream) -> f64); 11] = [
        ("altitude", |f| f.altitude),
        ("velocity", |f| f.velocity),
        ("density", |f| f.density),
        ("pressure", |f| f.pressure),
        ("temperature", |f| f.temperature),
        ("speed_of_sound", |f| f.speed_of_sound),
        ("dynamic_viscosity", |f| f.dynamic_viscosity),
        ("mach_number", |f| f.mach_number),
        ("dynamic_pressure", |f| f.dynamic_pressure),
        ("reynolds_per_length", |f| f.reynolds_per_length),
        ("gravity", |f| f.gravity),
    ];
    for (key, field) in fields {
        let values: Vec<f64> = freestream.iter().map(field).collect();
        scope.set_values(key, &values)?;
    }
    Ok(())
}
