//! Blade-element momentum rotor model.
//!
//! Blade discretized into annular stations at r = radius/R. At each
//! station the combined blade-element / momentum inflow is solved with the
//! Prandtl tip-loss factor by fixed-point iteration:
//!
//! ```text
//! a  = σ·Clα/(16F) − λc/2
//! λ  = sqrt(a² + σ·Clα·θ·r/(8F)) − a
//! f  = B/2 · (1 − r)/λ
//! F  = (2/π)·acos(exp(−f))
//! ```
//!
//! Loads are integrated in rotorcraft coefficient form:
//!
//! ```text
//! dCT = ½σ(r² + λ²)(Cl cosφ − Cd sinφ) dr
//! dCQ = ½σ(r² + λ²)(Cl sinφ + Cd cosφ) r dr
//! T = CT·ρπR²(ΩR)²,  Q = CQ·ρπR²(ΩR)²R,  P = QΩ
//! ```

use crate::common::{OMEGA_MIN, check_finite, check_positive};
use crate::error::{PropulsionError, PropulsionResult};
use am_atmosphere::Freestream;
use std::f64::consts::PI;

const TIP_LOSS_MAX_ITER: usize = 50;
const TIP_LOSS_TOL: f64 = 1e-10;
const TIP_LOSS_FLOOR: f64 = 1e-4;
const INFLOW_FLOOR: f64 = 1e-6;

/// Linear-lift, parabolic-drag section polar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Airfoil {
    /// Lift curve slope, 1/rad.
    pub lift_slope: f64,
    /// Zero-lift angle of attack, rad.
    pub zero_lift_angle: f64,
    pub cl_max: f64,
    pub cd0: f64,
    pub cd2: f64,
}

impl Default for Airfoil {
    fn default() -> Self {
        Self {
            lift_slope: 2.0 * PI,
            zero_lift_angle: 0.0,
            cl_max: 1.4,
            cd0: 0.012,
            cd2: 0.01,
        }
    }
}

impl Airfoil {
    pub fn lift(&self, alpha: f64) -> f64 {
        (self.lift_slope * (alpha - self.zero_lift_angle)).clamp(-self.cl_max, self.cl_max)
    }

    pub fn drag(&self, cl: f64) -> f64 {
        self.cd0 + self.cd2 * cl * cl
    }
}

/// Planform parameters shared by the rotor constructors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotorGeometry {
    pub tip_radius: f64,
    pub hub_radius: f64,
    pub number_of_blades: u32,
    pub station_count: usize,
}

impl RotorGeometry {
    fn validate(&self) -> PropulsionResult<()> {
        check_positive(self.tip_radius, "tip radius")?;
        check_finite(self.hub_radius, "hub radius")?;
        if self.hub_radius < 0.0 || self.hub_radius >= self.tip_radius {
            return Err(PropulsionError::InvalidArg {
                what: "hub radius must lie in [0, tip radius)",
            });
        }
        if self.number_of_blades == 0 {
            return Err(PropulsionError::InvalidArg {
                what: "number of blades",
            });
        }
        if self.station_count < 2 {
            return Err(PropulsionError::InvalidArg {
                what: "at least two blade stations",
            });
        }
        Ok(())
    }

    /// Station midpoints and widths in r/R.
    fn stations(&self) -> (Vec<f64>, Vec<f64>) {
        let r0 = self.hub_radius / self.tip_radius;
        let dr = (1.0 - r0) / self.station_count as f64;
        let stations = (0..self.station_count)
            .map(|i| r0 + (i as f64 + 0.5) * dr)
            .collect();
        (stations, vec![dr; self.station_count])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rotor {
    pub tip_radius: f64,
    pub hub_radius: f64,
    pub number_of_blades: u32,
    /// Station midpoints, r/R.
    pub stations: Vec<f64>,
    /// Station widths, dr/R.
    pub widths: Vec<f64>,
    /// Chord at each station, m.
    pub chord: Vec<f64>,
    /// Geometric pitch at each station, rad.
    pub twist: Vec<f64>,
    pub airfoil: Airfoil,
    /// rad/s
    pub design_rotor_speed: f64,
}

/// Integrated rotor loads at one operating point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotorPerformance {
    pub thrust: f64,
    pub torque: f64,
    pub power: f64,
    pub thrust_coefficient: f64,
    pub power_coefficient: f64,
    pub efficiency: f64,
    pub tip_mach: f64,
}

impl Rotor {
    /// Constant chord, linear twist from root to tip.
    pub fn linear(
        geometry: RotorGeometry,
        chord: f64,
        twist_root: f64,
        twist_tip: f64,
        airfoil: Airfoil,
        design_rotor_speed: f64,
    ) -> PropulsionResult<Self> {
        geometry.validate()?;
        let (stations, widths) = geometry.stations();
        let r0 = geometry.hub_radius / geometry.tip_radius;
        let twist = stations
            .iter()
            .map(|r| twist_root + (twist_tip - twist_root) * (r - r0) / (1.0 - r0))
            .collect();
        Self::assemble(geometry, stations, widths, chord, twist, airfoil, design_rotor_speed)
    }

    /// Constant chord, constant geometric pitch `pitch` (m per revolution).
    pub fn helical(
        geometry: RotorGeometry,
        chord: f64,
        pitch: f64,
        airfoil: Airfoil,
        design_rotor_speed: f64,
    ) -> PropulsionResult<Self> {
        geometry.validate()?;
        check_positive(pitch, "helical pitch")?;
        let (stations, widths) = geometry.stations();
        let twist = stations
            .iter()
            .map(|r| (pitch / (2.0 * PI * r * geometry.tip_radius)).atan())
            .collect();
        Self::assemble(geometry, stations, widths, chord, twist, airfoil, design_rotor_speed)
    }

    fn assemble(
        geometry: RotorGeometry,
        stations: Vec<f64>,
        widths: Vec<f64>,
        chord: f64,
        twist: Vec<f64>,
        airfoil: Airfoil,
        design_rotor_speed: f64,
    ) -> PropulsionResult<Self> {
        check_positive(chord, "chord")?;
        check_positive(design_rotor_speed, "design rotor speed")?;
        check_positive(airfoil.lift_slope, "lift slope")?;
        let chord = vec![chord; stations.len()];
        Ok(Self {
            tip_radius: geometry.tip_radius,
            hub_radius: geometry.hub_radius,
            number_of_blades: geometry.number_of_blades,
            stations,
            widths,
            chord,
            twist,
            airfoil,
            design_rotor_speed,
        })
    }

    pub fn disc_area(&self) -> f64 {
        PI * self.tip_radius * self.tip_radius
    }

    /// Loads at rotor speed `omega` with collective offset `pitch`.
    pub fn performance(&self, freestream: &Freestream, omega: f64, pitch: f64) -> RotorPerformance {
        if !omega.is_finite() || omega < OMEGA_MIN {
            return RotorPerformance::default();
        }
        let radius = self.tip_radius;
        let tip_speed = omega * radius;
        let inflow_climb = freestream.velocity / tip_speed;
        let blades = self.number_of_blades as f64;
        let cla = self.airfoil.lift_slope;

        let mut ct = 0.0;
        let mut cq = 0.0;
        for (i, &r) in self.stations.iter().enumerate() {
            let sigma = blades * self.chord[i] / (PI * radius);
            let theta = self.twist[i] + pitch - self.airfoil.zero_lift_angle;
            let lambda = station_inflow(sigma, cla, theta, r, inflow_climb, blades);

            let phi = lambda.atan2(r);
            let cl = self.airfoil.lift(self.twist[i] + pitch - phi);
            let cd = self.airfoil.drag(cl);
            let u2 = r * r + lambda * lambda;
            let dr = self.widths[i];
            ct += 0.5 * sigma * u2 * (cl * phi.cos() - cd * phi.sin()) * dr;
            cq += 0.5 * sigma * u2 * (cl * phi.sin() + cd * phi.cos()) * r * dr;
        }

        let scale = freestream.density * self.disc_area() * tip_speed * tip_speed;
        let thrust = ct * scale;
        let torque = cq * scale * radius;
        let power = torque * omega;
        let efficiency = if power > 0.0 && thrust > 0.0 {
            thrust * freestream.velocity / power
        } else {
            0.0
        };
        let tip_mach = if freestream.speed_of_sound > 0.0 {
            (tip_speed * tip_speed + freestream.velocity * freestream.velocity).sqrt()
                / freestream.speed_of_sound
        } else {
            0.0
        };

        RotorPerformance {
            thrust,
            torque,
            power,
            thrust_coefficient: ct,
            power_coefficient: cq,
            efficiency,
            tip_mach,
        }
    }
}

/// Inflow ratio at one station with Prandtl tip loss.
fn station_inflow(sigma: f64, cla: f64, theta: f64, r: f64, inflow_climb: f64, blades: f64) -> f64 {
    let mut tip_loss = 1.0;
    let mut lambda = inflow_climb.max(INFLOW_FLOOR);
    for _ in 0..TIP_LOSS_MAX_ITER {
        let a = sigma * cla / (16.0 * tip_loss) - 0.5 * inflow_climb;
        lambda = (a * a + sigma * cla * theta * r / (8.0 * tip_loss)).max(0.0).sqrt() - a;
        let f = 0.5 * blades * (1.0 - r) / lambda.max(INFLOW_FLOOR);
        let next = ((2.0 / PI) * (-f).exp().acos()).max(TIP_LOSS_FLOOR);
        let done = (next - tip_loss).abs() < TIP_LOSS_TOL;
        tip_loss = next;
        if done {
            break;
        }
    }
    lambda
}
