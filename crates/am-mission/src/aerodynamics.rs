//! Aerodynamic coefficient collaborators.

use crate::error::{MissionError, MissionResult};
use am_core::numeric::{bracket, is_strictly_increasing, lerp};
use std::fmt;

/// Flow angles and similarity parameters at one control point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AeroInputs {
    /// rad
    pub angle_of_attack: f64,
    /// rad
    pub sideslip: f64,
    pub mach_number: f64,
    pub reynolds_per_length: f64,
}

/// Wind-axis force coefficients referenced to the wing area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AeroCoefficients {
    pub lift: f64,
    pub drag: f64,
    pub side: f64,
}

pub trait Aerodynamics: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn coefficients(&self, inputs: &AeroInputs) -> MissionResult<AeroCoefficients>;
}

/// Linear lift with stall clamp and parabolic drag polar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragPolar {
    pub cl0: f64,
    /// 1/rad
    pub cl_alpha: f64,
    pub cl_max: f64,
    pub cd0: f64,
    /// Induced drag factor k in CD = CD0 + k·CL².
    pub induced_factor: f64,
}

impl DragPolar {
    pub fn validate(&self) -> MissionResult<()> {
        for (v, what) in [
            (self.cl_alpha, "lift curve slope"),
            (self.cl_max, "maximum lift coefficient"),
            (self.cd0, "zero-lift drag coefficient"),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MissionError::InvalidArg { what });
            }
        }
        if !self.induced_factor.is_finite() || self.induced_factor < 0.0 {
            return Err(MissionError::InvalidArg {
                what: "induced drag factor",
            });
        }
        Ok(())
    }
}

impl Aerodynamics for DragPolar {
    fn name(&self) -> &str {
        "drag_polar"
    }

    fn coefficients(&self, inputs: &AeroInputs) -> MissionResult<AeroCoefficients> {
        let lift = (self.cl0 + self.cl_alpha * inputs.angle_of_attack)
            .clamp(-self.cl_max, self.cl_max);
        Ok(AeroCoefficients {
            lift,
            drag: self.cd0 + self.induced_factor * lift * lift,
            side: 0.0,
        })
    }
}

/// Surrogate over an (angle of attack, Mach) grid, bilinear, clamped at
/// the table edges.
#[derive(Clone, Debug, PartialEq)]
pub struct TabulatedAerodynamics {
    pub angle_of_attack: Vec<f64>,
    pub mach: Vec<f64>,
    /// Row-major over (alpha, mach).
    pub lift: Vec<f64>,
    pub drag: Vec<f64>,
}

impl TabulatedAerodynamics {
    pub fn new(
        angle_of_attack: Vec<f64>,
        mach: Vec<f64>,
        lift: Vec<f64>,
        drag: Vec<f64>,
    ) -> MissionResult<Self> {
        if !is_strictly_increasing(&angle_of_attack) || !is_strictly_increasing(&mach) {
            return Err(MissionError::InvalidArg {
                what: "aerodynamic table axes must be strictly increasing",
            });
        }
        let size = angle_of_attack.len() * mach.len();
        if lift.len() != size || drag.len() != size {
            return Err(MissionError::InvalidArg {
                what: "aerodynamic table size does not match its axes",
            });
        }
        Ok(Self {
            angle_of_attack,
            mach,
            lift,
            drag,
        })
    }

    /// Sample another model on a grid.
    pub fn sample(
        model: &dyn Aerodynamics,
        angle_of_attack: Vec<f64>,
        mach: Vec<f64>,
    ) -> MissionResult<Self> {
        let mut lift = Vec::with_capacity(angle_of_attack.len() * mach.len());
        let mut drag = Vec::with_capacity(lift.capacity());
        for &alpha in &angle_of_attack {
            for &m in &mach {
                let c = model.coefficients(&AeroInputs {
                    angle_of_attack: alpha,
                    mach_number: m,
                    ..AeroInputs::default()
                })?;
                lift.push(c.lift);
                drag.push(c.drag);
            }
        }
        Self::new(angle_of_attack, mach, lift, drag)
    }

    fn lookup(&self, table: &[f64], alpha: f64, mach: f64) -> MissionResult<f64> {
        let a = bracket(&self.angle_of_attack, alpha)?;
        let m = bracket(&self.mach, mach)?;
        let nm = self.mach.len();
        let at = |i: usize, j: usize| table[i * nm + j];
        let low = lerp(at(a.lo, m.lo), at(a.lo, m.hi), m.t);
        let high = lerp(at(a.hi, m.lo), at(a.hi, m.hi), m.t);
        Ok(lerp(low, high, a.t))
    }
}

impl Aerodynamics for TabulatedAerodynamics {
    fn name(&self) -> &str {
        "tabulated"
    }

    fn coefficients(&self, inputs: &AeroInputs) -> MissionResult<AeroCoefficients> {
        let alpha = inputs.angle_of_attack;
        let mach = inputs.mach_number;
        Ok(AeroCoefficients {
            lift: self.lookup(&self.lift, alpha, mach)?,
            drag: self.lookup(&self.drag, alpha, mach)?,
            side: 0.0,
        })
    }
}
