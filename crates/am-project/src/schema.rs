//! Project schema definitions.
//!
//! Angles are radians, everything else SI unless the field name carries
//! the unit.

use am_mission::{ForceAxes, SegmentKind};
use am_solver::SolveSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub vehicle: VehicleDef,
    #[serde(default)]
    pub missions: Vec<MissionDef>,
    #[serde(default)]
    pub solver: SolveSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleDef {
    pub tag: String,
    pub mass_takeoff_kg: f64,
    pub reference_area_m2: f64,
    pub aerodynamics: AerodynamicsDef,
    #[serde(default)]
    pub distributors: Vec<DistributorDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AerodynamicsDef {
    DragPolar {
        cl0: f64,
        cl_alpha: f64,
        cl_max: f64,
        cd0: f64,
        induced_factor: f64,
    },
    /// Row-major over (angle of attack, Mach).
    Table {
        angle_of_attack: Vec<f64>,
        mach: Vec<f64>,
        lift: Vec<f64>,
        drag: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistributorKindDef {
    ElectricBus,
    FuelLine,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributorDef {
    pub tag: String,
    pub kind: DistributorKindDef,
    #[serde(default)]
    pub identical_propulsors: bool,
    #[serde(default)]
    pub auxiliary_power_w: f64,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    #[serde(default)]
    pub propulsors: Vec<PropulsorDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDef {
    Battery {
        tag: String,
        cell: CellDef,
        cells_series: u32,
        cells_parallel: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mass_kg: Option<f64>,
        #[serde(default)]
        thermal: ThermalDef,
    },
    FuelTank {
        tag: String,
        fuel_mass_kg: f64,
        #[serde(default = "unit_ratio")]
        fuel_selector_ratio: f64,
    },
}

impl SourceDef {
    pub fn tag(&self) -> &str {
        match self {
            SourceDef::Battery { tag, .. } | SourceDef::FuelTank { tag, .. } => tag,
        }
    }
}

fn unit_ratio() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellDef {
    Nmc18650,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThermalDef {
    #[default]
    Isothermal,
    Lumped {
        conductance_w_per_k: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropulsorDef {
    pub tag: String,
    pub group: String,
    #[serde(default)]
    pub thrust_angle: f64,
    pub model: PropulsorModelDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropulsorModelDef {
    ElectricRotor {
        esc_efficiency: f64,
        motor: MotorDef,
        rotor: RotorDef,
    },
    EngineRotor {
        rated_power_w: f64,
        /// rad/s
        rated_speed: f64,
        /// kg/J
        brake_specific_fuel_consumption: f64,
        #[serde(default = "unit_ratio")]
        gear_ratio: f64,
        rotor: RotorDef,
    },
    GasTurbine {
        #[serde(default)]
        cycle: CycleDef,
        design_altitude_m: f64,
        design_mach: f64,
        design_thrust_n: f64,
    },
}

impl PropulsorModelDef {
    pub fn is_electric(&self) -> bool {
        matches!(self, PropulsorModelDef::ElectricRotor { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MotorDef {
    /// rad/s per V
    pub speed_constant: f64,
    /// Ohm
    pub resistance: f64,
    /// A
    pub no_load_current: f64,
    #[serde(default = "unit_ratio")]
    pub gear_ratio: f64,
    #[serde(default = "unit_ratio")]
    pub gearbox_efficiency: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RotorDef {
    pub tip_radius_m: f64,
    pub hub_radius_m: f64,
    pub number_of_blades: u32,
    #[serde(default = "default_stations")]
    pub station_count: usize,
    pub chord_m: f64,
    pub blade: BladeDef,
    /// rad/s
    pub design_rotor_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airfoil: Option<AirfoilDef>,
}

fn default_stations() -> usize {
    20
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BladeDef {
    Helical { pitch_m: f64 },
    Linear { twist_root: f64, twist_tip: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AirfoilDef {
    pub lift_slope: f64,
    pub zero_lift_angle: f64,
    pub cl_max: f64,
    pub cd0: f64,
    pub cd2: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleDef {
    Turbojet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compressor_pressure_ratio: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turbine_inlet_temperature_k: Option<f64>,
    },
    Turbofan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bypass_ratio: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fan_pressure_ratio: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compressor_pressure_ratio: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turbine_inlet_temperature_k: Option<f64>,
    },
}

impl Default for CycleDef {
    fn default() -> Self {
        CycleDef::Turbofan {
            bypass_ratio: None,
            fan_pressure_ratio: None,
            compressor_pressure_ratio: None,
            turbine_inlet_temperature_k: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionDef {
    pub tag: String,
    /// Dotted state path → value seeded into the first segment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_conditions: BTreeMap<String, f64>,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub tag: String,
    #[serde(flatten)]
    pub kind: SegmentKind,
    #[serde(default = "default_control_points")]
    pub control_points: usize,
    #[serde(default)]
    pub force_axes: ForceAxes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_body_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throttle_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fixed_throttles: BTreeMap<String, f64>,
    /// Overrides the project solver settings for this segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolveSettings>,
}

fn default_control_points() -> usize {
    am_mission::DEFAULT_CONTROL_POINTS
}
