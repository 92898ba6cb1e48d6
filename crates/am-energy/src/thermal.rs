//! Pack thermal models.

use std::fmt;
use std::sync::Arc;

/// What a thermal-management collaborator sees at one control point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalInputs {
    pub pack_temperature: f64,
    pub ambient_temperature: f64,
    /// Joule heating this point, W.
    pub heat_generated: f64,
    pub current: f64,
    pub dt: f64,
}

/// External heat-acquisition / rejection system attached to a pack.
pub trait ThermalManagement: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Heat removed from the pack, W (negative when heating it).
    fn heat_removed(&self, inputs: &ThermalInputs) -> f64;
}

/// Cold plate with a fixed conductance and a rejection limit.
#[derive(Clone, Debug, PartialEq)]
pub struct ConductanceCooler {
    /// W/K
    pub conductance: f64,
    /// W
    pub max_heat_rejection: f64,
}

impl ThermalManagement for ConductanceCooler {
    fn name(&self) -> &str {
        "conductance-cooler"
    }

    fn heat_removed(&self, inputs: &ThermalInputs) -> f64 {
        let q = self.conductance * (inputs.pack_temperature - inputs.ambient_temperature);
        q.clamp(-self.max_heat_rejection, self.max_heat_rejection)
    }
}

#[derive(Clone, Default)]
pub enum ThermalModel {
    /// Temperature held at its initial value.
    #[default]
    Isothermal,
    /// Single thermal mass exchanging heat with ambient through `h·A` (W/K).
    Lumped { conductance: f64 },
    /// Heat rejection delegated to a collaborator.
    Managed(Arc<dyn ThermalManagement>),
    /// Cell temperature read from the discharge map.
    Tabulated,
}

impl fmt::Debug for ThermalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThermalModel::Isothermal => write!(f, "Isothermal"),
            ThermalModel::Lumped { conductance } => {
                write!(f, "Lumped {{ conductance: {conductance} }}")
            }
            ThermalModel::Managed(m) => write!(f, "Managed({})", m.name()),
            ThermalModel::Tabulated => write!(f, "Tabulated"),
        }
    }
}

impl ThermalModel {
    /// Pack temperature rate, K/s, for the lumped and managed models.
    pub fn temperature_rate(&self, inputs: &ThermalInputs, heat_capacity: f64) -> f64 {
        let removed = match self {
            ThermalModel::Isothermal | ThermalModel::Tabulated => return 0.0,
            ThermalModel::Lumped { conductance } => {
                conductance * (inputs.pack_temperature - inputs.ambient_temperature)
            }
            ThermalModel::Managed(m) => m.heat_removed(inputs),
        };
        (inputs.heat_generated - removed) / heat_capacity
    }
}
