//! Station records for the gas-turbine cycle.

use am_atmosphere::GasProperties;

/// Total temperature (K) and total pressure (Pa) at a station plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StagnationState {
    pub total_temperature: f64,
    pub total_pressure: f64,
}

impl StagnationState {
    pub fn new(total_temperature: f64, total_pressure: f64) -> Self {
        Self {
            total_temperature,
            total_pressure,
        }
    }
}

/// Inlet and outlet of one cycle element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StationRecord {
    pub inlet: StagnationState,
    pub outlet: StagnationState,
}

impl StationRecord {
    pub fn new(inlet: StagnationState, outlet: StagnationState) -> Self {
        Self { inlet, outlet }
    }

    pub fn temperature_ratio(&self) -> f64 {
        self.outlet.total_temperature / self.inlet.total_temperature
    }

    pub fn pressure_ratio(&self) -> f64 {
        self.outlet.total_pressure / self.inlet.total_pressure
    }
}

/// Static exit conditions of a convergent nozzle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NozzleExit {
    pub velocity: f64,
    pub static_pressure: f64,
    pub static_temperature: f64,
    pub mach_number: f64,
    pub choked: bool,
}

impl NozzleExit {
    /// Expand `inlet` to ambient pressure `ambient`, choking at Mach 1.
    ///
    /// A nozzle with total pressure at or below ambient produces no flow.
    pub fn expand(gas: &GasProperties, inlet: StagnationState, ambient: f64) -> Self {
        let tt = inlet.total_temperature;
        let pt = inlet.total_pressure;
        if pt <= ambient || tt <= 0.0 {
            return Self {
                static_pressure: ambient,
                static_temperature: tt,
                ..Self::default()
            };
        }

        let ratio = pt / ambient;
        let critical = gas.critical_pressure_ratio();
        let (mach, static_pressure, choked) = if ratio >= critical {
            (1.0, pt / critical, true)
        } else {
            let exponent = (gas.gamma - 1.0) / gas.gamma;
            let mach = (2.0 / (gas.gamma - 1.0) * (ratio.powf(exponent) - 1.0)).sqrt();
            (mach, ambient, false)
        };
        let static_temperature = tt / gas.stagnation_temperature_ratio(mach);
        Self {
            velocity: mach * gas.speed_of_sound(static_temperature),
            static_pressure,
            static_temperature,
            mach_number: mach,
            choked,
        }
    }

    /// Pressure thrust per unit of nozzle mass flow, (pe − p0)·A/ṁ.
    pub fn pressure_term(&self, gas: &GasProperties, ambient: f64) -> f64 {
        if self.velocity <= 0.0 || self.static_pressure <= 0.0 {
            return 0.0;
        }
        (self.static_pressure - ambient) * gas.gas_constant * self.static_temperature
            / (self.static_pressure * self.velocity)
    }
}

/// Every station of one cycle evaluation, in flow order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleStations {
    pub ram: StationRecord,
    pub diffuser: StationRecord,
    pub fan: Option<StationRecord>,
    pub low_pressure_compressor: StationRecord,
    pub high_pressure_compressor: StationRecord,
    pub combustor: StationRecord,
    pub high_pressure_turbine: StationRecord,
    pub low_pressure_turbine: StationRecord,
    pub core_nozzle: NozzleExit,
    pub fan_nozzle: Option<NozzleExit>,
    pub fuel_to_air_ratio: f64,
    /// Net thrust per unit core air flow, N/(kg/s).
    pub specific_thrust: f64,
}
