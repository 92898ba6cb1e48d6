//! Turbojet / turbofan cycle evaluated as an ordered station pipeline.
//!
//! ```text
//! ram → diffuser → [fan] → LPC → HPC → combustor → HPT → LPT → nozzles
//! ```
//!
//! Each element consumes the outlet of the one before it; no element reads
//! a station that has not been computed. Compressors and turbines use
//! polytropic efficiencies, the combustor sets turbine inlet temperature,
//! and turbines balance the work of the compressors they drive.
//!
//! The engine is sized once at a design point for a corrected core flow;
//! off-design flow follows from the inlet total conditions.

use crate::common::{check_fraction, check_positive};
use crate::error::{PropulsionError, PropulsionResult};
use crate::propulsor::{PropulsorInput, PropulsorOutput, ThrustProducer};
use crate::stations::{CycleStations, NozzleExit, StagnationState, StationRecord};
use am_atmosphere::{AtmosphereModel, Freestream, GasProperties};
use am_core::constants::{SEA_LEVEL_PRESSURE_PA, SEA_LEVEL_TEMPERATURE_K};

const TURBINE_TEMPERATURE_FLOOR: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleParameters {
    /// Bypass ratio; zero gives a turbojet.
    pub bypass_ratio: f64,
    pub diffuser_pressure_recovery: f64,
    pub fan_pressure_ratio: f64,
    pub low_pressure_compressor_ratio: f64,
    pub high_pressure_compressor_ratio: f64,
    pub fan_polytropic_efficiency: f64,
    pub compressor_polytropic_efficiency: f64,
    pub turbine_polytropic_efficiency: f64,
    pub combustor_pressure_ratio: f64,
    pub combustor_efficiency: f64,
    /// Fuel lower heating value, J/kg.
    pub fuel_lower_heating_value: f64,
    /// K
    pub turbine_inlet_temperature: f64,
    pub mechanical_efficiency: f64,
    pub nozzle_pressure_ratio: f64,
}

impl Default for CycleParameters {
    fn default() -> Self {
        Self {
            bypass_ratio: 5.0,
            diffuser_pressure_recovery: 0.98,
            fan_pressure_ratio: 1.6,
            low_pressure_compressor_ratio: 1.9,
            high_pressure_compressor_ratio: 10.0,
            fan_polytropic_efficiency: 0.93,
            compressor_polytropic_efficiency: 0.91,
            turbine_polytropic_efficiency: 0.93,
            combustor_pressure_ratio: 0.95,
            combustor_efficiency: 0.99,
            fuel_lower_heating_value: 43.0e6,
            turbine_inlet_temperature: 1450.0,
            mechanical_efficiency: 0.99,
            nozzle_pressure_ratio: 0.99,
        }
    }
}

impl CycleParameters {
    pub fn turbojet() -> Self {
        Self {
            bypass_ratio: 0.0,
            fan_pressure_ratio: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PropulsionResult<()> {
        if !self.bypass_ratio.is_finite() || self.bypass_ratio < 0.0 {
            return Err(PropulsionError::InvalidArg {
                what: "bypass ratio must be non-negative",
            });
        }
        for (ratio, what) in [
            (self.fan_pressure_ratio, "fan pressure ratio"),
            (self.low_pressure_compressor_ratio, "LPC pressure ratio"),
            (self.high_pressure_compressor_ratio, "HPC pressure ratio"),
        ] {
            check_positive(ratio, what)?;
            if ratio < 1.0 {
                return Err(PropulsionError::InvalidArg { what });
            }
        }
        check_fraction(self.diffuser_pressure_recovery, "diffuser pressure recovery")?;
        check_fraction(self.fan_polytropic_efficiency, "fan efficiency")?;
        check_fraction(self.compressor_polytropic_efficiency, "compressor efficiency")?;
        check_fraction(self.turbine_polytropic_efficiency, "turbine efficiency")?;
        check_fraction(self.combustor_pressure_ratio, "combustor pressure ratio")?;
        check_fraction(self.combustor_efficiency, "combustor efficiency")?;
        check_fraction(self.mechanical_efficiency, "mechanical efficiency")?;
        check_fraction(self.nozzle_pressure_ratio, "nozzle pressure ratio")?;
        check_positive(self.fuel_lower_heating_value, "fuel heating value")?;
        check_positive(self.turbine_inlet_temperature, "turbine inlet temperature")?;
        Ok(())
    }

    fn has_fan(&self) -> bool {
        self.bypass_ratio > 0.0
    }
}

/// Flight condition and thrust the engine is sized for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignPoint {
    /// m
    pub altitude: f64,
    pub mach: f64,
    /// Net thrust, N.
    pub thrust: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GasTurbine {
    pub params: CycleParameters,
    pub design: DesignPoint,
    /// Core air flow corrected to sea-level standard, kg/s.
    pub corrected_core_flow: f64,
    pub thrust_angle: f64,
}

impl GasTurbine {
    /// Size the core flow so the cycle delivers `design.thrust`.
    pub fn size(
        params: CycleParameters,
        design: DesignPoint,
        thrust_angle: f64,
        atmosphere: &dyn AtmosphereModel,
    ) -> PropulsionResult<Self> {
        params.validate()?;
        check_positive(design.thrust, "design thrust")?;
        if !design.mach.is_finite() || design.mach < 0.0 {
            return Err(PropulsionError::InvalidArg {
                what: "design Mach number",
            });
        }

        let speed_of_sound = atmosphere.state(design.altitude)?.speed_of_sound.value;
        let fs = Freestream::at(atmosphere, design.altitude, design.mach * speed_of_sound)?;
        let stations = cycle(&params, &fs);
        if stations.specific_thrust <= 0.0 {
            return Err(PropulsionError::NonPhysical {
                what: "specific thrust at design point",
            });
        }

        let core_flow = design.thrust / stations.specific_thrust;
        let inlet = stations.diffuser.outlet;
        let corrected_core_flow = core_flow * flow_correction(inlet);
        tracing::debug!(
            core_flow,
            corrected_core_flow,
            specific_thrust = stations.specific_thrust,
            "gas turbine sized"
        );

        Ok(Self {
            params,
            design,
            corrected_core_flow,
            thrust_angle,
        })
    }

    pub fn cycle(&self, freestream: &Freestream) -> CycleStations {
        cycle(&self.params, freestream)
    }

    /// Physical core flow for the inlet total state at this freestream.
    pub fn core_flow(&self, stations: &CycleStations) -> f64 {
        self.corrected_core_flow / flow_correction(stations.diffuser.outlet)
    }
}

/// sqrt(θ)/δ at the engine face.
fn flow_correction(face: StagnationState) -> f64 {
    (face.total_temperature / SEA_LEVEL_TEMPERATURE_K).sqrt()
        / (face.total_pressure / SEA_LEVEL_PRESSURE_PA)
}

fn compress(gas: &GasProperties, inlet: StagnationState, ratio: f64, efficiency: f64) -> StationRecord {
    let exponent = (gas.gamma - 1.0) / (gas.gamma * efficiency);
    let outlet = StagnationState::new(
        inlet.total_temperature * ratio.powf(exponent),
        inlet.total_pressure * ratio,
    );
    StationRecord::new(inlet, outlet)
}

/// Extract `work` per unit core air from a gas stream of `1 + f` units.
fn expand(
    hot: &GasProperties,
    inlet: StagnationState,
    work: f64,
    fuel_to_air: f64,
    params: &CycleParameters,
) -> StationRecord {
    let drop = work / (params.mechanical_efficiency * (1.0 + fuel_to_air) * hot.cp());
    let floor = TURBINE_TEMPERATURE_FLOOR * inlet.total_temperature;
    let mut tt_out = inlet.total_temperature - drop;
    if tt_out < floor {
        tracing::debug!(work, "turbine work exceeds available enthalpy, clamping");
        tt_out = floor;
    }
    let exponent = hot.gamma / ((hot.gamma - 1.0) * params.turbine_polytropic_efficiency);
    let ratio = (tt_out / inlet.total_temperature).powf(exponent);
    StationRecord::new(inlet, StagnationState::new(tt_out, inlet.total_pressure * ratio))
}

fn cycle(params: &CycleParameters, fs: &Freestream) -> CycleStations {
    let cold = GasProperties::air();
    let hot = GasProperties::combustion_products();
    let cp_c = cold.cp();
    let cp_h = hot.cp();
    let t0 = fs.temperature;
    let p0 = fs.pressure;
    let u0 = fs.velocity.abs();
    let m0 = fs.mach_number;

    let ambient = StagnationState::new(t0, p0);
    let ram = StationRecord::new(
        ambient,
        StagnationState::new(
            t0 * cold.stagnation_temperature_ratio(m0),
            p0 * cold.stagnation_pressure_ratio(m0),
        ),
    );

    let diffuser = StationRecord::new(
        ram.outlet,
        StagnationState::new(
            ram.outlet.total_temperature,
            ram.outlet.total_pressure * params.diffuser_pressure_recovery,
        ),
    );

    let fan = params.has_fan().then(|| {
        compress(
            &cold,
            diffuser.outlet,
            params.fan_pressure_ratio,
            params.fan_polytropic_efficiency,
        )
    });
    let core_inlet = fan.map_or(diffuser.outlet, |f| f.outlet);

    let lpc = compress(
        &cold,
        core_inlet,
        params.low_pressure_compressor_ratio,
        params.compressor_polytropic_efficiency,
    );
    let hpc = compress(
        &cold,
        lpc.outlet,
        params.high_pressure_compressor_ratio,
        params.compressor_polytropic_efficiency,
    );

    let tt3 = hpc.outlet.total_temperature;
    let tit = params.turbine_inlet_temperature;
    let (tt4, fuel_to_air) = if tt3 >= tit {
        tracing::debug!(tt3, tit, "compressor exit above turbine inlet limit, no fuel");
        (tt3, 0.0)
    } else {
        let f = (cp_h * tit - cp_c * tt3)
            / (params.combustor_efficiency * params.fuel_lower_heating_value - cp_h * tit);
        (tit, f.max(0.0))
    };
    let combustor = StationRecord::new(
        hpc.outlet,
        StagnationState::new(tt4, hpc.outlet.total_pressure * params.combustor_pressure_ratio),
    );

    let hpt_work = cp_c * (tt3 - lpc.outlet.total_temperature);
    let hpt = expand(&hot, combustor.outlet, hpt_work, fuel_to_air, params);

    let bypass = params.bypass_ratio;
    let fan_work = fan.map_or(0.0, |f| {
        (1.0 + bypass) * cp_c * (f.outlet.total_temperature - f.inlet.total_temperature)
    });
    let lpt_work = cp_c * (lpc.outlet.total_temperature - lpc.inlet.total_temperature) + fan_work;
    let lpt = expand(&hot, hpt.outlet, lpt_work, fuel_to_air, params);

    let core_exit = StagnationState::new(
        lpt.outlet.total_temperature,
        lpt.outlet.total_pressure * params.nozzle_pressure_ratio,
    );
    let core_nozzle = NozzleExit::expand(&hot, core_exit, p0);
    let fan_nozzle = fan.map(|f| {
        let exit = StagnationState::new(
            f.outlet.total_temperature,
            f.outlet.total_pressure * params.nozzle_pressure_ratio,
        );
        NozzleExit::expand(&cold, exit, p0)
    });

    let core_thrust =
        (1.0 + fuel_to_air) * (core_nozzle.velocity + core_nozzle.pressure_term(&hot, p0));
    let bypass_thrust = fan_nozzle.map_or(0.0, |n| {
        bypass * (n.velocity + n.pressure_term(&cold, p0))
    });
    let specific_thrust = core_thrust + bypass_thrust - (1.0 + bypass) * u0;

    CycleStations {
        ram,
        diffuser,
        fan,
        low_pressure_compressor: lpc,
        high_pressure_compressor: hpc,
        combustor,
        high_pressure_turbine: hpt,
        low_pressure_turbine: lpt,
        core_nozzle,
        fan_nozzle,
        fuel_to_air_ratio: fuel_to_air,
        specific_thrust,
    }
}

impl ThrustProducer for GasTurbine {
    fn family(&self) -> &'static str {
        "gas_turbine"
    }

    fn thrust_angle(&self) -> f64 {
        self.thrust_angle
    }

    fn evaluate_unit(&self, input: &PropulsorInput) -> PropulsionResult<PropulsorOutput> {
        let fs = &input.freestream;
        if !(fs.temperature > 0.0 && fs.pressure > 0.0) {
            return Err(PropulsionError::NonPhysical {
                what: "freestream static state",
            });
        }
        let stations = self.cycle(fs);
        let core_flow = self.core_flow(&stations);
        let throttle = input.throttle;
        let thrust = stations.specific_thrust * core_flow * throttle;
        let fuel_flow = stations.fuel_to_air_ratio * core_flow * throttle;
        let jet_power = thrust * fs.velocity;
        let fuel_power = fuel_flow * self.params.fuel_lower_heating_value;
        let efficiency = if fuel_power > 0.0 && jet_power > 0.0 {
            jet_power / fuel_power
        } else {
            0.0
        };

        Ok(PropulsorOutput {
            thrust,
            shaft_power: jet_power,
            fuel_flow,
            efficiency,
            ..PropulsorOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_atmosphere::UsStandard1976;

    fn design() -> DesignPoint {
        DesignPoint {
            altitude: 10_000.0,
            mach: 0.7,
            thrust: 4_500.0,
        }
    }

    fn design_freestream() -> Freestream {
        let atm = UsStandard1976::new();
        let a = atm.state(10_000.0).unwrap().speed_of_sound.value;
        Freestream::at(&atm, 10_000.0, 0.7 * a).unwrap()
    }

    fn turbofan() -> GasTurbine {
        GasTurbine::size(CycleParameters::default(), design(), 0.0, &UsStandard1976::new()).unwrap()
    }

    #[test]
    fn stations_chain_in_order() {
        let engine = turbofan();
        let st = engine.cycle(&design_freestream());
        let fan = st.fan.unwrap();
        assert_eq!(st.ram.outlet, st.diffuser.inlet);
        assert_eq!(st.diffuser.outlet, fan.inlet);
        assert_eq!(fan.outlet, st.low_pressure_compressor.inlet);
        assert_eq!(st.low_pressure_compressor.outlet, st.high_pressure_compressor.inlet);
        assert_eq!(st.combustor.inlet, st.high_pressure_compressor.outlet);
        assert_eq!(st.high_pressure_turbine.inlet, st.combustor.outlet);
        assert_eq!(st.low_pressure_turbine.inlet, st.high_pressure_turbine.outlet);
    }

    #[test]
    fn design_thrust_reproduced() {
        let engine = turbofan();
        let input = PropulsorInput::new(1.0, design_freestream());
        let out = engine.evaluate(&input).unwrap();
        assert!((out.thrust - 4_500.0).abs() / 4_500.0 < 1e-9);
        assert!(out.fuel_flow > 0.0);
        assert!(out.efficiency > 0.0 && out.efficiency < 1.0);
    }

    #[test]
    fn turbines_balance_compressors() {
        let engine = turbofan();
        let st = engine.cycle(&design_freestream());
        assert!(st.high_pressure_turbine.temperature_ratio() < 1.0);
        assert!(st.low_pressure_turbine.temperature_ratio() < 1.0);
        assert!(st.fuel_to_air_ratio > 0.0 && st.fuel_to_air_ratio < 0.05);
        assert!(st.core_nozzle.velocity > st.fan_nozzle.unwrap().velocity);
    }

    #[test]
    fn turbojet_has_no_fan() {
        let engine = GasTurbine::size(
            CycleParameters::turbojet(),
            design(),
            0.0,
            &UsStandard1976::new(),
        )
        .unwrap();
        let st = engine.cycle(&design_freestream());
        assert!(st.fan.is_none());
        assert!(st.fan_nozzle.is_none());
        assert_eq!(st.diffuser.outlet, st.low_pressure_compressor.inlet);
    }

    #[test]
    fn zero_throttle_burns_nothing() {
        let engine = turbofan();
        let out = engine
            .evaluate(&PropulsorInput::new(0.0, design_freestream()))
            .unwrap();
        assert_eq!(out.thrust, 0.0);
        assert_eq!(out.fuel_flow, 0.0);
        assert_eq!(out.torque_residual, None);
    }

    #[test]
    fn invalid_bypass_rejected() {
        let params = CycleParameters {
            bypass_ratio: -1.0,
            ..CycleParameters::default()
        };
        assert!(params.validate().is_err());
    }
}
