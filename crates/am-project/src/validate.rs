//! Project validation logic.

use crate::schema::{
    AerodynamicsDef, DistributorDef, DistributorKindDef, MissionDef, Project, PropulsorModelDef,
    RotorDef, SourceDef, VehicleDef,
};
use am_solver::SolveSettings;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate tag: {tag} in {context}")]
    DuplicateTag { tag: String, context: String },

    #[error("Missing reference: {tag} in {context}")]
    MissingReference { tag: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid topology: {what}")]
    Topology { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    if project.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }
    validate_settings("solver", &project.solver)?;
    let groups = validate_vehicle(&project.vehicle)?;

    let mut mission_tags = HashSet::new();
    for mission in &project.missions {
        if !mission_tags.insert(&mission.tag) {
            return Err(ValidationError::DuplicateTag {
                tag: mission.tag.clone(),
                context: "missions".to_string(),
            });
        }
        validate_mission(mission, &groups)?;
    }
    Ok(())
}

fn validate_settings(context: &str, settings: &SolveSettings) -> Result<(), ValidationError> {
    if settings.max_evaluations == 0 {
        return Err(invalid(
            format!("{context}.max_evaluations"),
            0,
            "must be at least 1",
        ));
    }
    positive(format!("{context}.tolerance"), settings.tolerance)?;
    positive(
        format!("{context}.finite_difference_step"),
        settings.finite_difference_step,
    )?;
    if !(settings.line_search_beta > 0.0 && settings.line_search_beta < 1.0) {
        return Err(invalid(
            format!("{context}.line_search_beta"),
            settings.line_search_beta,
            "must be in (0, 1)",
        ));
    }
    Ok(())
}

/// Returns the throttle group names.
fn validate_vehicle(vehicle: &VehicleDef) -> Result<HashSet<String>, ValidationError> {
    positive("vehicle.mass_takeoff_kg", vehicle.mass_takeoff_kg)?;
    positive("vehicle.reference_area_m2", vehicle.reference_area_m2)?;
    validate_aerodynamics(&vehicle.aerodynamics)?;

    let mut tags = HashSet::new();
    let mut groups = HashSet::new();
    for dist in &vehicle.distributors {
        let owned = std::iter::once(dist.tag.as_str())
            .chain(dist.sources.iter().map(SourceDef::tag))
            .chain(dist.propulsors.iter().map(|p| p.tag.as_str()));
        for tag in owned {
            if tag.is_empty() || tag.contains('.') {
                return Err(invalid("tag", tag, "must be non-empty and contain no '.'"));
            }
            if !tags.insert(tag.to_string()) {
                return Err(ValidationError::DuplicateTag {
                    tag: tag.to_string(),
                    context: "vehicle".to_string(),
                });
            }
        }
        validate_distributor(dist)?;
        groups.extend(dist.propulsors.iter().map(|p| p.group.clone()));
    }
    Ok(groups)
}

fn validate_aerodynamics(aero: &AerodynamicsDef) -> Result<(), ValidationError> {
    match aero {
        AerodynamicsDef::DragPolar {
            cl_alpha,
            cl_max,
            cd0,
            induced_factor,
            ..
        } => {
            positive("aerodynamics.cl_alpha", *cl_alpha)?;
            positive("aerodynamics.cl_max", *cl_max)?;
            positive("aerodynamics.cd0", *cd0)?;
            if !induced_factor.is_finite() || *induced_factor < 0.0 {
                return Err(invalid(
                    "aerodynamics.induced_factor",
                    induced_factor,
                    "must be non-negative",
                ));
            }
        }
        AerodynamicsDef::Table {
            angle_of_attack,
            mach,
            lift,
            drag,
        } => {
            let cells = angle_of_attack.len() * mach.len();
            if lift.len() != cells || drag.len() != cells {
                return Err(invalid(
                    "aerodynamics.table",
                    format!("{}x{}", angle_of_attack.len(), mach.len()),
                    "lift and drag must hold one value per (angle, Mach) pair",
                ));
            }
        }
    }
    Ok(())
}

fn validate_distributor(dist: &DistributorDef) -> Result<(), ValidationError> {
    let context = |field: &str| format!("distributors.{}.{field}", dist.tag);
    if !dist.auxiliary_power_w.is_finite() || dist.auxiliary_power_w < 0.0 {
        return Err(invalid(
            context("auxiliary_power_w"),
            dist.auxiliary_power_w,
            "must be non-negative",
        ));
    }

    let batteries = dist
        .sources
        .iter()
        .filter(|s| matches!(s, SourceDef::Battery { .. }))
        .count();
    let tanks = dist.sources.len() - batteries;
    match dist.kind {
        DistributorKindDef::ElectricBus => {
            if batteries != 1 || tanks != 0 {
                return Err(ValidationError::Topology {
                    what: format!("bus '{}' needs exactly one battery and no tanks", dist.tag),
                });
            }
            if let Some(p) = dist.propulsors.iter().find(|p| !p.model.is_electric()) {
                return Err(ValidationError::Topology {
                    what: format!("propulsor '{}' burns fuel but sits on bus '{}'", p.tag, dist.tag),
                });
            }
        }
        DistributorKindDef::FuelLine => {
            if tanks == 0 || batteries != 0 {
                return Err(ValidationError::Topology {
                    what: format!("fuel line '{}' needs at least one tank and no batteries", dist.tag),
                });
            }
            if let Some(p) = dist.propulsors.iter().find(|p| p.model.is_electric()) {
                return Err(ValidationError::Topology {
                    what: format!("electric propulsor '{}' sits on fuel line '{}'", p.tag, dist.tag),
                });
            }
        }
    }

    for source in &dist.sources {
        match source {
            SourceDef::Battery {
                tag,
                cells_series,
                cells_parallel,
                mass_kg,
                ..
            } => {
                if *cells_series == 0 || *cells_parallel == 0 {
                    return Err(invalid(
                        format!("{tag}.cells"),
                        format!("{cells_series}s{cells_parallel}p"),
                        "needs at least one cell in series and in parallel",
                    ));
                }
                if let Some(mass) = mass_kg {
                    positive(format!("{tag}.mass_kg"), *mass)?;
                }
            }
            SourceDef::FuelTank {
                tag,
                fuel_mass_kg,
                fuel_selector_ratio,
            } => {
                if !fuel_mass_kg.is_finite() || *fuel_mass_kg < 0.0 {
                    return Err(invalid(
                        format!("{tag}.fuel_mass_kg"),
                        fuel_mass_kg,
                        "must be non-negative",
                    ));
                }
                positive(format!("{tag}.fuel_selector_ratio"), *fuel_selector_ratio)?;
            }
        }
    }

    for p in &dist.propulsors {
        if p.group.is_empty() {
            return Err(invalid(format!("{}.group", p.tag), "", "must not be empty"));
        }
        match &p.model {
            PropulsorModelDef::ElectricRotor {
                esc_efficiency,
                motor,
                rotor,
            } => {
                if !(*esc_efficiency > 0.0 && *esc_efficiency <= 1.0) {
                    return Err(invalid(
                        format!("{}.esc_efficiency", p.tag),
                        esc_efficiency,
                        "must be in (0, 1]",
                    ));
                }
                positive(format!("{}.motor.speed_constant", p.tag), motor.speed_constant)?;
                positive(format!("{}.motor.resistance", p.tag), motor.resistance)?;
                validate_rotor(&p.tag, rotor)?;
            }
            PropulsorModelDef::EngineRotor {
                rated_power_w,
                rated_speed,
                brake_specific_fuel_consumption,
                gear_ratio,
                rotor,
            } => {
                positive(format!("{}.rated_power_w", p.tag), *rated_power_w)?;
                positive(format!("{}.rated_speed", p.tag), *rated_speed)?;
                positive(
                    format!("{}.brake_specific_fuel_consumption", p.tag),
                    *brake_specific_fuel_consumption,
                )?;
                positive(format!("{}.gear_ratio", p.tag), *gear_ratio)?;
                validate_rotor(&p.tag, rotor)?;
            }
            PropulsorModelDef::GasTurbine {
                design_altitude_m,
                design_mach,
                design_thrust_n,
                ..
            } => {
                if !design_altitude_m.is_finite() {
                    return Err(invalid(
                        format!("{}.design_altitude_m", p.tag),
                        design_altitude_m,
                        "must be finite",
                    ));
                }
                if !design_mach.is_finite() || *design_mach < 0.0 {
                    return Err(invalid(
                        format!("{}.design_mach", p.tag),
                        design_mach,
                        "must be non-negative",
                    ));
                }
                positive(format!("{}.design_thrust_n", p.tag), *design_thrust_n)?;
            }
        }
    }
    Ok(())
}

fn validate_rotor(tag: &str, rotor: &RotorDef) -> Result<(), ValidationError> {
    positive(format!("{tag}.rotor.tip_radius_m"), rotor.tip_radius_m)?;
    if !(rotor.hub_radius_m >= 0.0 && rotor.hub_radius_m < rotor.tip_radius_m) {
        return Err(invalid(
            format!("{tag}.rotor.hub_radius_m"),
            rotor.hub_radius_m,
            "must lie between zero and the tip radius",
        ));
    }
    if rotor.number_of_blades == 0 || rotor.station_count < 2 {
        return Err(invalid(
            format!("{tag}.rotor"),
            rotor.number_of_blades,
            "needs at least one blade and two stations",
        ));
    }
    positive(format!("{tag}.rotor.chord_m"), rotor.chord_m)?;
    positive(
        format!("{tag}.rotor.design_rotor_speed"),
        rotor.design_rotor_speed,
    )
}

fn validate_mission(mission: &MissionDef, groups: &HashSet<String>) -> Result<(), ValidationError> {
    let mut segment_tags = HashSet::new();
    for segment in &mission.segments {
        let context = format!("missions.{}.{}", mission.tag, segment.tag);
        if segment.tag.is_empty() || segment.tag.contains('.') {
            return Err(invalid(
                format!("missions.{}.segments", mission.tag),
                &segment.tag,
                "segment tags must be non-empty and contain no '.'",
            ));
        }
        if !segment_tags.insert(&segment.tag) {
            return Err(ValidationError::DuplicateTag {
                tag: segment.tag.clone(),
                context: format!("mission '{}' segments", mission.tag),
            });
        }
        if segment.control_points < 2 {
            return Err(invalid(
                format!("{context}.control_points"),
                segment.control_points,
                "at least 2 control points are required",
            ));
        }
        segment
            .kind
            .validate()
            .map_err(|reason| invalid(format!("{context}.{}", segment.kind.name()), "", &reason))?;
        for group in segment
            .throttle_groups
            .iter()
            .chain(segment.fixed_throttles.keys())
        {
            if !groups.contains(group) {
                return Err(ValidationError::MissingReference {
                    tag: group.clone(),
                    context: format!("{context} throttle groups"),
                });
            }
        }
        if let Some(settings) = &segment.solver {
            validate_settings(&format!("{context}.solver"), settings)?;
        }
    }
    if let Some(path) = mission
        .initial_conditions
        .iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(k, _)| k)
    {
        return Err(invalid(
            format!("missions.{}.initial_conditions", mission.tag),
            path,
            "values must be finite",
        ));
    }
    Ok(())
}
