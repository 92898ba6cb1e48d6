//! Ordered segment evaluation with state chaining.

use crate::error::{ConfigError, MissionResult};
use crate::results::MissionResults;
use crate::segment::Segment;
use crate::vehicle::Vehicle;
use am_state::Conditions;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub struct Mission {
    pub tag: String,
    pub segments: Vec<Segment>,
    /// Row seeded into the first segment, e.g. a partly charged battery.
    pub initial_conditions: Option<Conditions>,
}

impl Mission {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            segments: Vec::new(),
            initial_conditions: None,
        }
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_initial_conditions(mut self, conditions: Conditions) -> Self {
        self.initial_conditions = Some(conditions);
        self
    }

    /// Segment checks and unique tags, before anything is solved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for segment in &self.segments {
            segment.validate()?;
            if !seen.insert(segment.tag.as_str()) {
                return Err(ConfigError::DuplicateSegment {
                    tag: segment.tag.clone(),
                });
            }
        }
        Ok(())
    }

    /// Solve every segment in order. Each segment starts from the last row
    /// of the previous one. A segment that fails to converge is recorded
    /// and the mission moves on.
    pub fn evaluate(&mut self, vehicle: &Vehicle) -> MissionResult<MissionResults> {
        vehicle.validate()?;
        self.validate()?;

        let mut results = MissionResults::new(self.tag.clone());
        let mut carry = self.initial_conditions.clone();
        for segment in &mut self.segments {
            if let Some(previous) = &carry {
                segment.conditions.merge(previous)?;
            }
            let result = segment.solve(vehicle)?;
            tracing::info!(
                mission = %self.tag,
                segment = %result.tag,
                converged = result.converged,
                evaluations = result.evaluations,
                residual_norm = result.residual_norm,
                "segment solved"
            );
            carry = Some(segment.conditions.last_row_snapshot());
            results.segments.push(result);
        }
        Ok(results)
    }
}

/// Independent missions flown in order by the same vehicle.
#[derive(Clone, Debug, Default)]
pub struct MissionSet {
    pub missions: Vec<Mission>,
}

impl MissionSet {
    pub fn evaluate(&mut self, vehicle: &Vehicle) -> MissionResult<Vec<MissionResults>> {
        self.missions
            .iter_mut()
            .map(|m| m.evaluate(vehicle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::SegmentKind;

    fn cruise(tag: &str) -> Segment {
        Segment::new(
            tag,
            SegmentKind::Cruise {
                altitude: Some(1000.0),
                air_speed: 30.0,
                distance: 1000.0,
            },
        )
    }

    #[test]
    fn duplicate_tags_rejected() {
        let mission = Mission::new("m").with_segment(cruise("a")).with_segment(cruise("a"));
        assert_eq!(
            mission.validate(),
            Err(ConfigError::DuplicateSegment { tag: "a".into() })
        );
    }

    #[test]
    fn dotted_tags_rejected() {
        let mission = Mission::new("m").with_segment(cruise("a.b"));
        assert!(matches!(
            mission.validate(),
            Err(ConfigError::InvalidSegment { .. })
        ));
    }
}
