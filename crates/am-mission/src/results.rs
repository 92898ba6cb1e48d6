//! Mission results keyed by segment tag.

use crate::error::{MissionError, MissionResult};
use am_state::{Conditions, Series};
use serde::{Deserialize, Serialize};

/// Lifecycle of a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    #[default]
    Uninitialized,
    UnknownsSet,
    Evaluated,
    Converged,
    Failed,
}

impl SegmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SegmentStatus::Converged | SegmentStatus::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub tag: String,
    pub status: SegmentStatus,
    pub converged: bool,
    pub evaluations: usize,
    #[serde(with = "am_state::nonfinite::scalar")]
    pub residual_norm: f64,
    pub conditions: Conditions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionResults {
    pub tag: String,
    pub segments: Vec<SegmentResult>,
}

impl MissionResults {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            segments: Vec::new(),
        }
    }

    pub fn segment(&self, tag: &str) -> Option<&SegmentResult> {
        self.segments.iter().find(|s| s.tag == tag)
    }

    /// Look up `"<segment>.<path>"`.
    pub fn deep_get(&self, path: &str) -> MissionResult<&Series> {
        let (segment, rest) = path.split_once('.').ok_or(MissionError::InvalidArg {
            what: "result path must be '<segment>.<path>'",
        })?;
        let result = self.segment(segment).ok_or(MissionError::InvalidArg {
            what: "no segment with that tag",
        })?;
        Ok(result.conditions.deep_get(rest)?)
    }

    pub fn all_converged(&self) -> bool {
        self.segments.iter().all(|s| s.converged)
    }

    pub fn total_evaluations(&self) -> usize {
        self.segments.iter().map(|s| s.evaluations).sum()
    }

    /// Column 0 of `path` concatenated over all segments that have it.
    pub fn concatenated(&self, path: &str) -> Vec<f64> {
        self.segments
            .iter()
            .filter_map(|s| s.conditions.values(path).ok())
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> MissionResults {
        let mut conditions = Conditions::new();
        conditions
            .set_values("frames.inertial.time", &[0.0, 5.0, 10.0])
            .unwrap();
        MissionResults {
            tag: "m".into(),
            segments: vec![SegmentResult {
                tag: "cruise".into(),
                status: SegmentStatus::Converged,
                converged: true,
                evaluations: 12,
                residual_norm: 1e-9,
                conditions,
            }],
        }
    }

    #[test]
    fn dotted_lookup() {
        let r = results();
        assert_eq!(r.deep_get("cruise.frames.inertial.time").unwrap().last(), 10.0);
        assert!(r.deep_get("climb.frames.inertial.time").is_err());
        assert!(r.deep_get("cruise").is_err());
        assert!(r.all_converged());
        assert_eq!(r.concatenated("frames.inertial.time").len(), 3);
    }

    #[test]
    fn json_round_trip() {
        let r = results();
        let text = serde_json::to_string(&r).unwrap();
        let back: MissionResults = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
    }
}
