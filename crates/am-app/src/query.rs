//! Query helpers for extracting data from loaded runs.

use am_mission::MissionResults;
use am_results::{DayResults, RunResults};

use crate::error::{AppError, AppResult};

const TIME_PATH: &str = "frames.inertial.time";

/// Summary of one mission day of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub day: u32,
    pub time_range: (f64, f64),
    pub mission_count: usize,
    pub segment_count: usize,
    pub all_converged: bool,
}

fn select_day(results: &RunResults, day: Option<u32>) -> AppResult<&DayResults> {
    match day {
        Some(d) => results
            .day(d)
            .ok_or_else(|| AppError::InvalidInput(format!("Run has no mission day {}", d))),
        None => results
            .last_day()
            .ok_or_else(|| AppError::InvalidInput("No mission days in run".to_string())),
    }
}

fn select_mission<'a>(day: &'a DayResults, mission: &str) -> AppResult<&'a MissionResults> {
    day.mission(mission)
        .ok_or_else(|| AppError::MissionNotFound(mission.to_string()))
}

/// Summary for `day`, or the last day flown.
pub fn get_run_summary(results: &RunResults, day: Option<u32>) -> AppResult<RunSummary> {
    let day = select_day(results, day)?;
    let times: Vec<f64> = day
        .missions
        .iter()
        .flat_map(|m| m.concatenated(TIME_PATH))
        .collect();
    let t_min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if times.is_empty() {
        return Err(AppError::InvalidInput("No time history in run".to_string()));
    }

    Ok(RunSummary {
        day: day.day,
        time_range: (t_min, t_max),
        mission_count: day.missions.len(),
        segment_count: day.missions.iter().map(|m| m.segments.len()).sum(),
        all_converged: day.missions.iter().all(|m| m.all_converged()),
    })
}

/// Every stored path of one segment, as `"<segment>.<path>"`.
pub fn list_paths(
    results: &RunResults,
    day: Option<u32>,
    mission: &str,
    segment: &str,
) -> AppResult<Vec<String>> {
    let mission = select_mission(select_day(results, day)?, mission)?;
    let segment = mission
        .segment(segment)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown segment: {}", segment)))?;
    Ok(segment
        .conditions
        .leaves()
        .into_iter()
        .map(|(path, _)| format!("{}.{}", segment.tag, path))
        .collect())
}

/// `(time, value)` pairs for column `column` of `"<segment>.<path>"`.
///
/// A segment of `*` concatenates the path over every segment of the
/// mission that records it.
pub fn extract_series(
    results: &RunResults,
    day: Option<u32>,
    mission: &str,
    path: &str,
    column: usize,
) -> AppResult<Vec<(f64, f64)>> {
    let mission = select_mission(select_day(results, day)?, mission)?;
    let (segment, rest) = path.split_once('.').ok_or_else(|| {
        AppError::InvalidInput(format!("Path must be '<segment>.<path>': {}", path))
    })?;

    let mut series = Vec::new();
    for result in &mission.segments {
        if segment != "*" && result.tag != segment {
            continue;
        }
        let values = match result.conditions.deep_get(rest) {
            Ok(values) => values,
            Err(_) if segment == "*" => continue,
            Err(e) => return Err(AppError::InvalidInput(e.to_string())),
        };
        let time = result
            .conditions
            .values(TIME_PATH)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if column >= values.cols() {
            return Err(AppError::InvalidInput(format!(
                "Path {} has {} columns",
                path,
                values.cols()
            )));
        }
        for (row, t) in time.iter().enumerate() {
            if let Some(v) = values.get(row, column) {
                series.push((*t, v));
            }
        }
    }

    if series.is_empty() {
        return Err(AppError::InvalidInput(format!("No data for {}", path)));
    }
    Ok(series)
}

/// Render `(time, value)` pairs as two-column CSV.
pub fn series_to_csv(series: &[(f64, f64)], value_header: &str) -> String {
    let mut out = format!("time_s,{}\n", value_header);
    for (t, v) in series {
        out.push_str(&format!("{},{}\n", t, v));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_mission::{SegmentResult, SegmentStatus};
    use am_state::Conditions;

    fn segment(tag: &str, t0: f64, mass: f64) -> SegmentResult {
        let mut conditions = Conditions::new();
        conditions
            .set_values(TIME_PATH, &[t0, t0 + 10.0, t0 + 20.0])
            .unwrap();
        conditions
            .set_values("weights.total_mass", &[mass, mass - 1.0, mass - 2.0])
            .unwrap();
        SegmentResult {
            tag: tag.to_string(),
            status: SegmentStatus::Converged,
            converged: true,
            evaluations: 4,
            residual_norm: 1e-10,
            conditions,
        }
    }

    fn results() -> RunResults {
        let mission = MissionResults {
            tag: "ferry".to_string(),
            segments: vec![segment("cruise", 0.0, 100.0), segment("descent", 20.0, 98.0)],
        };
        RunResults {
            days: vec![DayResults {
                day: 1,
                missions: vec![mission],
            }],
        }
    }

    #[test]
    fn single_segment_series() {
        let series =
            extract_series(&results(), None, "ferry", "descent.weights.total_mass", 0).unwrap();
        assert_eq!(series, vec![(20.0, 98.0), (30.0, 97.0), (40.0, 96.0)]);
    }

    #[test]
    fn wildcard_concatenates_segments() {
        let series = extract_series(&results(), Some(1), "ferry", "*.weights.total_mass", 0).unwrap();
        assert_eq!(series.len(), 6);
        assert_eq!(series[3], (20.0, 98.0));
    }

    #[test]
    fn bad_lookups_are_errors() {
        let r = results();
        assert!(matches!(
            extract_series(&r, None, "survey", "cruise.weights.total_mass", 0),
            Err(AppError::MissionNotFound(_))
        ));
        assert!(extract_series(&r, Some(2), "ferry", "cruise.weights.total_mass", 0).is_err());
        assert!(extract_series(&r, None, "ferry", "cruise.weights.total_mass", 1).is_err());
        assert!(extract_series(&r, None, "ferry", "weights", 0).is_err());
    }

    #[test]
    fn summary_spans_all_segments() {
        let summary = get_run_summary(&results(), None).unwrap();
        assert_eq!(summary.day, 1);
        assert_eq!(summary.time_range, (0.0, 40.0));
        assert_eq!(summary.segment_count, 2);
        assert!(summary.all_converged);
    }

    #[test]
    fn paths_are_segment_qualified() {
        let paths = list_paths(&results(), None, "ferry", "cruise").unwrap();
        assert!(paths.contains(&"cruise.weights.total_mass".to_string()));
        assert!(paths.contains(&"cruise.frames.inertial.time".to_string()));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = series_to_csv(&[(0.0, 1.5), (1.0, 2.5)], "value");
        assert_eq!(csv, "time_s,value\n0,1.5\n1,2.5\n");
    }
}
