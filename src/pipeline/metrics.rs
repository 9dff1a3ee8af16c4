use chrono::{NaiveDateTime, Timelike};

use crate::errors::PipelineError;
use crate::model::{GeoJsonFeature, GeoJsonFeatureCollection, GeoJsonGeometry, GeoJsonProperties, LineChart, Problem, ProblemKind, RouteDefinition};

/// All internal percentages are fractions in `0.0..=1.0`; rounding to two
/// decimals and scaling to `0..=100` happens only when building the JSON
/// report (see [`crate::model::RouteReport`]).
#[derive(Debug, Clone, Copy)]
pub struct RouteMetrics {
    pub bunched_pct: f64,
    pub gapped_pct: f64,
    pub coverage: f64,
    pub health: f64,
    pub total_intervals: i64,
    pub num_bunches: u64,
    pub num_gaps: u64,
}

pub fn calculate_health(bunched_pct: f64, gapped_pct: f64, on_time_pct: f64) -> f64 {
    ((1.0 - bunched_pct) + (1.0 - gapped_pct) + on_time_pct) / 3.0
}

pub fn compute_metrics(
    problems: &[Problem],
    total_intervals: i64,
    on_time_pct: f64,
    total_scheduled: u64,
    route_id: &str,
) -> Result<RouteMetrics, PipelineError> {
    if total_intervals == 0 {
        return Err(PipelineError::DegenerateSchedule {
            route_id: route_id.to_string(),
            reason: "zero observed intervals".to_string(),
        });
    }
    if total_scheduled == 0 {
        return Err(PipelineError::DegenerateSchedule {
            route_id: route_id.to_string(),
            reason: "zero scheduled stops".to_string(),
        });
    }

    let num_bunches = problems.iter().filter(|p| p.kind == ProblemKind::Bunch).count() as u64;
    let num_gaps = problems.iter().filter(|p| p.kind == ProblemKind::Gap).count() as u64;

    let bunched_pct = num_bunches as f64 / total_intervals as f64;
    let gapped_pct = num_gaps as f64 / total_intervals as f64;
    let coverage = (total_scheduled as f64 * on_time_pct + num_bunches as f64) / total_scheduled as f64;
    let health = calculate_health(bunched_pct, gapped_pct, on_time_pct);

    Ok(RouteMetrics {
        bunched_pct,
        gapped_pct,
        coverage,
        health,
        total_intervals,
        num_bunches,
        num_gaps,
    })
}

/// Canonical `HH:MM` time axis covering one operating day, one entry per
/// bin, used both to build a fresh chart and to size the aggregator's
/// running sums.
pub fn time_axis(bin_minutes: i64) -> Vec<String> {
    let mut times = Vec::new();
    let mut minutes = 0;
    while minutes < 24 * 60 {
        times.push(format!("{:02}:{:02}", minutes / 60, minutes % 60));
        minutes += bin_minutes;
    }
    times
}

fn bin_index(time: NaiveDateTime, bin_minutes: i64) -> usize {
    let minutes_since_midnight = time.hour() as i64 * 60 + time.minute() as i64;
    (minutes_since_midnight / bin_minutes) as usize
}

pub fn bin_events(problems: &[Problem], bin_minutes: i64) -> LineChart {
    let times = time_axis(bin_minutes);
    let mut bunches = vec![0u64; times.len()];
    let mut gaps = vec![0u64; times.len()];

    for p in problems {
        let idx = bin_index(p.time, bin_minutes).min(times.len().saturating_sub(1));
        match p.kind {
            ProblemKind::Bunch => bunches[idx] += 1,
            ProblemKind::Gap => gaps[idx] += 1,
        }
    }

    LineChart { times, bunches, gaps }
}

fn format_compact_time(time: NaiveDateTime) -> String {
    let s = time.format("%Y-%m-%d %H:%M:%S%.f").to_string();
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Joins bunch events against the route's stop table to recover
/// coordinates; bunches with no matching stop are omitted.
pub fn bunch_geojson(problems: &[Problem], route: &RouteDefinition) -> GeoJsonFeatureCollection {
    let features = problems
        .iter()
        .filter(|p| p.kind == ProblemKind::Bunch)
        .filter_map(|p| {
            let stop = route.stop_by_tag(&p.stop)?;
            Some(GeoJsonFeature {
                kind: "Feature",
                geometry: GeoJsonGeometry {
                    kind: "Point",
                    coordinates: [round4(stop.lon), round4(stop.lat)],
                },
                properties: GeoJsonProperties {
                    time: format_compact_time(p.time),
                    stop_id: stop.stop_id.clone(),
                },
            })
        })
        .collect();

    GeoJsonFeatureCollection { kind: "FeatureCollection", bunches: features }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
