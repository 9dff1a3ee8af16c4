pub mod cleaner;
pub mod events;
pub mod metrics;
pub mod ontime;
pub mod reconstruct;
pub mod service_class;

use log::warn;

use crate::config::RunConfig;
use crate::errors::PipelineError;
use crate::model::{LineChart, LocationSample, RouteDefinition, RouteReport, RouteTableRow, Schedule};

/// Runs stages 2-4 for a single route, given its already-loaded inputs.
/// Returns `Err` for any of the non-fatal per-route failure modes in the
/// design's error taxonomy; the caller is expected to log and skip.
pub fn compute_route_report(
    route: &RouteDefinition,
    schedule: &Schedule,
    samples: &[LocationSample],
    date_str: &str,
    config: &RunConfig,
) -> Result<RouteReport, PipelineError> {
    let common_interval = schedule.common_interval.ok_or_else(|| PipelineError::DegenerateSchedule {
        route_id: route.route_id.clone(),
        reason: "commonInterval is undefined".to_string(),
    })?;
    if common_interval <= 0.0 {
        return Err(PipelineError::DegenerateSchedule {
            route_id: route.route_id.clone(),
            reason: "commonInterval is zero".to_string(),
        });
    }

    let cleaned = cleaner::clean_samples(samples, route);
    let stop_times = reconstruct::reconstruct_stop_times(&cleaned, route);

    let thresholds = events::EventThresholds::from_common_interval(
        common_interval,
        config.bunch_threshold_ratio,
        config.gap_threshold_ratio,
    );
    let problems = events::detect_events(&stop_times, thresholds);

    let (on_time_count, total_scheduled) = ontime::calculate_on_time(&stop_times, schedule);
    let on_time_pct = if total_scheduled > 0 {
        on_time_count as f64 / total_scheduled as f64
    } else {
        0.0
    };

    let stats = metrics::compute_metrics(&problems, stop_times.total_intervals(), on_time_pct, total_scheduled, &route.route_id)?;

    let line_chart: LineChart = metrics::bin_events(&problems, config.bin_minutes);
    let map_data = metrics::bunch_geojson(&problems, route);

    let own_row = RouteTableRow {
        route_id: route.route_id.clone(),
        route_name: route.name.clone(),
        overall_health: stats.health,
        bunched_percentage: stats.bunched_pct,
        gapped_percentage: stats.gapped_pct,
        on_time_percentage: on_time_pct,
        coverage: stats.coverage,
    };

    Ok(RouteReport {
        route_id: route.route_id.clone(),
        route_name: route.name.clone(),
        route_type: route.route_type.to_string(),
        date: date_str.to_string(),
        overall_health: stats.health,
        num_bunches: stats.num_bunches,
        num_gaps: stats.num_gaps,
        bunched_percentage: stats.bunched_pct,
        gapped_percentage: stats.gapped_pct,
        total_intervals: stats.total_intervals,
        on_time_percentage: on_time_pct,
        scheduled_stops: total_scheduled,
        coverage: stats.coverage,
        line_chart,
        route_table: vec![own_row],
        map_data,
    })
}

/// Logs a skipped route the way the per-route worker is expected to: with
/// route id and the reason, never aborting the run.
pub fn log_skip(route_id: &str, err: &PipelineError) {
    warn!("skipping route {route_id}: {err}");
}

fn round2_pct(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round() / 100.0
}

/// Percentages and health are carried as `0.0..=1.0` fractions through the
/// whole pipeline; this is the one place they get scaled to `0..=100` and
/// rounded to two decimals, right before a report leaves the process.
pub fn finalize_for_output(report: &mut RouteReport) {
    report.overall_health = round2_pct(report.overall_health);
    report.bunched_percentage = round2_pct(report.bunched_percentage);
    report.gapped_percentage = round2_pct(report.gapped_percentage);
    report.on_time_percentage = round2_pct(report.on_time_percentage);
    report.coverage = round2_pct(report.coverage);

    for row in &mut report.route_table {
        row.overall_health = round2_pct(row.overall_health);
        row.bunched_percentage = round2_pct(row.bunched_percentage);
        row.gapped_percentage = round2_pct(row.gapped_percentage);
        row.on_time_percentage = round2_pct(row.on_time_percentage);
        row.coverage = round2_pct(row.coverage);
    }
}
