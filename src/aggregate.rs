//! Fold per-route reports into per-mode and system-wide ("All") aggregates.
//! This is stage 5 of the pipeline; it only ever runs after every route
//! worker has finished (a barrier), since it needs the complete set.

use std::collections::BTreeMap;

use crate::model::{GeoJsonFeatureCollection, LineChart, RouteReport, RouteTableRow};

fn health(bunched_pct: f64, gapped_pct: f64, on_time_pct: f64) -> f64 {
    crate::pipeline::metrics::calculate_health(bunched_pct, gapped_pct, on_time_pct)
}

fn sum_series(reports: &[&RouteReport]) -> LineChart {
    let times = reports
        .first()
        .map(|r| r.line_chart.times.clone())
        .unwrap_or_default();
    let mut bunches = vec![0u64; times.len()];
    let mut gaps = vec![0u64; times.len()];
    for r in reports {
        for (i, v) in r.line_chart.bunches.iter().enumerate() {
            bunches[i] += v;
        }
        for (i, v) in r.line_chart.gaps.iter().enumerate() {
            gaps[i] += v;
        }
    }
    LineChart { times, bunches, gaps }
}

fn concat_geojson(reports: &[&RouteReport]) -> GeoJsonFeatureCollection {
    let mut bunches = Vec::new();
    for r in reports {
        bunches.extend(r.map_data.bunches.iter().cloned());
    }
    GeoJsonFeatureCollection { kind: "FeatureCollection", bunches }
}

/// Builds one mode-level or system-wide aggregate from its member routes.
/// `name` becomes `route_id` / `route_name` / `route_type` on the result,
/// per the `AggregateReport` shape (same fields as `RouteReport`).
fn fold(name: &str, date: &str, reports: &[&RouteReport]) -> RouteReport {
    let scheduled_total: u64 = reports.iter().map(|r| r.scheduled_stops).sum();
    let bunches_total: u64 = reports.iter().map(|r| r.num_bunches).sum();
    let gaps_total: u64 = reports.iter().map(|r| r.num_gaps).sum();
    let intervals_total: i64 = reports.iter().map(|r| r.total_intervals).sum();

    let on_time_weighted: f64 = reports.iter().map(|r| r.on_time_percentage * r.scheduled_stops as f64).sum();
    let on_time_pct = if scheduled_total > 0 { on_time_weighted / scheduled_total as f64 } else { 0.0 };

    let coverage = if scheduled_total > 0 {
        (on_time_weighted + bunches_total as f64) / scheduled_total as f64
    } else {
        0.0
    };

    let bunched_pct = if intervals_total > 0 { bunches_total as f64 / intervals_total as f64 } else { 0.0 };
    let gapped_pct = if intervals_total > 0 { gaps_total as f64 / intervals_total as f64 } else { 0.0 };
    let overall_health = health(bunched_pct, gapped_pct, on_time_pct);

    let route_table: Vec<RouteTableRow> = reports.iter().flat_map(|r| r.route_table.iter().cloned()).collect();

    RouteReport {
        route_id: name.to_string(),
        route_name: name.to_string(),
        route_type: name.to_string(),
        date: date.to_string(),
        overall_health,
        num_bunches: bunches_total,
        num_gaps: gaps_total,
        bunched_percentage: bunched_pct,
        gapped_percentage: gapped_pct,
        total_intervals: intervals_total,
        on_time_percentage: on_time_pct,
        scheduled_stops: scheduled_total,
        coverage,
        line_chart: sum_series(reports),
        route_table,
        map_data: concat_geojson(reports),
    }
}

/// Computes per-mode aggregates and the system-wide "All" aggregate, then
/// prepends them to the route reports with "All" first. Routes are
/// expected to already be sorted by `route_id` (done by the dispatcher so
/// the per-mode/"All" `route_table` rows come out in deterministic order).
pub fn aggregate(routes: Vec<RouteReport>, date: &str) -> Vec<RouteReport> {
    let mut by_mode: BTreeMap<String, Vec<&RouteReport>> = BTreeMap::new();
    for r in &routes {
        by_mode.entry(r.route_type.clone()).or_default().push(r);
    }

    let mut mode_aggregates: Vec<RouteReport> = by_mode
        .into_iter()
        .map(|(mode, members)| fold(&mode, date, &members))
        .collect();

    let all_members: Vec<&RouteReport> = routes.iter().collect();
    let all_aggregate = fold("All", date, &all_members);

    let mut result = Vec::with_capacity(routes.len() + mode_aggregates.len() + 1);
    result.push(all_aggregate);
    result.append(&mut mode_aggregates);
    result.extend(routes);
    result
}
