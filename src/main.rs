mod aggregate;
mod config;
mod db;
mod errors;
mod geo;
mod model;
mod pipeline;

use chrono::{Duration, NaiveDate};
use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;

use config::{Cli, ReportDate, RunConfig};
use errors::{FnResult, PipelineError};
use model::RouteReport;

fn main() -> FnResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = RunConfig::from(&cli);

    let pool = db::open_db(&config)?;
    let mut conn = pool.get_conn()?;

    let date = resolve_date(&cli)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    info!("generating report for {date_str}");

    let mut route_ids = db::active_route_ids(&mut conn, date, &config)?;
    route_ids.sort();

    if route_ids.is_empty() {
        return Err(format!("no location data at all for {date_str}; treating as an infrastructure failure").into());
    }

    let reports: Vec<RouteReport> = route_ids
        .par_iter()
        .filter_map(|route_id| match run_one_route(&pool, route_id, date, &date_str, &config) {
            Ok(report) => Some(report),
            Err(err) => {
                if err.is_fatal() {
                    error!("infrastructure failure while processing route {route_id}: {err}");
                } else {
                    pipeline::log_skip(route_id, &err);
                }
                None
            }
        })
        .collect();

    if reports.is_empty() {
        warn!("every route failed for {date_str}; writing an empty report");
        write_report(&pool, date, cli.new_report, &[])?;
        return Ok(());
    }

    let mut aggregated = aggregate::aggregate(reports, &date_str);
    for report in &mut aggregated {
        pipeline::finalize_for_output(report);
    }

    write_report(&pool, date, cli.new_report, &aggregated)?;
    info!("wrote {} report entries for {date_str}", aggregated.len());
    Ok(())
}

fn resolve_date(cli: &Cli) -> FnResult<NaiveDate> {
    match cli.parse_date()? {
        ReportDate::Literal(date) => Ok(date),
        ReportDate::Yesterday => Ok(chrono::Local::now().date_naive() - Duration::days(1)),
    }
}

/// One worker's full per-route pipeline: acquire a connection, run loaders,
/// then stages 2-4. Each worker acquires its connection for the duration of
/// the loaders and releases it before the compute-heavy stages begin.
fn run_one_route(
    pool: &mysql::Pool,
    route_id: &str,
    date: NaiveDate,
    date_str: &str,
    config: &RunConfig,
) -> Result<RouteReport, PipelineError> {
    let mut conn = pool.get_conn().map_err(|e| PipelineError::Infrastructure(e.to_string()))?;

    let route = db::load_route_definition(&mut conn, route_id, date)?;
    let schedule = db::load_schedule(&mut conn, route_id, date)?;
    let samples = db::load_locations(&mut conn, route_id, date, config)
        .map_err(|e| PipelineError::Infrastructure(e.to_string()))?;

    drop(conn);

    pipeline::compute_route_report(&route, &schedule, &samples, date_str, config)
}

fn write_report(pool: &mysql::Pool, date: NaiveDate, mode: config::ReportMode, reports: &[RouteReport]) -> FnResult<()> {
    let json = serde_json::to_string(reports)?;
    let mut conn = pool.get_conn()?;
    db::write_report(&mut conn, date, mode, &json)?;
    Ok(())
}
