use chrono::{Duration, NaiveDate, NaiveDateTime};
use mysql::prelude::*;
use mysql::*;
use retry::delay::Fibonacci;
use retry::retry;

use crate::config::RunConfig;
use crate::errors::{FnResult, PipelineError};
use crate::model::{LocationSample, RouteDefinition, RouteType, Schedule};

/// Opens a connection pool, retrying with a Fibonacci backoff. Mirrors the
/// teacher's `open_db`, generalized from hard-coded args to [`RunConfig`].
pub fn open_db(config: &RunConfig) -> FnResult<Pool> {
    let url = format!(
        "mysql://{}:{}@{}:{}/{}",
        config.user, config.password, config.host, config.port, config.database
    );
    let pool = retry(Fibonacci::from_millis(1000).take(5), || Pool::new(url.as_str()))
        .map_err(|e| format!("could not establish a database connection: {e:?}"))?;
    Ok(pool)
}

/// `[D 07:00 UTC, D+1 07:00 UTC)`, with the offset taken from config rather
/// than derived, per the fixed-PDT-offset convention of the source system.
fn day_window(date: NaiveDate, utc_offset_hours: i64) -> (NaiveDateTime, NaiveDateTime) {
    let local_midnight = date.and_hms_opt(0, 0, 0).unwrap();
    let start = local_midnight - Duration::hours(utc_offset_hours);
    let end = start + Duration::days(1);
    (start, end)
}

pub fn load_locations(conn: &mut PooledConn, route_id: &str, date: NaiveDate, config: &RunConfig) -> FnResult<Vec<LocationSample>> {
    let (start, end) = day_window(date, config.utc_offset_hours);
    let rows: Vec<(String, String, Option<String>, i64, f64, f64, f64, f64, NaiveDateTime)> = conn.exec(
        "SELECT vid, rid, direction, age, kph, heading, latitude, longitude, timestamp \
         FROM locations WHERE rid = :rid AND timestamp >= :start AND timestamp < :end",
        params! { "rid" => route_id, "start" => start, "end" => end },
    )?;

    Ok(rows
        .into_iter()
        .map(|(vehicle_id, route_id, direction, age, kph, heading, lat, lon, timestamp)| LocationSample {
            vehicle_id,
            route_id,
            direction,
            age,
            kph,
            heading,
            lat,
            lon,
            timestamp,
        })
        .collect())
}

/// The dispatch list is every route id that has any location rows in D's
/// window, not every route row active on D (a route can be "active" with
/// no pings at all, e.g. newly published or suspended for the day).
pub fn active_route_ids(conn: &mut PooledConn, date: NaiveDate, config: &RunConfig) -> FnResult<Vec<String>> {
    let (start, end) = day_window(date, config.utc_offset_hours);
    let rows: Vec<String> = conn.exec(
        "SELECT DISTINCT rid FROM locations WHERE timestamp >= :start AND timestamp < :end",
        params! { "start" => start, "end" => end },
    )?;
    Ok(rows)
}

pub fn load_route_definition(conn: &mut PooledConn, route_id: &str, date: NaiveDate) -> Result<RouteDefinition, PipelineError> {
    let row: Option<(String, String, String)> = conn
        .exec_first(
            "SELECT route_name, route_type, content FROM routes \
             WHERE rid = :rid AND begin_date <= :date AND (end_date IS NULL OR end_date > :date)",
            params! { "rid" => route_id, "date" => date },
        )
        .map_err(|e| PipelineError::Infrastructure(e.to_string()))?;

    let (name, route_type_raw, content) = row.ok_or_else(|| PipelineError::MissingRouteData {
        route_id: route_id.to_string(),
        date: date.to_string(),
    })?;

    let route_type: RouteType = route_type_raw.parse().map_err(|_| PipelineError::MalformedData {
        route_id: route_id.to_string(),
        reason: format!("unknown route type '{route_type_raw}'"),
    })?;

    let raw = serde_json::from_str(&content)?;
    RouteDefinition::from_raw(route_id, &name, route_type, raw)
}

pub fn load_schedule(conn: &mut PooledConn, route_id: &str, date: NaiveDate) -> Result<Schedule, PipelineError> {
    let row: Option<String> = conn
        .exec_first(
            "SELECT content FROM schedules \
             WHERE rid = :rid AND begin_date <= :date AND (end_date IS NULL OR end_date >= :date)",
            params! { "rid" => route_id, "date" => date },
        )
        .map_err(|e| PipelineError::Infrastructure(e.to_string()))?;

    let content = row.ok_or_else(|| PipelineError::MissingSchedule {
        route_id: route_id.to_string(),
        date: date.to_string(),
    })?;

    let blocks: Vec<crate::model::RawScheduleBlock> = serde_json::from_str(&content)?;
    let class = crate::pipeline::service_class::service_class(date);
    let blocks: Vec<_> = blocks.into_iter().filter(|b| b.service_class == class).collect();

    if blocks.is_empty() {
        return Err(PipelineError::NoServiceForDate {
            route_id: route_id.to_string(),
            date: date.to_string(),
            service_class: class.to_string(),
        });
    }

    Schedule::from_blocks(route_id, date, blocks)
}

/// Inserts or updates the single `reports(date, report JSON)` row for `date`.
pub fn write_report(conn: &mut PooledConn, date: NaiveDate, mode: crate::config::ReportMode, report_json: &str) -> FnResult<()> {
    match mode {
        crate::config::ReportMode::Insert => {
            conn.exec_drop(
                "INSERT INTO reports (date, report) VALUES (:date, :report)",
                params! { "date" => date, "report" => report_json },
            )?;
        }
        crate::config::ReportMode::Update => {
            conn.exec_drop(
                "UPDATE reports SET report = :report WHERE date = :date",
                params! { "date" => date, "report" => report_json },
            )?;
        }
    }
    Ok(())
}

