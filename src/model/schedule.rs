use std::collections::HashMap;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::errors::PipelineError;

/// Columns = stop tags, rows = trip index (0-based, source order). A cell
/// that is `None` means the source had `"--"` there — absent, not zero.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    pub columns: HashMap<String, Vec<Option<NaiveTime>>>,
    pub num_trips: usize,
}

impl ScheduleTable {
    pub fn stop_tags(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }

    pub fn column(&self, tag: &str) -> Option<&[Option<NaiveTime>]> {
        self.columns.get(tag).map(|v| v.as_slice())
    }

    /// Count of non-absent cells across the whole table.
    pub fn scheduled_count(&self) -> usize {
        self.columns
            .values()
            .flatten()
            .filter(|c| c.is_some())
            .count()
    }
}

/// Raw per-direction block from the `schedules.content` JSON column.
#[derive(Debug, Deserialize)]
pub struct RawScheduleBlock {
    #[serde(rename = "serviceClass")]
    pub service_class: String,
    pub direction: String,
    pub header: RawScheduleHeader,
    pub tr: RawTrips,
}

#[derive(Debug, Deserialize)]
pub struct RawScheduleHeader {
    pub stop: Vec<RawHeaderStop>,
}

#[derive(Debug, Deserialize)]
pub struct RawHeaderStop {
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTripStop {
    pub tag: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTrip {
    pub stop: Vec<RawTripStop>,
}

/// NextBus-style payloads represent a single trip as a bare object and
/// multiple trips as a list of the same object shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTrips {
    Many(Vec<RawTrip>),
    One(RawTrip),
}

impl RawTrips {
    fn rows(&self) -> Vec<&RawTrip> {
        match self {
            RawTrips::Many(trips) => trips.iter().collect(),
            RawTrips::One(trip) => vec![trip],
        }
    }
}

const ABSENT: &str = "--";

fn parse_time_of_day(s: &str, route_id: &str) -> Result<NaiveTime, PipelineError> {
    for fmt in ["%H:%M:%S", "%H:%M", "%I:%M%P", "%I:%M %P"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    Err(PipelineError::MalformedData {
        route_id: route_id.to_string(),
        reason: format!("unparseable schedule time '{s}'"),
    })
}

pub fn extract_schedule_table(
    block: &RawScheduleBlock,
    route_id: &str,
) -> Result<ScheduleTable, PipelineError> {
    let tags: Vec<String> = block.header.stop.iter().map(|s| s.tag.clone()).collect();
    let rows = block.tr.rows();
    let num_trips = rows.len();

    let mut columns: HashMap<String, Vec<Option<NaiveTime>>> = tags
        .iter()
        .map(|tag| (tag.clone(), vec![None; num_trips]))
        .collect();

    for (row_idx, trip) in rows.iter().enumerate() {
        for cell in &trip.stop {
            if cell.content == ABSENT {
                continue;
            }
            let time = parse_time_of_day(&cell.content, route_id)?;
            if let Some(col) = columns.get_mut(&cell.tag) {
                col[row_idx] = Some(time);
            }
        }
    }

    Ok(ScheduleTable { columns, num_trips })
}

/// `commonInterval` is the statistical mode of consecutive non-absent
/// intervals within each column (in minutes), across both direction
/// tables; `meanInterval` is their arithmetic mean. Both are undefined
/// if no column has at least two non-absent cells.
pub fn common_interval_stats(tables: &[&ScheduleTable]) -> (Option<f64>, Option<f64>) {
    // Grouped by whole seconds (exact, hashable) and only converted to
    // fractional minutes at the end, so a sub-minute scheduled time isn't
    // truncated away before the mode/mean are taken.
    let mut intervals_seconds: Vec<i64> = Vec::new();

    for table in tables {
        for column in table.columns.values() {
            let mut prev: Option<NaiveTime> = None;
            for cell in column {
                if let Some(t) = cell {
                    if let Some(p) = prev {
                        let delta = (*t - p).num_seconds();
                        if delta > 0 {
                            intervals_seconds.push(delta);
                        }
                    }
                    prev = Some(*t);
                }
            }
        }
    }

    if intervals_seconds.is_empty() {
        return (None, None);
    }

    let sum: i64 = intervals_seconds.iter().sum();
    let mean = sum as f64 / 60.0 / intervals_seconds.len() as f64;

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for v in &intervals_seconds {
        *counts.entry(*v).or_insert(0) += 1;
    }
    // Ties broken by the smallest interval value, for determinism.
    let mode = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(value, _)| value as f64 / 60.0)
        .unwrap();

    (Some(mean), Some(mode))
}

#[derive(Debug, Clone)]
pub struct Schedule {
    pub route_id: String,
    pub date: chrono::NaiveDate,
    pub inbound_table: ScheduleTable,
    pub outbound_table: ScheduleTable,
    pub mean_interval: Option<f64>,
    pub common_interval: Option<f64>,
}

impl Schedule {
    pub fn from_blocks(
        route_id: &str,
        date: chrono::NaiveDate,
        blocks: Vec<RawScheduleBlock>,
    ) -> Result<Schedule, PipelineError> {
        if blocks.len() != 2 {
            return Err(PipelineError::MalformedData {
                route_id: route_id.to_string(),
                reason: format!("expected 2 schedule direction blocks, found {}", blocks.len()),
            });
        }

        let inbound_idx = blocks
            .iter()
            .position(|b| b.direction == "Inbound")
            .unwrap_or(0);
        let outbound_idx = 1 - inbound_idx;

        let inbound_table = extract_schedule_table(&blocks[inbound_idx], route_id)?;
        let outbound_table = extract_schedule_table(&blocks[outbound_idx], route_id)?;

        let (mean_interval, common_interval) =
            common_interval_stats(&[&inbound_table, &outbound_table]);

        Ok(Schedule {
            route_id: route_id.to_string(),
            date,
            inbound_table,
            outbound_table,
            mean_interval,
            common_interval,
        })
    }

    pub fn total_scheduled(&self) -> usize {
        self.inbound_table.scheduled_count() + self.outbound_table.scheduled_count()
    }

    /// Returns the scheduled interval, in minutes, that covers the given
    /// time of day at the given stop. Used only internally / by tests; it
    /// isn't part of the report JSON shape.
    pub fn interval_at(&self, stop: &str, time: NaiveTime) -> Option<f64> {
        let column = self
            .inbound_table
            .column(stop)
            .or_else(|| self.outbound_table.column(stop))?;

        let times: Vec<NaiveTime> = column.iter().filter_map(|c| *c).collect();
        if times.len() < 2 {
            return None;
        }

        for w in times.windows(2) {
            if time < w[1] {
                return Some((w[1] - w[0]).num_seconds() as f64 / 60.0);
            }
        }
        let last_two = &times[times.len() - 2..];
        Some((last_two[1] - last_two[0]).num_seconds() as f64 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_from_pairs(pairs: &[(&str, &[&str])]) -> ScheduleTable {
        let num_trips = pairs.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let mut columns = HashMap::new();
        for (tag, values) in pairs {
            let col = values
                .iter()
                .map(|v| {
                    if *v == "--" {
                        None
                    } else {
                        Some(
                            NaiveTime::parse_from_str(v, "%H:%M:%S")
                                .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
                                .unwrap(),
                        )
                    }
                })
                .collect();
            columns.insert(tag.to_string(), col);
        }
        ScheduleTable { columns, num_trips }
    }

    #[test]
    fn common_interval_is_mode_of_column_diffs() {
        // column has intervals of 10, 10, 20 minutes
        let inbound = table_from_pairs(&[("A", &["10:00", "10:10", "10:20", "10:40"])]);
        let outbound = table_from_pairs(&[]);
        let (mean, mode) = common_interval_stats(&[&inbound, &outbound]);
        assert_eq!(mode, Some(10.0));
        assert!((mean.unwrap() - 13.333333333333334).abs() < 1e-9);
    }

    #[test]
    fn undefined_when_no_intervals_exist() {
        let inbound = table_from_pairs(&[("A", &["10:00"])]);
        let outbound = table_from_pairs(&[]);
        let (mean, mode) = common_interval_stats(&[&inbound, &outbound]);
        assert_eq!(mean, None);
        assert_eq!(mode, None);
    }

    #[test]
    fn absent_cells_are_skipped_not_zero() {
        let inbound = table_from_pairs(&[("A", &["10:00", "--", "10:20"])]);
        let outbound = table_from_pairs(&[]);
        let (_, mode) = common_interval_stats(&[&inbound, &outbound]);
        // interval is between 10:00 and 10:20, skipping the absent cell
        assert_eq!(mode, Some(20.0));
    }

    #[test]
    fn single_trip_object_becomes_one_row_table() {
        let block = RawScheduleBlock {
            service_class: "wkd".into(),
            direction: "Inbound".into(),
            header: RawScheduleHeader {
                stop: vec![RawHeaderStop { tag: "A".into() }, RawHeaderStop { tag: "B".into() }],
            },
            tr: RawTrips::One(RawTrip {
                stop: vec![
                    RawTripStop { tag: "A".into(), content: "6:00".into() },
                    RawTripStop { tag: "B".into(), content: "--".into() },
                ],
            }),
        };
        let table = extract_schedule_table(&block, "24").unwrap();
        assert_eq!(table.num_trips, 1);
        assert!(table.column("A").unwrap()[0].is_some());
        assert!(table.column("B").unwrap()[0].is_none());
    }

    fn schedule_with_inbound_column(tag: &str, times: &[&str]) -> Schedule {
        let inbound = table_from_pairs(&[(tag, times)]);
        let outbound = table_from_pairs(&[]);
        let (mean_interval, common_interval) = common_interval_stats(&[&inbound, &outbound]);
        Schedule {
            route_id: "24".into(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            inbound_table: inbound,
            outbound_table: outbound,
            mean_interval,
            common_interval,
        }
    }

    #[test]
    fn interval_at_finds_the_covering_gap() {
        let schedule = schedule_with_inbound_column("Z", &["10:00", "10:10", "10:25"]);
        // 10:05 falls inside the [10:00, 10:10) gap, which is 10 minutes.
        let at_10_05 = schedule.interval_at("Z", NaiveTime::parse_from_str("10:05", "%H:%M").unwrap());
        assert_eq!(at_10_05, Some(10.0));
        // 10:20 falls inside the [10:10, 10:25) gap, which is 15 minutes.
        let at_10_20 = schedule.interval_at("Z", NaiveTime::parse_from_str("10:20", "%H:%M").unwrap());
        assert_eq!(at_10_20, Some(15.0));
    }

    #[test]
    fn interval_at_falls_back_to_the_last_gap_past_the_final_trip() {
        let schedule = schedule_with_inbound_column("Z", &["10:00", "10:10", "10:25"]);
        let past_last = schedule.interval_at("Z", NaiveTime::parse_from_str("23:00", "%H:%M").unwrap());
        assert_eq!(past_last, Some(15.0));
    }

    #[test]
    fn interval_at_is_none_with_fewer_than_two_trips() {
        let schedule = schedule_with_inbound_column("Z", &["10:00"]);
        assert_eq!(schedule.interval_at("Z", NaiveTime::parse_from_str("10:05", "%H:%M").unwrap()), None);
    }

    #[test]
    fn interval_at_is_none_for_unknown_stop() {
        let schedule = schedule_with_inbound_column("Z", &["10:00", "10:10"]);
        assert_eq!(schedule.interval_at("Y", NaiveTime::parse_from_str("10:05", "%H:%M").unwrap()), None);
    }

    #[test]
    fn mean_and_mode_keep_sub_minute_precision() {
        // 90-second and 150-second gaps: 1.5 and 2.5 minutes, neither a
        // whole number, so truncating to integer minutes would distort
        // both the mean and the mode.
        let inbound = table_from_pairs(&[("A", &["10:00:00", "10:01:30", "10:04:00"])]);
        let outbound = table_from_pairs(&[]);
        let (mean, mode) = common_interval_stats(&[&inbound, &outbound]);
        assert_eq!(mean, Some(2.0));
        // Tied counts (one each), broken toward the smaller interval.
        assert_eq!(mode, Some(1.5));
    }
}
