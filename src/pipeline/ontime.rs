use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::{Schedule, ScheduleTable, StopTimes};

const EARLY_WINDOW_SECONDS: i64 = 60;
const LATE_WINDOW_SECONDS: i64 = 240;

fn count_on_time(table: &ScheduleTable, date: NaiveDate, stop_times: &StopTimes) -> u64 {
    let mut count = 0;
    for (stop, column) in &table.columns {
        let observed = stop_times.get(stop);
        for cell in column {
            let Some(time_of_day) = cell else { continue };
            let expected: NaiveDateTime = date.and_time(*time_of_day);
            let earliest = expected - Duration::seconds(EARLY_WINDOW_SECONDS);
            let latest = expected + Duration::seconds(LATE_WINDOW_SECONDS);

            let found = observed.iter().find(|&&t| t >= earliest);
            if let Some(&found_time) = found {
                if found_time <= latest {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Returns `(on_time_count, total_scheduled)`. `total_scheduled` is the
/// number of non-absent cells across both direction tables; a stop tag
/// present in the schedule but absent from the route's stop sequences is
/// handled automatically, since [`StopTimes::get`] returns an empty slice
/// for unknown stops.
pub fn calculate_on_time(stop_times: &StopTimes, schedule: &Schedule) -> (u64, u64) {
    let on_time = count_on_time(&schedule.inbound_table, schedule.date, stop_times)
        + count_on_time(&schedule.outbound_table, schedule.date, stop_times);
    (on_time, schedule.total_scheduled() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashMap;

    fn schedule_with_one_stop(times: Vec<Option<&str>>) -> Schedule {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let parsed: Vec<Option<NaiveTime>> = times
            .into_iter()
            .map(|t| t.map(|s| NaiveTime::parse_from_str(s, "%H:%M").unwrap()))
            .collect();
        let mut columns = HashMap::new();
        let num_trips = parsed.len();
        columns.insert("Z".to_string(), parsed);
        let inbound_table = crate::model::ScheduleTable { columns, num_trips };
        let outbound_table = crate::model::ScheduleTable::default();
        Schedule {
            route_id: "R".into(),
            date,
            inbound_table,
            outbound_table,
            mean_interval: None,
            common_interval: None,
        }
    }

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn s5_on_time_within_window() {
        let schedule = schedule_with_one_stop(vec![Some("10:05")]);
        let mut st = StopTimes::default();
        st.push("Z", t(10, 2));
        st.push("Z", t(10, 7));
        let (on_time, total) = calculate_on_time(&st, &schedule);
        assert_eq!(total, 1);
        assert_eq!(on_time, 1);
    }

    #[test]
    fn s5_not_on_time_outside_window() {
        let schedule = schedule_with_one_stop(vec![Some("10:05")]);
        let mut st = StopTimes::default();
        st.push("Z", t(10, 2));
        st.push("Z", t(10, 10));
        let (on_time, total) = calculate_on_time(&st, &schedule);
        assert_eq!(total, 1);
        assert_eq!(on_time, 0);
    }

    #[test]
    fn no_observation_after_earliest_is_not_on_time() {
        let schedule = schedule_with_one_stop(vec![Some("10:05")]);
        let st = StopTimes::default();
        let (on_time, total) = calculate_on_time(&st, &schedule);
        assert_eq!(total, 1);
        assert_eq!(on_time, 0);
    }

    #[test]
    fn absent_cells_do_not_count_toward_total_scheduled() {
        let schedule = schedule_with_one_stop(vec![Some("10:05"), None]);
        let (_, total) = calculate_on_time(&StopTimes::default(), &schedule);
        assert_eq!(total, 1);
    }
}
