use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::model::{CleanedSample, RouteDefinition, StopTimes};

fn is_inbound_direction(direction: &str) -> bool {
    direction.contains("_I_")
}

/// Reconstructs, per stop, every timestamp a vehicle was observed or
/// inferred to be present, by walking each vehicle's cleaned samples in
/// ascending time order and interpolating across skipped stops.
pub fn reconstruct_stop_times(cleaned: &[CleanedSample], route: &RouteDefinition) -> StopTimes {
    let all_tags = route.inbound_stops.iter().chain(route.outbound_stops.iter());
    let mut stop_times = StopTimes::new_for_stops(all_tags.map(|s| s.as_str()));

    let mut by_vehicle: HashMap<&str, Vec<&CleanedSample>> = HashMap::new();
    for sample in cleaned {
        by_vehicle.entry(sample.vehicle_id.as_str()).or_default().push(sample);
    }

    for samples in by_vehicle.values() {
        reconstruct_one_vehicle(samples, route, &mut stop_times);
    }

    stop_times.sort_all();
    stop_times
}

fn reconstruct_one_vehicle(samples: &[&CleanedSample], route: &RouteDefinition, stop_times: &mut StopTimes) {
    if samples.is_empty() {
        return;
    }

    stop_times.push(&samples[0].closest_stop, samples[0].timestamp);

    for pair in samples.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);

        if cur.direction != prev.direction {
            stop_times.push(&cur.closest_stop, cur.timestamp);
            continue;
        }

        let stop_list: &[String] = if is_inbound_direction(&cur.direction) {
            &route.inbound_stops
        } else {
            &route.outbound_stops
        };

        let i_cur = stop_list.iter().position(|s| s == &cur.closest_stop);
        let i_prev = stop_list.iter().position(|s| s == &prev.closest_stop);

        let (i_cur, i_prev) = match (i_cur, i_prev) {
            (Some(c), Some(p)) => (c, p),
            _ => {
                // Either stop isn't part of this direction's sequence;
                // nothing to interpolate against, just record the arrival.
                if cur.closest_stop != prev.closest_stop {
                    stop_times.push(&cur.closest_stop, cur.timestamp);
                }
                continue;
            }
        };

        let gap = i_cur as i64 - i_prev as i64;
        if gap > 1 {
            interpolate(prev.timestamp, cur.timestamp, gap, &stop_list[i_prev + 1..i_cur], stop_times);
        }

        if cur.closest_stop != prev.closest_stop {
            stop_times.push(&cur.closest_stop, cur.timestamp);
        }
    }
}

fn interpolate(
    prev_time: NaiveDateTime,
    cur_time: NaiveDateTime,
    gap: i64,
    intermediate_stops: &[String],
    stop_times: &mut StopTimes,
) {
    let total = cur_time - prev_time;
    let step = total / gap as i32;
    for (k, stop) in intermediate_stops.iter().enumerate() {
        let offset = step * (k as i32 + 1);
        stop_times.push(stop, prev_time + offset);
    }
}
