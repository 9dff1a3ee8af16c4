use crate::model::{Problem, ProblemKind, StopTimes};

/// Bunch/gap duration thresholds, in seconds, derived from a schedule's
/// common interval (minutes) and the configured ratios.
#[derive(Debug, Clone, Copy)]
pub struct EventThresholds {
    pub bunch_seconds: f64,
    pub gap_seconds: f64,
}

impl EventThresholds {
    pub fn from_common_interval(common_interval_minutes: f64, bunch_ratio: f64, gap_ratio: f64) -> Self {
        EventThresholds {
            bunch_seconds: common_interval_minutes * 60.0 * bunch_ratio,
            gap_seconds: common_interval_minutes * 60.0 * gap_ratio,
        }
    }
}

/// Emits bunch/gap events in stop-major order (not globally time-sorted),
/// one per consecutive arrival pair at a stop with at least two arrivals.
pub fn detect_events(stop_times: &StopTimes, thresholds: EventThresholds) -> Vec<Problem> {
    let mut problems = Vec::new();

    let mut stops: Vec<&String> = stop_times.stops().collect();
    stops.sort();

    for stop in stops {
        let times = stop_times.get(stop);
        if times.len() < 2 {
            continue;
        }
        for w in times.windows(2) {
            let (prev, cur) = (w[0], w[1]);
            let delta = (cur - prev).num_seconds() as f64;
            if delta <= thresholds.bunch_seconds {
                problems.push(Problem {
                    kind: ProblemKind::Bunch,
                    time: prev,
                    duration_seconds: delta as i64,
                    stop: stop.clone(),
                });
            } else if delta >= thresholds.gap_seconds {
                problems.push(Problem {
                    kind: ProblemKind::Gap,
                    time: prev,
                    duration_seconds: delta as i64,
                    stop: stop.clone(),
                });
            }
        }
    }

    problems
}
