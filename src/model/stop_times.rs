use std::collections::HashMap;

use chrono::NaiveDateTime;

/// Per-stop ordered (ascending) arrival timestamps, reconstructed from
/// cleaned location samples. The domain is the union of a route's inbound
/// and outbound stop tags; stops with no observed arrivals map to an
/// empty vector rather than being absent from the map.
#[derive(Debug, Clone, Default)]
pub struct StopTimes(pub HashMap<String, Vec<NaiveDateTime>>);

impl StopTimes {
    pub fn new_for_stops<'a>(tags: impl Iterator<Item = &'a str>) -> StopTimes {
        let map = tags.map(|t| (t.to_string(), Vec::new())).collect();
        StopTimes(map)
    }

    pub fn push(&mut self, stop: &str, time: NaiveDateTime) {
        self.0.entry(stop.to_string()).or_default().push(time);
    }

    pub fn sort_all(&mut self) {
        for times in self.0.values_mut() {
            times.sort();
        }
    }

    pub fn get(&self, stop: &str) -> &[NaiveDateTime] {
        self.0.get(stop).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn stops(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Total observed consecutive-arrival intervals across all stops:
    /// `sum(len(times)) - count(stops with any arrivals)`.
    pub fn total_intervals(&self) -> i64 {
        let total_arrivals: i64 = self.0.values().map(|v| v.len() as i64).sum();
        let stops_with_arrivals = self.0.values().filter(|v| !v.is_empty()).count() as i64;
        total_arrivals - stops_with_arrivals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn sort_all_orders_each_stop_ascending() {
        let mut st = StopTimes::default();
        st.push("A", t(10, 5));
        st.push("A", t(10, 1));
        st.sort_all();
        assert_eq!(st.get("A"), &[t(10, 1), t(10, 5)]);
    }

    #[test]
    fn total_intervals_subtracts_one_per_nonempty_stop() {
        let mut st = StopTimes::default();
        st.push("A", t(10, 0));
        st.push("A", t(10, 5));
        st.push("A", t(10, 10));
        st.push("B", t(11, 0));
        // A has 3 arrivals -> 2 intervals, B has 1 arrival -> 0 intervals
        assert_eq!(st.total_intervals(), 2);
    }
}
