use chrono::Duration;

use crate::geo::nearest_stop;
use crate::model::{CleanedSample, Direction, LocationSample, RouteDefinition};

const MAX_AGE_SECONDS: i64 = 60;
const MAX_STOP_DISTANCE_KM: f64 = 0.5;

/// Filters, corrects and nearest-stop-assigns raw location samples for one
/// route, per the location cleaner stage.
pub fn clean_samples(samples: &[LocationSample], route: &RouteDefinition) -> Vec<CleanedSample> {
    let inbound_candidates: Vec<(&str, f64, f64)> = route
        .stops
        .iter()
        .filter(|s| s.direction == Direction::Inbound)
        .map(|s| (s.tag.as_str(), s.lat, s.lon))
        .collect();
    let outbound_candidates: Vec<(&str, f64, f64)> = route
        .stops
        .iter()
        .filter(|s| s.direction == Direction::Outbound)
        .map(|s| (s.tag.as_str(), s.lat, s.lon))
        .collect();

    let mut cleaned: Vec<CleanedSample> = samples
        .iter()
        .filter(|s| s.age < MAX_AGE_SECONDS)
        .filter_map(|s| {
            let direction = s.direction.clone()?;
            let timestamp = s.timestamp - Duration::seconds(s.age);

            let (tag, distance) = if s.is_inbound() {
                nearest_stop(s.lat, s.lon, inbound_candidates.iter().copied())?
            } else if s.is_outbound() {
                nearest_stop(s.lat, s.lon, outbound_candidates.iter().copied())?
            } else {
                return None;
            };

            if distance >= MAX_STOP_DISTANCE_KM {
                return None;
            }

            Some(CleanedSample {
                vehicle_id: s.vehicle_id.clone(),
                direction,
                timestamp,
                closest_stop: tag.to_string(),
                distance,
            })
        })
        .collect();

    cleaned.sort_by(|a, b| (a.timestamp, &a.vehicle_id).cmp(&(b.timestamp, &b.vehicle_id)));
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouteType, Stop};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn route() -> RouteDefinition {
        let mut stops = HashSet::new();
        stops.insert(Stop { tag: "A".into(), stop_id: "1".into(), title: "A".into(), lat: 37.0, lon: -122.0, direction: Direction::Inbound });
        stops.insert(Stop { tag: "B".into(), stop_id: "2".into(), title: "B".into(), lat: 37.01, lon: -122.01, direction: Direction::Inbound });
        RouteDefinition {
            route_id: "24".into(),
            name: "24".into(),
            route_type: RouteType::Bus,
            inbound_stops: vec!["A".into(), "B".into()],
            outbound_stops: vec![],
            stops,
        }
    }

    fn sample(age: i64, direction: Option<&str>, lat: f64, lon: f64) -> LocationSample {
        LocationSample {
            vehicle_id: "v1".into(),
            route_id: "24".into(),
            direction: direction.map(|d| d.to_string()),
            age,
            kph: 0.0,
            heading: 0.0,
            lat,
            lon,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn drops_samples_with_age_60_keeps_59() {
        let r = route();
        let old = sample(60, Some("24_I_OB"), 37.0, -122.0);
        let fresh = sample(59, Some("24_I_OB"), 37.0, -122.0);
        assert!(clean_samples(&[old], &r).is_empty());
        assert_eq!(clean_samples(&[fresh], &r).len(), 1);
    }

    #[test]
    fn drops_samples_with_no_direction() {
        let r = route();
        let s = sample(10, None, 37.0, -122.0);
        assert!(clean_samples(&[s], &r).is_empty());
    }

    #[test]
    fn corrects_timestamp_by_subtracting_age() {
        let r = route();
        let s = sample(10, Some("24_I_OB"), 37.0, -122.0);
        let cleaned = clean_samples(&[s], &r);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(
            cleaned[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 59, 50).unwrap()
        );
    }

    #[test]
    fn drops_samples_too_far_from_any_stop() {
        let r = route();
        let far = sample(10, Some("24_I_OB"), 10.0, 10.0);
        assert!(clean_samples(&[far], &r).is_empty());
    }

    #[test]
    fn sorts_by_timestamp_then_vehicle_id() {
        let r = route();
        let mut s1 = sample(10, Some("24_I_OB"), 37.0, -122.0);
        s1.vehicle_id = "v2".into();
        s1.timestamp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let mut s2 = sample(10, Some("24_I_OB"), 37.0, -122.0);
        s2.vehicle_id = "v1".into();
        s2.timestamp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let cleaned = clean_samples(&[s1, s2], &r);
        assert_eq!(cleaned[0].vehicle_id, "v1");
        assert_eq!(cleaned[1].vehicle_id, "v2");
    }
}
