//! FCC planar-projection distance, as published by the FCC for
//! approximating great-circle distance on a flat plane over short ranges.
//!
//! The source this pipeline is derived from passes latitude/longitude in
//! *degrees* into `cos()`, which mathematically expects radians. That
//! mismatch makes the absolute distance value wrong, but it stays
//! monotonic with true distance, so nearest-stop assignment (`argmin`)
//! and the fixed 0.5km drop threshold both still behave correctly as
//! long as the threshold was calibrated against this same as-written
//! formula. This implementation preserves the formula exactly as the
//! source has it rather than "fixing" the radians conversion, since doing
//! so would silently invalidate the 0.5km threshold everywhere it's used.

/// Distance between two `(lat, lon)` points in degrees, in kilometers.
pub fn fcc_projection(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = (lat1 + lat2) / 2.0;
    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    let k1 = 111.13209 - 0.56605 * (2.0 * mean_lat).cos() + 0.0012 * (4.0 * mean_lat).cos();
    let k2 = 111.41513 * mean_lat.cos() - 0.09455 * (3.0 * mean_lat).cos()
        + 0.00012 * (5.0 * mean_lat).cos();

    ((k1 * delta_lat).powi(2) + (k2 * delta_lon).powi(2)).sqrt()
}

/// Finds the nearest candidate stop tag and its distance (km) to `(lat,
/// lon)`. `candidates` is `(tag, lat, lon)`. Returns `None` if
/// `candidates` is empty.
///
/// A quadratic scan over candidates is acceptable per-route up to a few
/// thousand samples; a uniform lat/lon grid index would be the next step
/// if that stops being true.
pub fn nearest_stop<'a>(
    lat: f64,
    lon: f64,
    candidates: impl Iterator<Item = (&'a str, f64, f64)>,
) -> Option<(&'a str, f64)> {
    candidates
        .map(|(tag, slat, slon)| (tag, fcc_projection(lat, lon, slat, slon)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(fcc_projection(37.7749, -122.4194, 37.7749, -122.4194), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = (37.7749, -122.4194);
        let b = (37.8044, -122.2712);
        let d1 = fcc_projection(a.0, a.1, b.0, b.1);
        let d2 = fcc_projection(b.0, b.1, a.0, a.1);
        assert_eq!(d1, d2);
    }

    #[test]
    fn nearest_stop_picks_the_closest_candidate() {
        let candidates = vec![("far", 10.0, 10.0), ("near", 37.775, -122.419), ("mid", 20.0, 20.0)];
        let (tag, dist) = nearest_stop(37.7749, -122.4194, candidates.into_iter()).unwrap();
        assert_eq!(tag, "near");
        assert!(dist < 1.0);
    }

    #[test]
    fn nearest_stop_of_no_candidates_is_none() {
        assert!(nearest_stop(0.0, 0.0, std::iter::empty()).is_none());
    }
}
