//! Great-circle distance, radius search, and applicant clustering for maps.

mod cluster;

pub use cluster::*;

use serde::Serialize;

use crate::models::Job;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Half the equatorial circumference; no two points are further apart.
pub const MAX_RADIUS_KM: f64 = 20_037.5;

/// Radius applied when a map query gives none.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 50.0;

/// Haversine distance between two coordinates given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Finite latitude in [-90, 90] and longitude in [-180, 180].
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Positive, finite, and no larger than `MAX_RADIUS_KM`.
pub fn is_valid_radius(radius_km: f64) -> bool {
    radius_km.is_finite() && radius_km > 0.0 && radius_km <= MAX_RADIUS_KM
}

/// A job within the search radius.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyJob<'a> {
    #[serde(flatten)]
    pub job: &'a Job,
    pub distance_km: f64,
}

/// Jobs with valid coordinates within `radius_km` of the origin, nearest first.
/// Distances are rounded to two decimals.
pub fn jobs_within(jobs: &[Job], latitude: f64, longitude: f64, radius_km: f64) -> Vec<NearbyJob<'_>> {
    let mut nearby: Vec<NearbyJob<'_>> = jobs
        .iter()
        .filter_map(|job| {
            let (lat, lon) = (job.latitude?, job.longitude?);
            if !is_valid_coordinate(lat, lon) {
                return None;
            }
            let distance = haversine_km(latitude, longitude, lat, lon);
            (distance <= radius_km).then(|| NearbyJob {
                job,
                distance_km: (distance * 100.0).round() / 100.0,
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::job;

    #[test]
    fn test_haversine_zero_distance() {
        assert_eq!(haversine_km(33.749, -84.388, 33.749, -84.388), 0.0);
    }

    #[test]
    fn test_haversine_atlanta_to_new_york() {
        let d = haversine_km(33.749, -84.388, 40.7128, -74.006);
        assert!((d - 1200.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(is_valid_coordinate(90.0, -180.0));
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }

    #[test]
    fn test_radius_validation() {
        assert!(is_valid_radius(DEFAULT_SEARCH_RADIUS_KM));
        assert!(!is_valid_radius(0.0));
        assert!(!is_valid_radius(-5.0));
        assert!(!is_valid_radius(f64::INFINITY));
        assert!(!is_valid_radius(MAX_RADIUS_KM + 1.0));
    }

    #[test]
    fn test_jobs_within_filters_and_sorts() {
        let mut midtown = job("midtown", "A", "");
        midtown.latitude = Some(33.781);
        midtown.longitude = Some(-84.388);
        let mut decatur = job("decatur", "B", "");
        decatur.latitude = Some(33.7748);
        decatur.longitude = Some(-84.2963);
        let mut boston = job("boston", "C", "");
        boston.latitude = Some(42.36);
        boston.longitude = Some(-71.06);
        let unplaced = job("unplaced", "D", "");

        let jobs = vec![decatur, boston, unplaced, midtown];
        let found = jobs_within(&jobs, 33.749, -84.388, DEFAULT_SEARCH_RADIUS_KM);

        let ids: Vec<&str> = found.iter().map(|n| n.job.id.as_str()).collect();
        assert_eq!(ids, vec!["midtown", "decatur"]);
        assert!(found[0].distance_km < found[1].distance_km);
    }
}
