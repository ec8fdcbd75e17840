//! First-fit greedy clustering of applicant locations.
//!
//! Each point joins the first existing cluster (in creation order) whose
//! current centroid lies within `CLUSTER_RADIUS_KM`, not the nearest one.
//! Centroids move as members join, so the result depends on input order;
//! the same order always produces the same clusters.

use serde::Serialize;

use super::{haversine_km, is_valid_coordinate};

/// 50 miles.
pub const CLUSTER_RADIUS_KM: f64 = 80.47;

/// One applicant location with the fields shown on the map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantPoint {
    pub user_id: String,
    pub username: String,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip)]
    pub latitude: f64,
    #[serde(skip)]
    pub longitude: f64,
}

impl ApplicantPoint {
    /// Build a point, or `None` when either coordinate is missing or out of range.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        headline: impl Into<String>,
        location: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Option<Self> {
        let (latitude, longitude) = (latitude?, longitude?);
        if !is_valid_coordinate(latitude, longitude) {
            return None;
        }
        Some(Self {
            user_id: user_id.into(),
            username: username.into(),
            headline: headline.into(),
            location,
            latitude,
            longitude,
        })
    }
}

/// A reported cluster: centroid, size, and members in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantCluster {
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
    pub members: Vec<ApplicantPoint>,
}

struct Accumulator {
    lat_sum: f64,
    lon_sum: f64,
    members: Vec<ApplicantPoint>,
}

impl Accumulator {
    fn centroid(&self) -> (f64, f64) {
        let n = self.members.len() as f64;
        (self.lat_sum / n, self.lon_sum / n)
    }

    fn push(&mut self, point: ApplicantPoint) {
        self.lat_sum += point.latitude;
        self.lon_sum += point.longitude;
        self.members.push(point);
    }
}

/// Cluster applicants in input order. Points with invalid coordinates are
/// skipped; clusters with a single member are not reported.
pub fn cluster_applicants<I>(points: I) -> Vec<ApplicantCluster>
where
    I: IntoIterator<Item = ApplicantPoint>,
{
    let mut clusters: Vec<Accumulator> = Vec::new();

    for point in points {
        if !is_valid_coordinate(point.latitude, point.longitude) {
            continue;
        }

        let home = clusters.iter().position(|c| {
            let (lat, lon) = c.centroid();
            haversine_km(point.latitude, point.longitude, lat, lon) <= CLUSTER_RADIUS_KM
        });

        match home {
            Some(i) => clusters[i].push(point),
            None => clusters.push(Accumulator {
                lat_sum: point.latitude,
                lon_sum: point.longitude,
                members: vec![point],
            }),
        }
    }

    clusters
        .into_iter()
        .filter(|c| c.members.len() > 1)
        .map(|c| {
            let (latitude, longitude) = c.centroid();
            ApplicantCluster {
                latitude,
                longitude,
                count: c.members.len(),
                members: c.members,
            }
        })
        .collect()
}
