//! Applicant location clusters for the recruiter map.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::geo::{cluster_applicants, ApplicantCluster, CLUSTER_RADIUS_KM};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterQuery {
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResponse {
    pub radius_km: f64,
    pub applicants_placed: usize,
    pub clusters: Vec<ApplicantCluster>,
}

/// GET /api/applicant-clusters - Cluster applicants to the caller's jobs,
/// optionally restricted to one job.
pub async fn applicant_clusters(
    State(state): State<AppState>,
    requester: Requester,
    Query(query): Query<ClusterQuery>,
) -> ApiResult<ClusterResponse> {
    let recruiter = requester.require_recruiter()?;
    let job_id = query.job_id.as_deref().map(str::trim).filter(|j| !j.is_empty());

    if let Some(job_id) = job_id {
        let job = state
            .repo
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
        if job.posted_by != recruiter.id {
            return Err(AppError::Forbidden(
                "Applicants of this job are not visible to you".to_string(),
            ));
        }
    }

    let points = state
        .repo
        .list_applicant_points(&recruiter.id, job_id)
        .await?;
    let applicants_placed = points.len();

    success(ClusterResponse {
        radius_km: CLUSTER_RADIUS_KM,
        applicants_placed,
        clusters: cluster_applicants(points),
    })
}
