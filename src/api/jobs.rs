//! Job posting endpoints: listing, full-text search, radius search, editing
//! and applications.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{required, success, validate_coordinates, ApiResult};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::geo::{
    is_valid_coordinate, is_valid_radius, jobs_within, NearbyJob, DEFAULT_SEARCH_RADIUS_KM,
    MAX_RADIUS_KM,
};
use crate::matching::{filter_jobs, JobCriteria};
use crate::models::{
    Application, ApplicationSummary, ApplyRequest, CreateJobRequest, Job, VisaSponsorship,
    WorkArrangement,
};
use crate::AppState;

/// Job listing filters, kept as text so bad values get the JSON error envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub title: Option<String>,
    pub skills: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
    pub remote_or_on_site: Option<String>,
    pub visa_sponsorship: Option<String>,
}

impl JobListQuery {
    pub fn criteria(self) -> Result<JobCriteria, AppError> {
        let remote_or_on_site = match present(self.remote_or_on_site.as_deref()) {
            None => None,
            Some(raw) => Some(WorkArrangement::parse(raw).ok_or_else(|| {
                AppError::BadRequest(
                    "remoteOrOnSite must be one of remote, on_site, hybrid".to_string(),
                )
            })?),
        };
        let visa_sponsorship = match present(self.visa_sponsorship.as_deref()) {
            None => None,
            Some(raw) => Some(VisaSponsorship::parse(raw).ok_or_else(|| {
                AppError::BadRequest("visaSponsorship must be yes or no".to_string())
            })?),
        };

        Ok(JobCriteria {
            min_salary: parse_number(self.min_salary.as_deref(), "minSalary")?,
            max_salary: parse_number(self.max_salary.as_deref(), "maxSalary")?,
            title: self.title,
            skills: self.skills,
            location: self.location,
            remote_or_on_site,
            visa_sponsorship,
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/jobs - List jobs, newest first, narrowed by the given filters.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Vec<Job>> {
    let criteria = query.criteria()?;
    let jobs = state.repo.list_jobs().await?;
    let matched = filter_jobs(&jobs, &criteria).into_iter().cloned().collect();
    success(matched)
}

/// Full-text search parameters.
#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchResult {
    #[serde(flatten)]
    pub job: Job,
    pub score: f32,
}

/// GET /api/jobs/search - Full-text search over jobs.
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchQuery>,
) -> ApiResult<Vec<JobSearchResult>> {
    let q = params
        .q
        .ok_or_else(|| AppError::BadRequest("q is required".to_string()))?;
    let limit = match present(params.limit.as_deref()) {
        None => DEFAULT_SEARCH_LIMIT,
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            AppError::BadRequest("limit must be a non-negative integer".to_string())
        })?,
    };

    let hits = state.search.search(&q, limit.min(MAX_SEARCH_LIMIT))?;

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        // The index can briefly lag a delete.
        if let Some(job) = state.repo.get_job(&hit.job_id).await? {
            results.push(JobSearchResult {
                job,
                score: hit.score,
            });
        }
    }

    success(results)
}

/// Radius search parameters, kept as text so bad numbers get the JSON error envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius_km: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyJobResult {
    #[serde(flatten)]
    pub job: Job,
    pub distance_km: f64,
}

impl From<NearbyJob<'_>> for NearbyJobResult {
    fn from(nearby: NearbyJob<'_>) -> Self {
        Self {
            job: nearby.job.clone(),
            distance_km: nearby.distance_km,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyJobs {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub jobs: Vec<NearbyJobResult>,
}

fn parse_number(value: Option<&str>, name: &str) -> Result<Option<f64>, AppError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be a number", name))),
    }
}

/// GET /api/jobs/near - Jobs within a radius of a point, nearest first.
pub async fn jobs_near(
    State(state): State<AppState>,
    Query(params): Query<NearQuery>,
) -> ApiResult<NearbyJobs> {
    let latitude = parse_number(params.lat.as_deref(), "lat")?
        .ok_or_else(|| AppError::BadRequest("lat is required".to_string()))?;
    let longitude = parse_number(params.lng.as_deref(), "lng")?
        .ok_or_else(|| AppError::BadRequest("lng is required".to_string()))?;
    let radius_km =
        parse_number(params.radius_km.as_deref(), "radiusKm")?.unwrap_or(DEFAULT_SEARCH_RADIUS_KM);

    if !is_valid_coordinate(latitude, longitude) {
        return Err(AppError::BadRequest(
            "lat must be within [-90, 90] and lng within [-180, 180]".to_string(),
        ));
    }
    if !is_valid_radius(radius_km) {
        return Err(AppError::BadRequest(format!(
            "radiusKm must be greater than 0 and at most {}",
            MAX_RADIUS_KM
        )));
    }

    let jobs = state.repo.list_jobs().await?;
    let nearby = jobs_within(&jobs, latitude, longitude, radius_km)
        .into_iter()
        .map(NearbyJobResult::from)
        .collect();

    success(NearbyJobs {
        latitude,
        longitude,
        radius_km,
        jobs: nearby,
    })
}

/// GET /api/jobs/{id} - Job detail.
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Job> {
    match state.repo.get_job(&id).await? {
        Some(job) => success(job),
        None => Err(AppError::NotFound(format!("Job {} not found", id))),
    }
}

fn validate_job(request: &CreateJobRequest) -> Result<(), AppError> {
    required(&request.title, "Title")?;
    required(&request.skills, "Skills")?;
    validate_coordinates(request.latitude, request.longitude)?;
    if request.salary.is_some_and(|s| !s.is_finite() || s < 0.0) {
        return Err(AppError::Validation(
            "Salary must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Load a job the requester posted: 404 if it does not exist, 403 if someone
/// else posted it.
async fn owned_job(
    state: &AppState,
    requester: &Requester,
    id: &str,
    action: &str,
) -> Result<Job, AppError> {
    let job = state
        .repo
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
    if job.posted_by != requester.0.id {
        return Err(AppError::Forbidden(format!(
            "Only the posting recruiter can {} this job",
            action
        )));
    }
    Ok(job)
}

/// POST /api/jobs - Post a job.
pub async fn create_job(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<Job> {
    let user = requester.require_recruiter()?;
    validate_job(&request)?;

    let job = state.repo.create_job(&user.id, &request).await?;

    if let Err(e) = state.search.index_job(&job).await {
        tracing::warn!(job_id = %job.id, "Failed to index job: {}", e);
    }

    tracing::info!(job_id = %job.id, recruiter_id = %user.id, "Job posted");
    success(job)
}

/// PUT /api/jobs/{id} - Edit one of the caller's jobs.
pub async fn update_job(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<Job> {
    owned_job(&state, &requester, &id, "edit").await?;
    validate_job(&request)?;

    let job = state.repo.update_job(&id, &request).await?;

    if let Err(e) = state.search.index_job(&job).await {
        tracing::warn!(job_id = %job.id, "Failed to reindex job: {}", e);
    }

    tracing::info!(job_id = %job.id, "Job updated");
    success(job)
}

/// DELETE /api/jobs/{id} - Delete one of the caller's jobs.
pub async fn delete_job(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<()> {
    owned_job(&state, &requester, &id, "delete").await?;

    state.repo.delete_job(&id).await?;

    if let Err(e) = state.search.remove_job(&id).await {
        tracing::warn!(job_id = %id, "Failed to remove job from index: {}", e);
    }

    success(())
}

/// POST /api/jobs/{id}/apply - Apply to a job.
pub async fn apply_to_job(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Application> {
    let user = requester.require_seeker()?;

    if state.repo.get_job(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", id)));
    }

    let application = state.repo.create_application(&id, &user.id, &request).await?;
    tracing::info!(job_id = %id, applicant_id = %user.id, "Application submitted");
    success(application)
}

/// GET /api/jobs/{id}/application - The caller's application to a job.
pub async fn track_application(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<ApplicationSummary> {
    let user = requester.require_seeker()?;

    match state.repo.find_application(&id, &user.id).await? {
        Some(application) => success(application),
        None => Err(AppError::NotFound(format!(
            "You have not applied to job {}",
            id
        ))),
    }
}
