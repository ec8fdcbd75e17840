//! Application tracking for seekers and the hiring workflow for recruiters.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::models::{ApplicationStatus, ApplicationSummary, UpdateApplicationRequest};
use crate::AppState;

/// GET /api/applications/mine - The caller's applications, most recent first.
pub async fn my_applications(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<ApplicationSummary>> {
    let user = requester.require_seeker()?;
    success(state.repo.list_applications_by_applicant(&user.id).await?)
}

/// GET /api/applications/manage - Applications to the caller's jobs.
pub async fn manage_applications(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<ApplicationSummary>> {
    let recruiter = requester.require_recruiter()?;
    success(
        state
            .repo
            .list_applications_for_recruiter(&recruiter.id)
            .await?,
    )
}

/// PATCH /api/applications/{id} - Move an application to a new status.
/// Only the recruiter who posted the job may do this.
pub async fn update_application_status(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<UpdateApplicationRequest>,
) -> ApiResult<ApplicationSummary> {
    let status = ApplicationStatus::parse(request.status.trim()).ok_or_else(|| {
        AppError::Validation(
            "Status must be one of applied, review, interview, offer, closed".to_string(),
        )
    })?;

    let application = state
        .repo
        .get_application(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;

    let job = state
        .repo
        .get_job(&application.application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;
    if job.posted_by != requester.0.id {
        return Err(AppError::Forbidden(
            "Only the posting recruiter can update this application".to_string(),
        ));
    }

    let updated = state.repo.update_application_status(&id, status).await?;
    tracing::info!(
        application_id = %id,
        from = application.application.status.as_str(),
        to = status.as_str(),
        "Application status updated"
    );
    success(updated)
}
