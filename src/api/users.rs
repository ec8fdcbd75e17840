//! User, profile and skill endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{required, success, validate_coordinates, ApiResult};
use crate::auth::{MaybeRequester, Requester};
use crate::errors::AppError;
use crate::models::{CandidateProfile, CreateUserRequest, Skill, UpsertProfileRequest, User};
use crate::AppState;

const MAX_USERNAME_LEN: usize = 150;

/// POST /api/users - Register a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let username = request.username.trim();
    required(username, "Username")?;
    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(AppError::Validation(
            "Username may contain only letters, digits and @/./+/-/_".to_string(),
        ));
    }

    let user = state.repo.create_user(&request).await?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");
    success(user)
}

/// GET /api/users/{username}/profile - View a profile.
///
/// Private profiles are only visible to their owner.
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeRequester(requester): MaybeRequester,
    Path(username): Path<String>,
) -> ApiResult<CandidateProfile> {
    let not_found = || AppError::NotFound(format!("Profile for {} not found", username));

    let user = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or_else(not_found)?;
    let profile = state.repo.get_profile(&user.id).await?.ok_or_else(not_found)?;

    let is_owner = requester.is_some_and(|r| r.id == user.id);
    if !profile.is_public && !is_owner {
        return Err(not_found());
    }

    success(profile)
}

/// PUT /api/profile - Create or update the caller's profile.
pub async fn upsert_profile(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<UpsertProfileRequest>,
) -> ApiResult<CandidateProfile> {
    let user = requester.require_seeker()?;

    required(&request.headline, "Headline")?;
    validate_coordinates(request.latitude, request.longitude)?;
    for project in &request.projects {
        required(&project.title, "Project title")?;
    }
    for education in &request.education {
        required(&education.school, "School")?;
        if !(1..=12).contains(&education.graduation_month) {
            return Err(AppError::Validation(
                "Graduation month must be between 1 and 12".to_string(),
            ));
        }
    }
    for work in &request.work_experience {
        required(&work.company, "Company")?;
    }

    let profile = state.repo.upsert_profile(&user.id, &request).await?;
    tracing::info!(
        user_id = %user.id,
        skills = profile.skills.len(),
        projects = profile.projects.len(),
        education = profile.education.len(),
        work_experience = profile.work_experience.len(),
        "Profile saved"
    );
    success(profile)
}

/// GET /api/skills - List all skills.
pub async fn list_skills(State(state): State<AppState>) -> ApiResult<Vec<Skill>> {
    success(state.repo.list_skills().await?)
}
