//! Saved candidate search endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{required, success, ApiResult};
use crate::alerts::{evaluate_search, CandidateMatch};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::models::{CreateSavedSearchRequest, SavedSearch, User};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchSummary {
    #[serde(flatten)]
    pub search: SavedSearch,
    pub match_count: usize,
    pub new_match_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchDetail {
    #[serde(flatten)]
    pub search: SavedSearch,
    pub current_matches: Vec<CandidateMatch>,
    pub new_matches: Vec<CandidateMatch>,
}

/// Load a saved search the caller owns.
async fn owned_search(state: &AppState, user: &User, id: &str) -> Result<SavedSearch, AppError> {
    let search = state
        .repo
        .get_saved_search(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Saved search {} not found", id)))?;

    if search.recruiter_id != user.id {
        return Err(AppError::Forbidden(
            "This saved search belongs to another recruiter".to_string(),
        ));
    }
    Ok(search)
}

/// GET /api/saved-searches - The caller's saved searches with match counts.
pub async fn list_saved_searches(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<SavedSearchSummary>> {
    let user = requester.require_recruiter()?;

    let searches = state.repo.list_saved_searches(&user.id).await?;
    let pool = state.repo.list_candidate_pool().await?;

    let mut summaries = Vec::with_capacity(searches.len());
    for search in searches {
        let matches = evaluate_search(&state.repo, &search, &pool).await?;
        summaries.push(SavedSearchSummary {
            match_count: matches.current.len(),
            new_match_count: matches.new.len(),
            search,
        });
    }

    success(summaries)
}

/// POST /api/saved-searches - Save a candidate search.
pub async fn create_saved_search(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateSavedSearchRequest>,
) -> ApiResult<SavedSearch> {
    let user = requester.require_recruiter()?;
    required(&request.name, "Name")?;

    let (skills, missing) = state.repo.find_skills(&request.skills).await?;
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown skills: {}",
            missing.join(", ")
        )));
    }

    let search = state
        .repo
        .create_saved_search(&user.id, &request, &skills)
        .await?;
    tracing::info!(search_id = %search.id, recruiter_id = %user.id, "Saved search created");
    success(search)
}

/// GET /api/saved-searches/{id} - Current and new matches for one search.
pub async fn get_saved_search(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<SavedSearchDetail> {
    let search = owned_search(&state, &requester.0, &id).await?;

    let pool = state.repo.list_candidate_pool().await?;
    let matches = evaluate_search(&state.repo, &search, &pool).await?;

    success(SavedSearchDetail {
        search,
        current_matches: matches.current,
        new_matches: matches.new,
    })
}

/// POST /api/saved-searches/{id}/toggle - Flip the active flag.
pub async fn toggle_saved_search(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<SavedSearch> {
    let mut search = owned_search(&state, &requester.0, &id).await?;

    search.is_active = !search.is_active;
    state
        .repo
        .set_saved_search_active(&id, search.is_active)
        .await?;

    tracing::info!(search_id = %id, active = search.is_active, "Saved search toggled");
    success(search)
}

/// DELETE /api/saved-searches/{id} - Delete a saved search and its ledger.
pub async fn delete_saved_search(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<()> {
    owned_search(&state, &requester.0, &id).await?;
    state.repo.delete_saved_search(&id).await?;
    success(())
}
