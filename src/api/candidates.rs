//! Recruiter candidate search.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::alerts::CandidateMatch;
use crate::auth::Requester;
use crate::errors::AppError;
use crate::matching::{
    filter_candidates, rank_candidates, recommend_candidates, CandidateCriteria,
};
use crate::models::{CandidateProfile, SkillMode};
use crate::AppState;

/// Candidate search parameters. `skills` is comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSearchQuery {
    pub location: Option<String>,
    pub keyword: Option<String>,
    pub skills: Option<String>,
    pub mode: Option<String>,
}

impl CandidateSearchQuery {
    fn criteria(&self) -> Result<CandidateCriteria, AppError> {
        let mode = match self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            None => SkillMode::default(),
            Some(raw) => SkillMode::parse(&raw.to_lowercase()).ok_or_else(|| {
                AppError::Validation(format!("Unknown skill mode {}, expected all or any", raw))
            })?,
        };
        let skills = self.skills.as_deref().unwrap_or_default().split(',');

        Ok(CandidateCriteria::new(
            self.location.as_deref(),
            self.keyword.as_deref(),
            skills,
            mode,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCandidateView {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    pub matched_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendationView {
    pub job_id: String,
    pub job_title: String,
    pub candidates: Vec<RecommendedCandidateView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSearchResponse {
    pub candidates: Vec<CandidateMatch>,
    pub has_filters: bool,
    /// Present only for an unfiltered search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<JobRecommendationView>>,
    pub has_matches: bool,
}

/// GET /api/candidates/search - Filter and rank candidates.
///
/// Without filters the recruiter's own jobs drive per-job recommendations,
/// and recommended candidates are left out of the generic list.
pub async fn search_candidates(
    State(state): State<AppState>,
    requester: Requester,
    Query(query): Query<CandidateSearchQuery>,
) -> ApiResult<CandidateSearchResponse> {
    let recruiter = requester.require_recruiter()?;
    let criteria = query.criteria()?;

    let pool = state.repo.list_candidate_pool().await?;
    let ranked = rank_candidates(filter_candidates(&pool, &criteria), &criteria);

    if !criteria.is_empty() {
        let candidates: Vec<CandidateMatch> = ranked.into_iter().map(CandidateMatch::from).collect();
        tracing::debug!(recruiter_id = %recruiter.id, results = candidates.len(), "Candidate search");
        return success(CandidateSearchResponse {
            candidates,
            has_filters: true,
            recommendations: None,
            has_matches: false,
        });
    }

    let jobs = state.repo.list_jobs_by_recruiter(&recruiter.id).await?;
    let recs = recommend_candidates(&jobs, &pool);

    let candidates = recs
        .exclude_from(ranked, |r| r.profile.user_id.as_str())
        .into_iter()
        .map(CandidateMatch::from)
        .collect();

    let has_matches = recs.has_matches();
    let recommendations = recs
        .by_job
        .into_iter()
        .map(|rec| JobRecommendationView {
            job_id: rec.job.id.clone(),
            job_title: rec.job.title.clone(),
            candidates: rec
                .candidates
                .into_iter()
                .map(|c| RecommendedCandidateView {
                    profile: c.profile.clone(),
                    matched_skills: c.matched_skills,
                })
                .collect(),
        })
        .collect();

    success(CandidateSearchResponse {
        candidates,
        has_filters: false,
        recommendations: Some(recommendations),
        has_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_criteria() {
        let query = CandidateSearchQuery {
            location: Some("  ".to_string()),
            keyword: None,
            skills: Some("Python, ,SQL,python".to_string()),
            mode: Some("ALL".to_string()),
        };
        let criteria = query.criteria().unwrap();
        assert_eq!(criteria.mode, SkillMode::All);
        assert_eq!(criteria.skills.len(), 2);
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_blank_query_is_empty() {
        let criteria = CandidateSearchQuery::default().criteria().unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let query = CandidateSearchQuery {
            mode: Some("some".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.criteria(), Err(AppError::Validation(_))));
    }
}
