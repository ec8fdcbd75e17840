//! Per-job candidate recommendations for a recruiter's default view.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use super::normalize_skill_set;
use crate::models::{CandidateProfile, Job};

/// Minimum number of shared skills for a candidate to be recommended.
pub const RECOMMENDATION_THRESHOLD: usize = 2;

/// Split a job's free-text skill field into normalized names.
pub fn parse_skill_field(field: &str) -> BTreeSet<String> {
    normalize_skill_set(field.split(','))
}

#[derive(Debug, Clone)]
pub struct RecommendedCandidate<'a> {
    pub profile: &'a CandidateProfile,
    pub matched_skills: Vec<String>,
}

impl RecommendedCandidate<'_> {
    pub fn overlap(&self) -> usize {
        self.matched_skills.len()
    }
}

#[derive(Debug, Clone)]
pub struct JobRecommendation<'a> {
    pub job: &'a Job,
    pub candidates: Vec<RecommendedCandidate<'a>>,
}

/// Recommendations for every job, in job order.
#[derive(Debug, Clone, Default)]
pub struct Recommendations<'a> {
    pub by_job: Vec<JobRecommendation<'a>>,
    recommended: HashSet<&'a str>,
}

impl<'a> Recommendations<'a> {
    pub fn has_matches(&self) -> bool {
        self.by_job.iter().any(|r| !r.candidates.is_empty())
    }

    /// Whether the candidate is recommended under any job.
    pub fn contains(&self, user_id: &str) -> bool {
        self.recommended.contains(user_id)
    }

    /// Drop every recommended candidate from a generic listing.
    pub fn exclude_from<T, F>(&self, items: Vec<T>, user_id: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        items
            .into_iter()
            .filter(|item| !self.contains(user_id(item)))
            .collect()
    }
}

/// Match each job's required skills against every candidate in `pool`.
pub fn recommend_candidates<'a>(
    jobs: &'a [Job],
    pool: &'a [CandidateProfile],
) -> Recommendations<'a> {
    let candidate_skills: Vec<(&'a CandidateProfile, BTreeSet<String>)> = pool
        .iter()
        .map(|p| (p, normalize_skill_set(p.skill_names())))
        .collect();

    let mut recommended = HashSet::new();
    let mut by_job = Vec::with_capacity(jobs.len());

    for job in jobs {
        let required = parse_skill_field(&job.skills);
        let mut candidates: Vec<RecommendedCandidate<'a>> = candidate_skills
            .iter()
            .filter_map(|(profile, skills)| {
                let matched: Vec<String> = required.intersection(skills).cloned().collect();
                (matched.len() >= RECOMMENDATION_THRESHOLD).then(|| RecommendedCandidate {
                    profile: *profile,
                    matched_skills: matched,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            (Reverse(a.overlap()), &a.profile.username)
                .cmp(&(Reverse(b.overlap()), &b.profile.username))
        });
        for c in &candidates {
            recommended.insert(c.profile.user_id.as_str());
        }

        by_job.push(JobRecommendation { job, candidates });
    }

    Recommendations {
        by_job,
        recommended,
    }
}
