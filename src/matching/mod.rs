//! Candidate and job matching.
//!
//! Everything here is pure and synchronous: callers load the pool from the
//! repository, hand it in, and get borrowed, ordered views back. Nothing in
//! this module fails; bad input narrows the result instead.

mod differ;
mod filter;
mod recommend;
mod scorer;

pub use differ::*;
pub use filter::*;
pub use recommend::*;
pub use scorer::*;

use std::collections::BTreeSet;

/// Canonical form used whenever two skill names are compared.
pub fn normalize_skill(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a list of skill names into a set, dropping blanks.
pub fn normalize_skill_set<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| normalize_skill(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}

/// Case-insensitive substring test.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{CandidateProfile, Job, Project, Skill, VisaSponsorship, WorkArrangement};

    pub fn candidate(username: &str, skills: &[&str]) -> CandidateProfile {
        CandidateProfile {
            user_id: format!("id-{}", username),
            username: username.to_string(),
            email: None,
            headline: format!("{} headline", username),
            bio: None,
            location: None,
            latitude: None,
            longitude: None,
            is_public: true,
            skills: skills
                .iter()
                .map(|s| Skill {
                    id: format!("skill-{}", s.to_lowercase()),
                    name: s.to_string(),
                })
                .collect(),
            projects: Vec::new(),
            education: Vec::new(),
            work_experience: Vec::new(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    pub fn with_location(mut profile: CandidateProfile, location: &str) -> CandidateProfile {
        profile.location = Some(location.to_string());
        profile
    }

    pub fn with_project(
        mut profile: CandidateProfile,
        title: &str,
        description: &str,
    ) -> CandidateProfile {
        profile.projects.push(Project {
            id: format!("proj-{}", profile.projects.len()),
            title: title.to_string(),
            url: None,
            description: Some(description.to_string()),
        });
        profile
    }

    pub fn job(id: &str, title: &str, skills: &str) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company: String::new(),
            description: String::new(),
            skills: skills.to_string(),
            salary: None,
            location: None,
            latitude: None,
            longitude: None,
            city: String::new(),
            state: String::new(),
            remote_or_on_site: WorkArrangement::OnSite,
            visa_sponsorship: VisaSponsorship::No,
            posted_by: "recruiter-1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }
}
