//! Criteria-based narrowing of the candidate pool and the job list.

use std::collections::{BTreeSet, HashSet};

use super::{contains_ci, normalize_skill, normalize_skill_set};
use crate::models::{CandidateProfile, Job, SavedSearch, SkillMode, VisaSponsorship, WorkArrangement};

/// Recruiter-side candidate search criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateCriteria {
    pub location: Option<String>,
    pub keyword: Option<String>,
    pub skills: BTreeSet<String>,
    pub mode: SkillMode,
}

impl CandidateCriteria {
    /// Build criteria from raw input. Blank text fields are treated as absent
    /// and skill names are normalized.
    pub fn new<I, S>(location: Option<&str>, keyword: Option<&str>, skills: I, mode: SkillMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            location: non_blank(location),
            keyword: non_blank(keyword),
            skills: normalize_skill_set(skills),
            mode,
        }
    }

    /// Criteria stored on a saved search.
    pub fn from_saved_search(search: &SavedSearch) -> Self {
        Self::new(
            search.location.as_deref(),
            search.keyword.as_deref(),
            search.skills.iter().map(|s| s.name.as_str()),
            search.mode,
        )
    }

    /// No location, keyword, or skills selected.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.keyword.is_none() && self.skills.is_empty()
    }

    pub fn matches(&self, profile: &CandidateProfile) -> bool {
        if let Some(location) = &self.location {
            match &profile.location {
                Some(candidate_location) if contains_ci(candidate_location, location) => {}
                _ => return false,
            }
        }

        if let Some(keyword) = &self.keyword {
            let in_projects = profile.projects.iter().any(|p| {
                contains_ci(&p.title, keyword)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, keyword))
            });
            if !in_projects {
                return false;
            }
        }

        if self.skills.is_empty() {
            return true;
        }

        let owned: HashSet<String> = profile.skill_names().map(normalize_skill).collect();
        match self.mode {
            SkillMode::All => self.skills.iter().all(|s| owned.contains(s)),
            SkillMode::Any => self.skills.iter().any(|s| owned.contains(s)),
        }
    }
}

/// Candidates from `pool` satisfying `criteria`, in pool order, each at most once.
pub fn filter_candidates<'a>(
    pool: &'a [CandidateProfile],
    criteria: &CandidateCriteria,
) -> Vec<&'a CandidateProfile> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for profile in pool {
        if criteria.matches(profile) && seen.insert(profile.user_id.as_str()) {
            found.push(profile);
        }
    }
    found
}

/// Job listing criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCriteria {
    pub title: Option<String>,
    /// Comma-separated; every term must appear in the job's skills text.
    pub skills: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub remote_or_on_site: Option<WorkArrangement>,
    pub visa_sponsorship: Option<VisaSponsorship>,
}

impl JobCriteria {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(title) = non_blank(self.title.as_deref()) {
            if !contains_ci(&job.title, &title) {
                return false;
            }
        }

        if let Some(skills) = &self.skills {
            let all_terms = skills
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .all(|term| contains_ci(&job.skills, term));
            if !all_terms {
                return false;
            }
        }

        if let Some(location) = non_blank(self.location.as_deref()) {
            match &job.location {
                Some(job_location) if contains_ci(job_location, &location) => {}
                _ => return false,
            }
        }

        if let Some(min) = self.min_salary {
            if !job.salary.is_some_and(|s| s >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_salary {
            if !job.salary.is_some_and(|s| s <= max) {
                return false;
            }
        }

        if self
            .remote_or_on_site
            .is_some_and(|w| w != job.remote_or_on_site)
        {
            return false;
        }
        if self
            .visa_sponsorship
            .is_some_and(|v| v != job.visa_sponsorship)
        {
            return false;
        }

        true
    }
}

pub fn filter_jobs<'a>(jobs: &'a [Job], criteria: &JobCriteria) -> Vec<&'a Job> {
    jobs.iter().filter(|j| criteria.matches(j)).collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::{candidate, job, with_location, with_project};

    fn usernames(found: &[&CandidateProfile]) -> Vec<String> {
        found.iter().map(|p| p.username.clone()).collect()
    }

    #[test]
    fn test_all_mode_requires_superset() {
        let pool = vec![
            candidate("alice", &["Python", "SQL", "Go"]),
            candidate("bob", &["Python"]),
            candidate("carol", &["sql", "python"]),
        ];
        let criteria = CandidateCriteria::new(None, None, ["python", "SQL"], SkillMode::All);

        assert_eq!(usernames(&filter_candidates(&pool, &criteria)), vec!["alice", "carol"]);
    }

    #[test]
    fn test_any_mode_requires_intersection() {
        let pool = vec![
            candidate("alice", &["Go"]),
            candidate("bob", &["Python"]),
            candidate("carol", &["Rust"]),
        ];
        let criteria = CandidateCriteria::new(None, None, ["python", "rust"], SkillMode::Any);

        assert_eq!(usernames(&filter_candidates(&pool, &criteria)), vec!["bob", "carol"]);
    }

    #[test]
    fn test_unknown_skill_in_all_mode_matches_nobody() {
        let pool = vec![candidate("alice", &["Python"])];
        let criteria = CandidateCriteria::new(None, None, ["python", "cobol"], SkillMode::All);

        assert!(filter_candidates(&pool, &criteria).is_empty());
    }

    #[test]
    fn test_location_and_keyword_are_conjunctive() {
        let pool = vec![
            with_project(
                with_location(candidate("alice", &[]), "Atlanta, GA"),
                "Compiler",
                "A toy compiler",
            ),
            with_location(candidate("bob", &[]), "Atlanta, GA"),
            with_project(
                with_location(candidate("carol", &[]), "Austin, TX"),
                "Compiler",
                "",
            ),
        ];
        let criteria =
            CandidateCriteria::new(Some("atlanta"), Some("COMPILER"), Vec::<String>::new(), SkillMode::Any);

        assert_eq!(usernames(&filter_candidates(&pool, &criteria)), vec!["alice"]);
    }

    #[test]
    fn test_keyword_matches_title_or_description() {
        let pool = vec![
            with_project(candidate("alice", &[]), "Chess engine", "bitboards"),
            with_project(candidate("bob", &[]), "Website", "Built a chess club site"),
            with_project(candidate("carol", &[]), "Website", "Bakery"),
        ];
        let criteria = CandidateCriteria::new(None, Some("chess"), Vec::<String>::new(), SkillMode::Any);

        assert_eq!(usernames(&filter_candidates(&pool, &criteria)), vec!["alice", "bob"]);
    }

    #[test]
    fn test_results_are_deduplicated() {
        let alice = candidate("alice", &["Python"]);
        let pool = vec![alice.clone(), alice];
        let criteria = CandidateCriteria::new(None, None, ["python"], SkillMode::Any);

        assert_eq!(filter_candidates(&pool, &criteria).len(), 1);
    }

    #[test]
    fn test_blank_criteria_are_empty() {
        let criteria = CandidateCriteria::new(Some("  "), Some(""), [" "], SkillMode::All);
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_job_skill_terms_all_required() {
        let jobs = vec![
            job("1", "Backend Engineer", "Python, Django, SQL"),
            job("2", "Frontend Engineer", "React, JS"),
        ];
        let criteria = JobCriteria {
            skills: Some("python, sql".to_string()),
            ..Default::default()
        };

        let found = filter_jobs(&jobs, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_job_salary_bounds_exclude_unsalaried() {
        let mut paid = job("1", "Engineer", "Rust");
        paid.salary = Some(120_000.0);
        let unpaid = job("2", "Engineer", "Rust");
        let jobs = vec![paid, unpaid];

        let criteria = JobCriteria {
            min_salary: Some(100_000.0),
            max_salary: Some(150_000.0),
            ..Default::default()
        };
        let found = filter_jobs(&jobs, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_job_enum_filters() {
        let mut remote = job("1", "Engineer", "Rust");
        remote.remote_or_on_site = WorkArrangement::Remote;
        remote.visa_sponsorship = VisaSponsorship::Yes;
        let onsite = job("2", "Engineer", "Rust");
        let jobs = vec![remote, onsite];

        let criteria = JobCriteria {
            title: Some("engineer".to_string()),
            remote_or_on_site: Some(WorkArrangement::Remote),
            visa_sponsorship: Some(VisaSponsorship::Yes),
            ..Default::default()
        };
        let found = filter_jobs(&jobs, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }
}
