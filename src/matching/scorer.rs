//! Skill match scoring and result ordering.

use std::cmp::Reverse;
use std::collections::HashSet;

use super::{normalize_skill, CandidateCriteria};
use crate::models::{CandidateProfile, SkillMode};

/// A filtered candidate with its skill match count, if skills were selected.
#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate<'a> {
    pub profile: &'a CandidateProfile,
    pub score: Option<usize>,
}

/// Number of selected skills the candidate has, each counted once.
pub fn skill_score(profile: &CandidateProfile, criteria: &CandidateCriteria) -> usize {
    match criteria.mode {
        // Containment already holds for every survivor of the filter.
        SkillMode::All => criteria.skills.len(),
        SkillMode::Any => {
            let owned: HashSet<String> = profile.skill_names().map(normalize_skill).collect();
            criteria.skills.iter().filter(|s| owned.contains(*s)).count()
        }
    }
}

/// Score and order filtered candidates: highest score first, then username.
/// Without selected skills the order is by username and no score is set.
pub fn rank_candidates<'a>(
    candidates: Vec<&'a CandidateProfile>,
    criteria: &CandidateCriteria,
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate<'a>> = candidates
        .into_iter()
        .map(|profile| RankedCandidate {
            profile,
            score: (!criteria.skills.is_empty()).then(|| skill_score(profile, criteria)),
        })
        .collect();

    ranked.sort_by(|a, b| {
        (Reverse(a.score), &a.profile.username).cmp(&(Reverse(b.score), &b.profile.username))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::filter_candidates;
    use crate::matching::fixtures::candidate;

    fn summary(ranked: &[RankedCandidate<'_>]) -> Vec<(String, Option<usize>)> {
        ranked
            .iter()
            .map(|r| (r.profile.username.clone(), r.score))
            .collect()
    }

    #[test]
    fn test_any_mode_scores_by_intersection() {
        let pool = vec![
            candidate("dave", &["Python"]),
            candidate("alice", &["Python", "SQL", "Go"]),
            candidate("carol", &["SQL"]),
            candidate("bob", &["Go", "SQL", "Python"]),
        ];
        let criteria = CandidateCriteria::new(None, None, ["python", "sql", "go"], SkillMode::Any);

        let ranked = rank_candidates(filter_candidates(&pool, &criteria), &criteria);
        assert_eq!(
            summary(&ranked),
            vec![
                ("alice".to_string(), Some(3)),
                ("bob".to_string(), Some(3)),
                ("carol".to_string(), Some(1)),
                ("dave".to_string(), Some(1)),
            ]
        );
    }

    #[test]
    fn test_duplicate_skill_rows_are_counted_once() {
        let pool = vec![candidate("alice", &["Python", "python", "PYTHON"])];
        let criteria = CandidateCriteria::new(None, None, ["python", "sql"], SkillMode::Any);

        let ranked = rank_candidates(filter_candidates(&pool, &criteria), &criteria);
        assert_eq!(ranked[0].score, Some(1));
    }

    #[test]
    fn test_all_mode_score_is_selection_size() {
        let pool = vec![
            candidate("bob", &["Python", "SQL", "Go", "Rust"]),
            candidate("alice", &["Python", "SQL"]),
        ];
        let criteria = CandidateCriteria::new(None, None, ["python", "sql"], SkillMode::All);

        let ranked = rank_candidates(filter_candidates(&pool, &criteria), &criteria);
        assert_eq!(
            summary(&ranked),
            vec![("alice".to_string(), Some(2)), ("bob".to_string(), Some(2))]
        );
    }

    #[test]
    fn test_no_skills_orders_by_username_without_score() {
        let pool = vec![
            candidate("zoe", &["Python"]),
            candidate("adam", &[]),
            candidate("mia", &["Go"]),
        ];
        let criteria = CandidateCriteria::default();

        let ranked = rank_candidates(filter_candidates(&pool, &criteria), &criteria);
        assert_eq!(
            summary(&ranked),
            vec![
                ("adam".to_string(), None),
                ("mia".to_string(), None),
                ("zoe".to_string(), None),
            ]
        );
    }
}
