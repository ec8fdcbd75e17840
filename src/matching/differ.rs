//! Saved-search re-evaluation against the notification ledger.

use std::collections::HashSet;

use super::{filter_candidates, rank_candidates, CandidateCriteria, RankedCandidate};
use crate::models::{CandidateProfile, SavedSearch};

/// Current and not-yet-notified matches for one saved search.
#[derive(Debug, Clone)]
pub struct SearchDiff<'a> {
    pub current: Vec<RankedCandidate<'a>>,
    /// Always empty for an inactive search.
    pub new: Vec<RankedCandidate<'a>>,
}

impl SearchDiff<'_> {
    pub fn match_count(&self) -> usize {
        self.current.len()
    }

    pub fn new_match_count(&self) -> usize {
        self.new.len()
    }
}

/// Re-run `search` against `pool` and split out candidates whose ids are not
/// in `notified`.
pub fn diff_saved_search<'a>(
    search: &SavedSearch,
    pool: &'a [CandidateProfile],
    notified: &HashSet<String>,
) -> SearchDiff<'a> {
    let criteria = CandidateCriteria::from_saved_search(search);
    let current = rank_candidates(filter_candidates(pool, &criteria), &criteria);

    let new = if search.is_active {
        current
            .iter()
            .filter(|r| !notified.contains(&r.profile.user_id))
            .copied()
            .collect()
    } else {
        Vec::new()
    };

    SearchDiff { current, new }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::candidate;
    use crate::models::{Skill, SkillMode};

    fn search(skills: &[&str], mode: SkillMode, active: bool) -> SavedSearch {
        SavedSearch {
            id: "search-1".to_string(),
            recruiter_id: "recruiter-1".to_string(),
            name: "backend".to_string(),
            location: None,
            keyword: None,
            skills: skills
                .iter()
                .map(|s| Skill {
                    id: format!("skill-{}", s),
                    name: s.to_string(),
                })
                .collect(),
            mode,
            is_active: active,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            last_checked: None,
        }
    }

    fn ids(ranked: &[RankedCandidate<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.profile.user_id.clone()).collect()
    }

    #[test]
    fn test_new_excludes_notified() {
        let pool = vec![
            candidate("alice", &["Python"]),
            candidate("bob", &["Python", "SQL"]),
            candidate("carol", &["Go"]),
        ];
        let notified: HashSet<String> = ["id-alice".to_string()].into_iter().collect();

        let diff = diff_saved_search(&search(&["Python", "SQL"], SkillMode::Any, true), &pool, &notified);

        assert_eq!(ids(&diff.current), vec!["id-bob", "id-alice"]);
        assert_eq!(ids(&diff.new), vec!["id-bob"]);
        assert_eq!(diff.match_count(), 2);
        assert_eq!(diff.new_match_count(), 1);
    }

    #[test]
    fn test_inactive_search_has_no_new_matches() {
        let pool = vec![candidate("alice", &["Python"])];
        let diff = diff_saved_search(&search(&["Python"], SkillMode::Any, false), &pool, &HashSet::new());

        assert_eq!(diff.match_count(), 1);
        assert_eq!(diff.new_match_count(), 0);
    }

    #[test]
    fn test_repeated_dry_runs_agree() {
        let pool = vec![candidate("alice", &["Python"]), candidate("bob", &["Python"])];
        let saved = search(&["python"], SkillMode::All, true);
        let notified = HashSet::new();

        let first = ids(&diff_saved_search(&saved, &pool, &notified).new);
        let second = ids(&diff_saved_search(&saved, &pool, &notified).new);
        assert_eq!(first, second);
    }

    #[test]
    fn test_candidate_who_gains_a_skill_becomes_new() {
        let mut pool = vec![candidate("alice", &["Go"])];
        let saved = search(&["Rust"], SkillMode::Any, true);
        assert_eq!(diff_saved_search(&saved, &pool, &HashSet::new()).new_match_count(), 0);

        pool[0] = candidate("alice", &["Go", "Rust"]);
        assert_eq!(diff_saved_search(&saved, &pool, &HashSet::new()).new_match_count(), 1);
    }
}
