//! Saved candidate search and the notification ledger row.

use serde::{Deserialize, Serialize};

use super::Skill;

/// How a multi-skill selection is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkillMode {
    /// Candidate must have every selected skill.
    All,
    /// Candidate must have at least one selected skill.
    #[default]
    Any,
}

impl SkillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillMode::All => "all",
            SkillMode::Any => "any",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(SkillMode::All),
            "any" => Some(SkillMode::Any),
            _ => None,
        }
    }
}

/// A recruiter's persisted candidate search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub recruiter_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub skills: Vec<Skill>,
    pub mode: SkillMode,
    pub is_active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<String>,
}

/// Request body for saving a search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedSearchRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub mode: SkillMode,
}

/// Ledger entry: the recruiter was told about `candidate_id` for this search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatchNotification {
    pub saved_search_id: String,
    pub candidate_id: String,
    pub notified_at: String,
}
