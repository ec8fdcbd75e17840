//! User model. Identity is owned by the upstream auth service; only the
//! fields matching needs are kept here.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Recruiter,
    Seeker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Recruiter => "recruiter",
            Role::Seeker => "seeker",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recruiter" => Some(Role::Recruiter),
            "seeker" => Some(Role::Seeker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_recruiter(&self) -> bool {
        self.role == Role::Recruiter
    }
}

/// Request body for registering a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}
