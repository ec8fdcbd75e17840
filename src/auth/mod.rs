//! PSK-based authentication and requester identity.
//!
//! The PSK layer guards every `/api` route and uses constant-time comparison
//! to mitigate timing attacks. Behind it, the acting user is taken from the
//! `x-user-id` header set by the upstream auth gateway.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(provided_key) => {
            if constant_time_compare(&provided_key, &expected) {
                next.run(request).await
            } else {
                unauthorized_response("Invalid API key")
            }
        }
        None => {
            // Also accept the key as a bearer token
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(bearer_key) if constant_time_compare(&bearer_key, &expected) => {
                    next.run(request).await
                }
                _ => unauthorized_response("Missing or invalid API key"),
            }
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// The user a request acts on behalf of.
#[derive(Debug, Clone)]
pub struct Requester(pub User);

impl Requester {
    pub fn require_recruiter(&self) -> Result<&User, AppError> {
        if self.0.is_recruiter() {
            Ok(&self.0)
        } else {
            Err(AppError::Forbidden("Recruiter access required".to_string()))
        }
    }

    pub fn require_seeker(&self) -> Result<&User, AppError> {
        if self.0.is_recruiter() {
            Err(AppError::Forbidden("Job seeker access required".to_string()))
        } else {
            Ok(&self.0)
        }
    }
}

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?;

        match state.repo.get_user(user_id).await? {
            Some(user) => Ok(Requester(user)),
            None => Err(AppError::Unauthorized(format!("Unknown user {}", user_id))),
        }
    }
}

/// Like [`Requester`], but absent when no identity header is sent.
#[derive(Debug, Clone)]
pub struct MaybeRequester(pub Option<User>);

impl FromRequestParts<AppState> for MaybeRequester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(USER_ID_HEADER) {
            return Ok(MaybeRequester(None));
        }
        let Requester(user) = Requester::from_request_parts(parts, state).await?;
        Ok(MaybeRequester(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(role: Role) -> User {
        User {
            id: "u1".to_string(),
            username: "u1".to_string(),
            email: None,
            role,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_role_guards() {
        let recruiter = Requester(user(Role::Recruiter));
        assert!(recruiter.require_recruiter().is_ok());
        assert!(matches!(
            recruiter.require_seeker(),
            Err(AppError::Forbidden(_))
        ));

        let seeker = Requester(user(Role::Seeker));
        assert!(seeker.require_seeker().is_ok());
        assert!(matches!(
            seeker.require_recruiter(),
            Err(AppError::Forbidden(_))
        ));
    }
}
