//! Error types for the Classroom application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication and authorization failures.
///
/// Every variant is an expected condition the caller can recover from, and
/// each carries a stable machine-checkable code (see [`AuthError::code`]).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    MalformedToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token revoked")]
    RevokedToken,

    #[error("Unknown subject")]
    UnknownSubject,

    #[error("Wrong role for this action")]
    WrongRole,

    #[error("Not the owner of this resource")]
    NotOwner,

    #[error("Not a member of this classroom")]
    NotMember,

    #[error("Unknown resource")]
    UnknownResource,

    #[error("Submission deadline has passed")]
    PastDeadline,

    #[error("Dependency unavailable")]
    DependencyUnavailable,
}

/// Coarse grouping used to pick a transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorClass {
    /// Identity could not be established (401)
    Authentication,
    /// Identity established but the action is not permitted (403)
    Authorization,
    /// A backing store failed; the decision was closed (503)
    Dependency,
}

impl AuthError {
    /// Stable code rendered in error bodies
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::RevokedToken => "REVOKED_TOKEN",
            AuthError::UnknownSubject => "UNKNOWN_SUBJECT",
            AuthError::WrongRole => "WRONG_ROLE",
            AuthError::NotOwner => "NOT_OWNER",
            AuthError::NotMember => "NOT_MEMBER",
            AuthError::UnknownResource => "UNKNOWN_RESOURCE",
            AuthError::PastDeadline => "PAST_DEADLINE",
            AuthError::DependencyUnavailable => "DEPENDENCY_UNAVAILABLE",
        }
    }

    pub fn class(&self) -> AuthErrorClass {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::UnknownSubject => AuthErrorClass::Authentication,
            AuthError::WrongRole
            | AuthError::NotOwner
            | AuthError::NotMember
            | AuthError::UnknownResource
            | AuthError::PastDeadline => AuthErrorClass::Authorization,
            AuthError::DependencyUnavailable => AuthErrorClass::Dependency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            AuthError::MissingCredential,
            AuthError::InvalidCredentials,
            AuthError::MalformedToken,
            AuthError::ExpiredToken,
            AuthError::RevokedToken,
            AuthError::UnknownSubject,
            AuthError::WrongRole,
            AuthError::NotOwner,
            AuthError::NotMember,
            AuthError::UnknownResource,
            AuthError::PastDeadline,
            AuthError::DependencyUnavailable,
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_serde_matches_code() {
        let json = serde_json::to_string(&AuthError::RevokedToken).unwrap();
        assert_eq!(json, "\"REVOKED_TOKEN\"");
    }

    #[test]
    fn test_classes() {
        assert_eq!(AuthError::ExpiredToken.class(), AuthErrorClass::Authentication);
        assert_eq!(AuthError::PastDeadline.class(), AuthErrorClass::Authorization);
        assert_eq!(AuthError::DependencyUnavailable.class(), AuthErrorClass::Dependency);
    }
}
