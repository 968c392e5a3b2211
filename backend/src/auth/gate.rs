//! Authentication gate
//!
//! Runs once per request and ends in exactly one of three outcomes:
//!
//! 1. no bearer token: `Anonymous`
//! 2. token present but revoked, invalid, or for an unknown subject: `Rejected`
//! 3. otherwise: `Authenticated(Identity)`
//!
//! Revocation is checked before the token is validated. A revoked token that
//! would otherwise still validate is therefore rejected as revoked. A store
//! failure at either lookup rejects the request as `DependencyUnavailable`;
//! it is never read as "not revoked" or "not found".

use super::identity::Identity;
use super::jwt::JwtService;
use super::revocation::RevocationStore;
use crate::repositories::user::UserRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_shared::AuthError;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// User lookup collaborator
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<UserRecord>>;
}

/// Terminal outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Identity),
    Anonymous,
    Rejected(AuthError),
}

/// Extract the token from an `Authorization` header value.
///
/// Anything other than `Bearer <non-empty>` counts as no token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The per-request authentication state machine
#[derive(Clone)]
pub struct Authenticator {
    jwt: JwtService,
    revocations: Arc<dyn RevocationStore>,
    users: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(
        jwt: JwtService,
        revocations: Arc<dyn RevocationStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            jwt,
            revocations,
            users,
        }
    }

    /// Authenticate from a raw `Authorization` header value
    #[inline]
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthOutcome {
        self.authenticate_at(authorization, Utc::now()).await
    }

    pub async fn authenticate_at(&self, authorization: Option<&str>, now: DateTime<Utc>) -> AuthOutcome {
        let Some(token) = bearer_token(authorization) else {
            debug!("No bearer token on request");
            return AuthOutcome::Anonymous;
        };

        match self.establish(token, now).await {
            Ok(identity) => {
                debug!(user_id = %identity.user_id, role = %identity.role, "Authenticated");
                AuthOutcome::Authenticated(identity)
            }
            Err(kind) => AuthOutcome::Rejected(kind),
        }
    }

    async fn establish(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let revoked = self.revocations.is_revoked(token).await.map_err(|e| {
            error!(error = %e, "Revocation store unavailable; rejecting request");
            AuthError::DependencyUnavailable
        })?;
        if revoked {
            warn!("Revoked token presented");
            return Err(AuthError::RevokedToken);
        }

        let claims = self.jwt.validate_at(token, now).map_err(|e| {
            debug!(reason = %e, "Token validation failed");
            AuthError::from(e)
        })?;
        let user_id = claims.user_id().map_err(AuthError::from)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                error!(error = %e, "User lookup unavailable; rejecting request");
                AuthError::DependencyUnavailable
            })?
            .ok_or_else(|| {
                warn!(%user_id, "Token subject no longer exists");
                AuthError::UnknownSubject
            })?;

        // The stored record is authoritative for the role
        if user.role != claims.role {
            debug!(%user_id, token_role = %claims.role, role = %user.role, "Role changed since issuance");
        }

        Ok(Identity {
            user_id: user.id,
            student_id: user.student_id,
            role: user.role,
        })
    }

    /// Validate a token for logout: the verified expiry if it could still be
    /// used, `None` if it is already expired or unverifiable.
    pub fn revocable_expiry(&self, token: &str) -> Option<DateTime<Utc>> {
        self.jwt.validate(token).ok().map(|claims| claims.expires_at())
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    pub fn users(&self) -> &Arc<dyn UserDirectory> {
        &self.users
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
