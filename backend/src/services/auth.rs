//! Authentication service: sign-up, login, logout, password changes
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{bearer_token, Authenticator, Identity, JwtService, PasswordService, UserDirectory};
use crate::error::ApiError;
use crate::repositories::{CreateUser, UserRepository};
use chrono::Utc;
use classroom_shared::validation::{
    validate_email, validate_name, validate_password, validate_student_id,
};
use classroom_shared::{AuthError, AuthToken, ChangePasswordRequest, LoginRequest, SignupRequest, User};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

/// Authentication operations
pub struct AuthService;

impl AuthService {
    /// Register a new account
    pub async fn signup(pool: &PgPool, req: SignupRequest) -> Result<User, ApiError> {
        validate_name(&req.name).map_err(|m| ApiError::validation("name", m))?;
        validate_student_id(&req.student_id).map_err(|m| ApiError::validation("student_id", m))?;
        validate_email(&req.email).map_err(|m| ApiError::validation("email", m))?;
        validate_password(&req.password).map_err(|m| ApiError::validation("password", m))?;

        if UserRepository::student_id_exists(pool, &req.student_id).await? {
            return Err(ApiError::Conflict("Student ID already registered".to_string()));
        }
        if UserRepository::email_exists(pool, &req.email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(req.password).await?;

        let user = UserRepository::create(
            pool,
            CreateUser {
                name: req.name.trim().to_string(),
                student_id: req.student_id,
                department: req.department,
                email: req.email,
                password_hash,
                phone_number: req.phone_number,
                role: req.role,
            },
        )
        .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user.into_user())
    }

    /// Exchange credentials for an access token.
    ///
    /// An unknown student id and a wrong password fail identically.
    pub async fn login(
        users: &dyn UserDirectory,
        jwt: &JwtService,
        req: LoginRequest,
    ) -> Result<AuthToken, ApiError> {
        let user = users
            .find_by_student_id(&req.student_id)
            .await
            .map_err(|e| {
                error!(error = %e, "User lookup unavailable during login");
                ApiError::DependencyUnavailable
            })?
            .ok_or_else(|| {
                debug!("Login for unknown student id");
                ApiError::Unauthenticated(AuthError::InvalidCredentials)
            })?;

        let valid = PasswordService::verify_async(req.password, user.password_hash.clone()).await?;
        if !valid {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(ApiError::Unauthenticated(AuthError::InvalidCredentials));
        }

        let issued = jwt.issue(user.id, user.role)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthToken {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: jwt.token_lifetime_secs(),
        })
    }

    /// Revoke the presented token until its own expiry.
    ///
    /// A token that is already expired or cannot be verified would be
    /// rejected by the gate anyway, so it is accepted without a write.
    pub async fn logout(authenticator: &Authenticator, authorization: Option<&str>) -> Result<(), ApiError> {
        let token = bearer_token(authorization)
            .ok_or_else(|| ApiError::BadRequest("Missing bearer token".to_string()))?;

        let Some(expires_at) = authenticator.revocable_expiry(token) else {
            debug!("Logout with expired or unverifiable token; nothing to revoke");
            return Ok(());
        };

        let store = authenticator.revocations();
        store.revoke(token, expires_at).await.map_err(|e| {
            error!(error = %e, "Revocation store unavailable during logout");
            ApiError::DependencyUnavailable
        })?;
        info!(%expires_at, "Token revoked");

        match store.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Purged expired revocation entries"),
            Err(e) => warn!(error = %e, "Revocation purge after logout failed"),
        }

        Ok(())
    }

    /// The caller's own profile
    pub async fn profile(users: &dyn UserDirectory, identity: &Identity) -> Result<User, ApiError> {
        users
            .find_by_id(identity.user_id)
            .await
            .map_err(|e| {
                error!(error = %e, "User lookup unavailable");
                ApiError::DependencyUnavailable
            })?
            .map(|record| record.into_user())
            .ok_or(ApiError::Unauthenticated(AuthError::UnknownSubject))
    }

    pub async fn change_password(
        pool: &PgPool,
        identity: &Identity,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        validate_password(&req.new_password).map_err(|m| ApiError::validation("new_password", m))?;

        let user = UserRepository::find_by_id(pool, identity.user_id)
            .await?
            .ok_or(ApiError::Unauthenticated(AuthError::UnknownSubject))?;

        let valid = PasswordService::verify_async(req.current_password, user.password_hash).await?;
        if !valid {
            warn!(user_id = %identity.user_id, "Password change with wrong current password");
            return Err(ApiError::Unauthenticated(AuthError::InvalidCredentials));
        }

        let password_hash = PasswordService::hash_async(req.new_password).await?;
        UserRepository::update_password(pool, identity.user_id, &password_hash).await?;

        info!(user_id = %identity.user_id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{InMemoryRevocationStore, RevocationStore};
    use crate::repositories::UserRecord;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Duration;
    use classroom_shared::Role;
    use std::sync::Arc;
    use uuid::Uuid;

    struct OneUser(UserRecord);

    #[async_trait]
    impl UserDirectory for OneUser {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
            Ok((self.0.id == id).then(|| self.0.clone()))
        }

        async fn find_by_student_id(&self, student_id: &str) -> Result<Option<UserRecord>> {
            Ok((self.0.student_id == student_id).then(|| self.0.clone()))
        }
    }

    fn student_with_password(password: &str) -> UserRecord {
        let mut record = UserRecord::for_test(Uuid::new_v4(), "20250001", Role::Student);
        record.password_hash = PasswordService::hash(password).unwrap();
        record
    }

    fn login_request(student_id: &str, password: &str) -> LoginRequest {
        LoginRequest {
            student_id: student_id.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_bearer_token() {
        let users = OneUser(student_with_password("correct horse"));
        let jwt = JwtService::new("service-test-secret", 1800);

        let token = AuthService::login(&users, &jwt, login_request("20250001", "correct horse"))
            .await
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 1800);
        let claims = jwt.validate(&token.access_token).unwrap();
        assert_eq!(claims.role, Role::Student);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let users = OneUser(student_with_password("correct horse"));
        let jwt = JwtService::new("service-test-secret", 1800);

        let wrong_password = AuthService::login(&users, &jwt, login_request("20250001", "nope"))
            .await
            .unwrap_err();
        let unknown_user = AuthService::login(&users, &jwt, login_request("99999999", "correct horse"))
            .await
            .unwrap_err();

        for err in [wrong_password, unknown_user] {
            assert!(matches!(
                err,
                ApiError::Unauthenticated(AuthError::InvalidCredentials)
            ));
        }
    }

    fn authenticator(store: Arc<InMemoryRevocationStore>) -> Authenticator {
        Authenticator::new(
            JwtService::new("service-test-secret", 1800),
            store,
            Arc::new(OneUser(UserRecord::for_test(Uuid::new_v4(), "20250001", Role::Student))),
        )
    }

    #[tokio::test]
    async fn test_logout_revokes_until_token_expiry() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let gate = authenticator(store.clone());
        let issued = gate.jwt().issue(Uuid::new_v4(), Role::Student).unwrap();
        let header = format!("Bearer {}", issued.token);

        AuthService::logout(&gate, Some(&header)).await.unwrap();
        AuthService::logout(&gate, Some(&header)).await.unwrap();

        assert!(store.is_revoked(&issued.token).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_logout_with_expired_token_is_noop() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let gate = authenticator(store.clone());
        let issued = gate
            .jwt()
            .issue_at(Uuid::new_v4(), Role::Student, Utc::now() - Duration::hours(2))
            .unwrap();

        AuthService::logout(&gate, Some(&format!("Bearer {}", issued.token)))
            .await
            .unwrap();
        AuthService::logout(&gate, Some("Bearer garbage")).await.unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_logout_without_token_is_bad_request() {
        let gate = authenticator(Arc::new(InMemoryRevocationStore::new()));

        let err = AuthService::logout(&gate, None).await.unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_profile_for_deleted_user() {
        let users = OneUser(UserRecord::for_test(Uuid::new_v4(), "20250001", Role::Student));
        let ghost = Identity {
            user_id: Uuid::new_v4(),
            student_id: "20259999".to_string(),
            role: Role::Student,
        };

        let err = AuthService::profile(&users, &ghost).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthenticated(AuthError::UnknownSubject)));
    }
}
