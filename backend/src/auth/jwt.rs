//! JWT token issuance and validation
//!
//! Tokens are HS256-signed, carry the subject's user id and role, and expire
//! after a fixed lifetime. Validation is a pure function of the token, the
//! signing key and the supplied clock reading; it never consults revocation.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use classroom_shared::{AuthError, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role at issuance
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id; keeps two tokens issued in the same second distinct
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed("subject is not a UUID".into()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Why a token failed validation.
///
/// Both variants surface to callers as "invalid"; the split exists for logs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(_) => AuthError::MalformedToken,
            TokenError::Expired => AuthError::ExpiredToken,
        }
    }
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Keys are wrapped in Arc, so cloning the service is cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    lifetime: Duration,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &str, token_lifetime_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `validate_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: JwtKeys::new(secret),
            lifetime: Duration::seconds(token_lifetime_secs),
            validation: Arc::new(validation),
        }
    }

    /// Issue a token for a user
    #[inline]
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<IssuedToken> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if the clock read `now`
    pub fn issue_at(&self, user_id: Uuid, role: Role, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.lifetime;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token against the current time
    #[inline]
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against `now`: signature first, then `exp > now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        let claims = token_data.claims;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        claims.user_id()?;

        Ok(claims)
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn token_lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", 1800)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let issued = service.issue(user_id, Role::Professor).unwrap();
        let claims = service.validate(&issued.token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, Role::Professor);
        assert_eq!(claims.exp - claims.iat, 1800);
        assert_eq!(claims.expires_at().timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_same_subject_twice_yields_distinct_tokens() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let a = service.issue_at(user_id, Role::Student, now).unwrap();
        let b = service.issue_at(user_id, Role::Student, now).unwrap();

        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let issued_at = Utc::now() - Duration::hours(2);

        let issued = service.issue_at(Uuid::new_v4(), Role::Student, issued_at).unwrap();

        assert_eq!(service.validate(&issued.token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let service = create_test_service();
        let now = Utc::now();
        let issued = service.issue_at(Uuid::new_v4(), Role::Student, now).unwrap();

        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(service.validate_at(&issued.token, just_before).is_ok());
        assert_eq!(
            service.validate_at(&issued.token, issued.expires_at).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new("another-secret", 1800);

        let issued = other.issue(Uuid::new_v4(), Role::Student).unwrap();

        assert!(matches!(
            service.validate(&issued.token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        let result = service.validate("invalid.token.here");

        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_token_errors_map_to_taxonomy() {
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::ExpiredToken);
        assert_eq!(
            AuthError::from(TokenError::Malformed("x".into())),
            AuthError::MalformedToken
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Any subject and role survive a round trip immediately after issuance
        #[test]
        fn prop_issue_then_validate(bytes in any::<[u8; 16]>(), professor in any::<bool>()) {
            let service = create_test_service();
            let user_id = Uuid::from_bytes(bytes);
            let role = if professor { Role::Professor } else { Role::Student };
            let now = Utc::now();

            let issued = service.issue_at(user_id, role, now).unwrap();
            let claims = service.validate_at(&issued.token, now).unwrap();

            prop_assert_eq!(claims.user_id().unwrap(), user_id);
            prop_assert_eq!(claims.role, role);
        }

        /// Once expiry has passed the token is invalid, whichever key signed it
        #[test]
        fn prop_past_expiry_always_invalid(secs_past in 0i64..100_000, same_key in any::<bool>()) {
            let service = create_test_service();
            let signer = if same_key { create_test_service() } else { JwtService::new("forged", 1800) };
            let now = Utc::now();

            let issued = signer.issue_at(Uuid::new_v4(), Role::Student, now).unwrap();
            let later = issued.expires_at + Duration::seconds(secs_past);

            prop_assert!(service.validate_at(&issued.token, later).is_err());
        }
    }
}
