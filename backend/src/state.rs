//! Application state management
//!
//! Shared state passed to all handlers via Axum's state extraction. Built
//! once at start-up; every field is cheap to clone.

use crate::auth::{Authenticator, Authorizer, JwtService, OwnershipFacts, RevocationStore, UserDirectory};
use crate::config::AppConfig;
use crate::repositories::{PgOwnershipFacts, PgUserDirectory};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// - `db`: PgPool is internally Arc'd
/// - `authenticator`: JWT keys are precomputed once; stores are behind `Arc`
/// - `authorizer`: ownership lookups behind `Arc`
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    authenticator: Authenticator,
    authorizer: Authorizer,
}

impl AppState {
    /// Wire the Postgres-backed collaborators around `revocations`
    pub fn new(db: PgPool, config: AppConfig, revocations: Arc<dyn RevocationStore>) -> Self {
        let users = Arc::new(PgUserDirectory::new(db.clone()));
        let facts = Arc::new(PgOwnershipFacts::new(db.clone()));
        Self::from_parts(db, config, revocations, users, facts)
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        db: PgPool,
        config: AppConfig,
        revocations: Arc<dyn RevocationStore>,
        users: Arc<dyn UserDirectory>,
        facts: Arc<dyn OwnershipFacts>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_lifetime_secs);
        let authenticator = Authenticator::new(jwt, revocations, users);
        let authorizer = Authorizer::new(facts, config.auth.expose_deny_reasons);

        Self {
            db,
            config: Arc::new(config),
            authenticator,
            authorizer,
        }
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        self.authenticator.jwt()
    }

    #[inline]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[inline]
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    #[inline]
    pub fn users(&self) -> &dyn UserDirectory {
        self.authenticator.users().as_ref()
    }

    #[inline]
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        self.authenticator.revocations()
    }
}
