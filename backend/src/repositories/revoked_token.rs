//! Postgres-backed revocation store

use crate::auth::{RevocationEntry, RevocationStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Revoked tokens in the `revoked_tokens` table, shared by every instance
#[derive(Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, token: &str) -> Result<Option<RevocationEntry>> {
        let entry = sqlx::query_as::<_, RevocationEntry>(
            r#"
            SELECT token, revoked_at, expires_at
            FROM revoked_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to record revoked token")?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        let revoked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token = $1)
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check revoked tokens")?;

        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM revoked_tokens WHERE expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to purge revoked tokens")?;

        Ok(result.rows_affected())
    }
}
