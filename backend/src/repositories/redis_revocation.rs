//! Redis-backed revocation store
//!
//! Each revoked token is a key whose TTL runs out when the token itself
//! expires, so Redis does the purging.

use crate::auth::RevocationStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

const KEY_PREFIX: &str = "classroom:revoked:";

fn key_for(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, token)
}

/// Seconds until `expires_at`, never less than one so the key is written
fn ttl_secs(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (expires_at - now).num_seconds().max(1) as u64
}

#[derive(Clone)]
pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let now = Utc::now();
        let mut conn = self.redis.clone();

        // SET NX keeps the first revocation time on repeat logouts
        let _: Option<String> = redis::cmd("SET")
            .arg(key_for(token))
            .arg(now.timestamp())
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(expires_at, now))
            .query_async(&mut conn)
            .await
            .context("Failed to record revoked token in Redis")?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let exists: bool = conn
            .exists(key_for(token))
            .await
            .context("Failed to check revoked token in Redis")?;

        Ok(exists)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64> {
        debug!("Redis expires revocation keys itself; nothing to purge");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::minutes(30), 1800)]
    #[case(Duration::seconds(1), 1)]
    #[case(Duration::zero(), 1)]
    #[case(Duration::seconds(-60), 1)]
    fn test_ttl_secs(#[case] remaining: Duration, #[case] expected: u64) {
        let now = Utc::now();
        assert_eq!(ttl_secs(now + remaining, now), expected);
    }

    #[test]
    fn test_key_is_namespaced() {
        assert_eq!(key_for("abc"), "classroom:revoked:abc");
    }
}
