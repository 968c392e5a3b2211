//! Revocation store: tokens that must be rejected before their natural expiry
//!
//! An entry mirrors the token's own expiry, so once that instant passes the
//! entry carries no meaning (the token already fails validation) and may be
//! purged. Purging only bounds storage; `is_revoked` never depends on it.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A revoked token
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RevocationEntry {
    pub token: String,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Storage for revoked tokens.
///
/// Implementations must make `revoke` and `is_revoked` safe under concurrent
/// callers. `is_revoked` sits on every authenticated request.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `token` as revoked until `expires_at`. Revoking twice is a no-op.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()>;

    async fn is_revoked(&self, token: &str) -> Result<bool>;

    /// Delete every entry with `expires_at < now`; returns the number removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Process-local store; correct only when a single instance serves traffic
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, RevocationEntry>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries
            .entry(token.to_string())
            .or_insert_with(|| RevocationEntry {
                token: token.to_string(),
                revoked_at: Utc::now(),
                expires_at,
            });
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(token))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}

/// Spawn a task that purges expired entries every `interval`
pub fn spawn_purge_task(store: Arc<dyn RevocationStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired revocation entries"),
                Err(e) => warn!(error = %e, "Revocation purge failed"),
            }
        }
    })
}
