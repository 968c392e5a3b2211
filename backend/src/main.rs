//! Classroom Backend
//!
//! Authentication and authorization core for a classroom service, plus
//! the classroom, assignment and submission API it protects.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling, behind the authentication layer
//! - Services: authorization check, then business logic
//! - Repositories: data access
//! - Database: PostgreSQL with SQLx; revoked tokens in Postgres or Redis

use anyhow::{Context, Result};
use classroom_backend::auth::{spawn_purge_task, InMemoryRevocationStore, RevocationStore};
use classroom_backend::config::{self, AppConfig, RevocationBackend};
use classroom_backend::repositories::{PgRevocationStore, RedisRevocationStore};
use classroom_backend::{db, routes, state::AppState};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting Classroom Backend"
    );

    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run migrations (skip in production if using separate migration job)
    if !AppConfig::is_production() {
        db::run_migrations(&db_pool).await?;
    }

    let revocations = build_revocation_store(&config, &db_pool).await?;

    if config.revocation.purge_interval_secs > 0 {
        spawn_purge_task(
            revocations.clone(),
            Duration::from_secs(config.revocation.purge_interval_secs),
        );
    }

    let state = AppState::new(db_pool, config.clone(), revocations);
    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Pick the revocation backend. Unlike a cache, the store cannot be
/// skipped when unreachable: without it revoked tokens would be accepted.
async fn build_revocation_store(config: &AppConfig, pool: &PgPool) -> Result<Arc<dyn RevocationStore>> {
    let store: Arc<dyn RevocationStore> = match config.revocation.backend {
        RevocationBackend::Postgres => Arc::new(PgRevocationStore::new(pool.clone())),
        RevocationBackend::Redis => Arc::new(RedisRevocationStore::new(connect_redis(&config.redis.url).await?)),
        RevocationBackend::Memory => {
            warn!("In-memory revocation store: revocations are lost on restart and not shared between instances");
            Arc::new(InMemoryRevocationStore::new())
        }
    };

    info!(backend = ?config.revocation.backend, "Revocation store ready");
    Ok(store)
}

async fn connect_redis(url: &str) -> Result<ConnectionManager> {
    info!("Connecting to Redis...");

    let client = redis::Client::open(url).context("Invalid Redis URL")?;
    let conn = ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;

    info!("Redis connection established");
    Ok(conn)
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "classroom_backend=info,tower_http=info".into()
        } else {
            "classroom_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.jwt.secret.contains("development") || config.jwt.secret.len() < 32 {
        errors.push("JWT secret must be at least 32 characters and not contain 'development'");
    }

    if config.jwt.token_lifetime_secs <= 0 {
        errors.push("JWT token lifetime must be positive");
    }

    if config.revocation.backend == RevocationBackend::Memory {
        warn!("In-memory revocation store in production - only correct for a single instance");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
