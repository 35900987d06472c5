use std::sync::Arc;

use anyhow::{Context, Result};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use chat_requests_backend::{
    app_state::AppState,
    config::{Config, StorageBackend},
    db, routes,
    store::{MemoryChatRequestStore, PgChatRequestStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_requests_backend=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let (state, app) = match &config.storage_backend {
        StorageBackend::Postgres { database_url } => {
            let pool = db::connect_to_db(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;

            // Sessions are written by the auth service into the same table.
            let session_store = PostgresStore::new(pool.clone());
            session_store
                .migrate()
                .await
                .context("Failed to migrate session store")?;

            let state = AppState::new(Arc::new(PgChatRequestStore::new(pool)));
            let app = routes::create_routes(config.cors_origin.clone())
                .layer(SessionManagerLayer::new(session_store))
                .with_state(state.clone());
            (state, app)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, chat requests will not survive a restart");
            let state = AppState::new(Arc::new(MemoryChatRequestStore::new()));
            let app = routes::create_routes(config.cors_origin.clone())
                .layer(SessionManagerLayer::new(MemoryStore::default()))
                .with_state(state.clone());
            (state, app)
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.presence.clear();
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
