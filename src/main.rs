use std::sync::Arc;

use chrono::Duration;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use popcorn_view::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache},
    middleware::session::SessionGate,
    services::{CatalogProvider, PgFavoritesStore, PgIdentityProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("popcorn_view=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Catalog cache is optional
    let (cache, cache_writer) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?).await;
            tracing::info!("Catalog cache enabled");
            (cache, Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, catalog cache disabled");
            (Cache::disabled(), None)
        }
    };

    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::from_config(&config, cache));

    let state = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            let session_ttl = Duration::hours(config.session_ttl_hours);
            let (gate, opener) = SessionGate::closed();

            // Sessions stay in the loading state until the schema is in place
            let migration_pool = pool.clone();
            tokio::spawn(async move {
                match run_migrations(&migration_pool).await {
                    Ok(()) => opener.open(),
                    Err(e) => tracing::error!(error = %e, "Migrations failed, sessions stay unavailable"),
                }
            });

            AppState::new(
                catalog,
                Arc::new(PgIdentityProvider::new(pool.clone(), session_ttl)),
                Arc::new(PgFavoritesStore::new(pool)),
                gate,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts and favorites are kept in memory");
            AppState::in_memory(catalog)
        }
    };

    tracing::info!(
        catalog = state.catalog.name(),
        identity = state.identity.name(),
        favorites = state.favorites.name(),
        "Backends configured"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
