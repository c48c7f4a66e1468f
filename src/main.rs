use std::sync::Arc;

use record_catalog::{
    config::{Config, StoreBackend},
    db::{create_pool, CatalogStore, InMemoryCatalogStore, PgCatalogStore},
    routes::{cors_layer, create_router, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("record_catalog=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, records are lost on shutdown");
            Arc::new(InMemoryCatalogStore::new())
        }
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            let store = PgCatalogStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
    };

    let state = Arc::new(AppState::new(store));
    let app = create_router(state).layer(cors_layer(config.cors_allow_origin.as_deref())?);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        store = ?config.store_backend,
        "Record catalog listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
