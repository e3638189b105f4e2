use std::sync::Arc;

use axum::routing::get;

use agora_shared::clients::db::create_pool;
use agora_shared::middleware::{init_metrics, init_tracing};

use agora_social::config::{AppConfig, StorageKind};
use agora_social::store::{MemoryStore, PgStore, SocialStore};
use agora_social::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("agora-social");

    let config = AppConfig::load()?;
    let port = config.port;

    let store: Arc<dyn SocialStore> = match config.storage {
        StorageKind::Postgres => {
            let pool = create_pool(&config.database_url, config.db_pool_size)?;
            Arc::new(PgStore::new(pool))
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let metrics = init_metrics()?;

    let app = build_router(AppState::new(store, config))
        .route("/metrics", get(move || std::future::ready(metrics.render())));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "agora-social starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
