use anyhow::Result;
use catalog::accounts;
use catalog::config::{AppConfig, StorageConfig};
use catalog::server::ServerBuilder;
use catalog::storage::{CatalogStore, InMemoryStore};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let store = open_store(&config.storage).await?;
    tracing::info!(backend = store.backend(), "storage ready");

    if let Some(superuser) = &config.bootstrap.superuser {
        accounts::ensure_superuser(store.as_ref(), superuser).await?;
    }

    ServerBuilder::new()
        .with_store(store)
        .with_config(config)
        .serve()
        .await
}

async fn open_store(storage: &StorageConfig) -> Result<Arc<dyn CatalogStore>> {
    match storage {
        StorageConfig::Memory => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres { url, schema } => {
            let store = catalog::storage::PostgresStore::connect(url, schema).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageConfig::Postgres { .. } => {
            anyhow::bail!("PostgreSQL storage requires the `postgres` feature")
        }
    }
}
