//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, TokenAuthProvider};
use crate::storage::CatalogStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the catalog HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(Arc::new(InMemoryStore::new()))
///     .with_config(AppConfig::load()?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn CatalogStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            auth: None,
            config: AppConfig::default(),
        }
    }

    /// Set the storage backend (required)
    pub fn with_store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default token authentication
    pub fn with_auth_provider(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        self.config.validate()?;

        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("A store is required. Call .with_store()"))?;
        let auth = self
            .auth
            .unwrap_or_else(|| Arc::new(TokenAuthProvider::new(store.clone())));

        tracing::debug!(backend = store.backend(), "building server host");
        Ok(ServerHost::new(store, auth, self.config))
    }

    /// Build the REST router with tracing and, when enabled, permissive CORS
    pub fn build(self) -> Result<Router> {
        let cors = self.config.server.cors;
        let host = Arc::new(self.build_host()?);
        let app = RestExposure::build_router(host)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

        if cors {
            Ok(app.layer(CorsLayer::permissive()))
        } else {
            Ok(app)
        }
    }

    /// Serve on the configured bind address until SIGTERM or Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
