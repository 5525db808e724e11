//! Shared state behind every route
//!
//! Handlers receive the host as `State<Arc<ServerHost>>`. It owns the store,
//! the auth provider, the loaded configuration, the relationship manager and
//! the registry of catalog kinds whose routes are generated.

use crate::config::AppConfig;
use crate::core::auth::AuthProvider;
use crate::links::RelationshipManager;
use crate::server::entity_registry::EntityRegistry;
use crate::storage::CatalogStore;
use std::sync::Arc;

/// Host context containing all service state
///
/// # Example
///
/// ```rust,ignore
/// let store: Arc<dyn CatalogStore> = Arc::new(InMemoryStore::new());
/// let auth = Arc::new(TokenAuthProvider::new(store.clone()));
/// let host = Arc::new(ServerHost::new(store, auth, AppConfig::default()));
/// let app = RestExposure::build_router(host);
/// ```
pub struct ServerHost {
    store: Arc<dyn CatalogStore>,
    auth: Arc<dyn AuthProvider>,
    config: AppConfig,
    relationships: RelationshipManager,
    entity_registry: EntityRegistry,
}

impl ServerHost {
    /// Host serving the three catalog kinds
    pub fn new(store: Arc<dyn CatalogStore>, auth: Arc<dyn AuthProvider>, config: AppConfig) -> Self {
        Self::with_registry(store, auth, config, EntityRegistry::catalog())
    }

    pub fn with_registry(
        store: Arc<dyn CatalogStore>,
        auth: Arc<dyn AuthProvider>,
        config: AppConfig,
        entity_registry: EntityRegistry,
    ) -> Self {
        Self {
            relationships: RelationshipManager::new(store.clone()),
            store,
            auth,
            config,
            entity_registry,
        }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn relationships(&self) -> &RelationshipManager {
        &self.relationships
    }

    pub fn entity_registry(&self) -> &EntityRegistry {
        &self.entity_registry
    }

    /// Records per page on the paginated listings
    pub fn page_size(&self) -> usize {
        self.config.catalog.page_size
    }
}
