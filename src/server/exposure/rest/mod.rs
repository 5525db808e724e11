//! REST exposure of the catalog
//!
//! Consumes a [`ServerHost`] and produces the Axum router: the home page and
//! health checks, the account flow, favorites and profile routes, the routes
//! generated for each registered catalog kind, and the relation routes.

pub mod accounts;
pub mod collections;
pub mod favorites;
pub mod pages;
pub mod profile;

use crate::links;
use crate::server::host::ServerHost;
use axum::Router;
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let entity_routes = host.entity_registry().build_routes();

        pages::routes()
            .merge(accounts::routes())
            .merge(favorites::routes())
            .merge(profile::routes())
            .merge(entity_routes)
            .merge(links::routes())
            .with_state(host)
    }
}
