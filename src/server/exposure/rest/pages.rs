//! Home page and health checks

use crate::core::error::CatalogResult;
use crate::server::host::ServerHost;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Record counts shown on the home page
#[derive(Debug, Serialize)]
pub struct HomeCounts {
    pub shops: usize,
    pub marketplaces: usize,
    pub discounts: usize,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// GET /
pub async fn home(State(host): State<Arc<ServerHost>>) -> CatalogResult<Json<HomeCounts>> {
    let store = host.store();
    Ok(Json(HomeCounts {
        shops: store.shops().count().await?,
        marketplaces: store.marketplaces().count().await?,
        discounts: store.discounts().count().await?,
    }))
}

/// GET /health
pub async fn health_check(State(host): State<Arc<ServerHost>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "catalog",
        "storage": host.store().backend(),
    }))
}
