//! Favorite discounts of the calling account

use crate::core::auth::AuthPolicy;
use crate::core::entity::Entity;
use crate::core::error::{CatalogError, CatalogResult, RequestError};
use crate::core::extractors::Caller;
use crate::core::query::{IdQuery, parse_id};
use crate::entities::Discount;
use crate::links::FavoriteOutcome;
use crate::server::host::ServerHost;
use crate::server::router::route_with_slash;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::Method,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub data: Vec<Discount>,
    pub count: usize,
}

/// Outcome of an add or remove, with the message shown to the user
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub status: FavoriteOutcome,
    pub message: &'static str,
    pub discount: Uuid,
}

impl FavoriteResponse {
    fn new(status: FavoriteOutcome, discount: Uuid) -> Self {
        Self {
            status,
            message: status.message(),
            discount,
        }
    }
}

/// A discount with the caller's favorite flag
#[derive(Debug, Serialize)]
pub struct DiscountView {
    pub discount: Discount,
    pub is_favorite: bool,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    let router = route_with_slash(Router::new(), "/favorites", get(list_favorites));
    let router = route_with_slash(router, "/add", get(add_favorite).post(add_favorite));
    let router = route_with_slash(router, "/remove/{id}", get(remove_favorite).post(remove_favorite));
    route_with_slash(router, "/discount/{id}", get(discount_view))
}

/// GET /favorites/
pub async fn list_favorites(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
) -> CatalogResult<Json<FavoritesResponse>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;

    let data = host.relationships().favorites(&account_id).await?;
    Ok(Json(FavoritesResponse {
        count: data.len(),
        data,
    }))
}

/// GET|POST /add/?id=<uuid>
pub async fn add_favorite(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Query(query): Query<IdQuery>,
) -> CatalogResult<Json<FavoriteResponse>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    let discount_id = query.parse()?.ok_or_else(|| RequestError::MissingParameter {
        parameter: "id".to_string(),
    })?;

    let outcome = host
        .relationships()
        .add_favorite(&account_id, &discount_id)
        .await?;
    tracing::info!(account_id = %account_id, discount_id = %discount_id, ?outcome, "add favorite");
    Ok(Json(FavoriteResponse::new(outcome, discount_id)))
}

/// GET|POST /remove/{id}/
pub async fn remove_favorite(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<FavoriteResponse>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    let discount_id = parse_id(&id)?;

    let outcome = host
        .relationships()
        .remove_favorite(&account_id, &discount_id)
        .await?;
    tracing::info!(account_id = %account_id, discount_id = %discount_id, ?outcome, "remove favorite");
    Ok(Json(FavoriteResponse::new(outcome, discount_id)))
}

/// GET /discount/{id}/
pub async fn discount_view(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<DiscountView>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    let discount_id = parse_id(&id)?;
    let discount = host
        .store()
        .discounts()
        .get(&discount_id)
        .await?
        .ok_or_else(|| CatalogError::not_found(Discount::resource_name_singular(), discount_id))?;

    let is_favorite = host
        .relationships()
        .is_favorite(&account_id, &discount_id)
        .await?;

    Ok(Json(DiscountView {
        discount,
        is_favorite,
    }))
}
