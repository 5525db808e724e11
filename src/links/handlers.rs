//! HTTP handlers for relationship routes under `/api`
//!
//! Access follows the REST collections: safe methods for any logged-in
//! caller, linking and unlinking for superusers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::AuthPolicy;
use crate::core::error::{CatalogError, CatalogResult, LinkError};
use crate::core::extractors::Caller;
use crate::core::link::Link;
use crate::core::query::parse_id;
use crate::entities::{Discount, Marketplace, Shop, ShopToMarketplace};
use crate::server::host::ServerHost;
use crate::server::router::route_with_slash;
use crate::storage::StoreEntity;

/// Records on the other side of a relation
#[derive(Debug, Serialize)]
pub struct LinkedResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
    pub link_type: &'static str,
}

impl<T> LinkedResponse<T> {
    fn new(data: Vec<T>, link_type: &'static str) -> Self {
        Self {
            count: data.len(),
            data,
            link_type,
        }
    }
}

/// Relationship routes
///
/// - GET /api/shops/{id}/marketplaces/
/// - GET /api/marketplaces/{id}/shops/
/// - GET /api/shops/{id}/discounts/
/// - POST|DELETE /api/shops/{id}/marketplaces/{marketplace_id}/
pub fn routes() -> Router<Arc<ServerHost>> {
    let router = Router::new();
    let router = route_with_slash(
        router,
        "/api/shops/{id}/marketplaces",
        get(list_shop_marketplaces),
    );
    let router = route_with_slash(
        router,
        "/api/marketplaces/{id}/shops",
        get(list_marketplace_shops),
    );
    let router = route_with_slash(router, "/api/shops/{id}/discounts", get(list_shop_discounts));
    route_with_slash(
        router,
        "/api/shops/{id}/marketplaces/{marketplace_id}",
        post(link_shop_marketplace).delete(unlink_shop_marketplace),
    )
}

/// 404 unless a record of kind `T` exists under `raw`
async fn existing<T: StoreEntity>(host: &ServerHost, raw: &str) -> CatalogResult<Uuid> {
    let id = parse_id(raw)?;
    match T::service(host.store()).get(&id).await? {
        Some(_) => Ok(id),
        None => Err(CatalogError::not_found(T::resource_name_singular(), id)),
    }
}

pub async fn list_shop_marketplaces(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<LinkedResponse<Marketplace>>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let shop_id = existing::<Shop>(&host, &id).await?;
    let marketplaces = host
        .relationships()
        .linked_right::<ShopToMarketplace>(&shop_id)
        .await?;
    Ok(Json(LinkedResponse::new(
        marketplaces,
        ShopToMarketplace::link_type(),
    )))
}

pub async fn list_marketplace_shops(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<LinkedResponse<Shop>>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let marketplace_id = existing::<Marketplace>(&host, &id).await?;
    let shops = host
        .relationships()
        .linked_left::<ShopToMarketplace>(&marketplace_id)
        .await?;
    Ok(Json(LinkedResponse::new(shops, ShopToMarketplace::link_type())))
}

pub async fn list_shop_discounts(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<LinkedResponse<Discount>>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let shop_id = existing::<Shop>(&host, &id).await?;
    let discounts = host.relationships().shop_discounts(&shop_id).await?;
    Ok(Json(LinkedResponse::new(discounts, "shop_discount")))
}

pub async fn link_shop_marketplace(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path((id, marketplace_id)): Path<(String, String)>,
) -> CatalogResult<Response> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let shop_id = parse_id(&id)?;
    let marketplace_id = parse_id(&marketplace_id)?;

    let link = host
        .relationships()
        .link::<ShopToMarketplace>(&shop_id, &marketplace_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)).into_response())
}

pub async fn unlink_shop_marketplace(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path((id, marketplace_id)): Path<(String, String)>,
) -> CatalogResult<StatusCode> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let shop_id = parse_id(&id)?;
    let marketplace_id = parse_id(&marketplace_id)?;

    let removed = host
        .relationships()
        .unlink::<ShopToMarketplace>(&shop_id, &marketplace_id)
        .await?;
    if !removed {
        return Err(LinkError::NotFound {
            link_type: ShopToMarketplace::link_type().to_string(),
            left_id: shop_id,
            right_id: marketplace_id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
