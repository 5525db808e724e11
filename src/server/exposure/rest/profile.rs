//! Profile and followed shops of the calling account

use crate::accounts;
use crate::core::auth::AuthPolicy;
use crate::core::error::{CatalogResult, LinkError};
use crate::core::extractors::{Caller, JsonBody};
use crate::core::link::Link;
use crate::core::query::parse_id;
use crate::core::validation::normalize_optional;
use crate::entities::{ClientProfile, Shop, ShopToClient};
use crate::server::host::ServerHost;
use crate::server::router::route_with_slash;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    /// Stored photo path; blank clears it
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub shop: Uuid,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    let router = route_with_slash(
        Router::new(),
        "/profile",
        get(get_profile).post(update_profile),
    );
    let router = route_with_slash(router, "/my-shops", get(my_shops).post(follow_shop));
    route_with_slash(router, "/my-shops/{id}", delete(unfollow_shop))
}

/// GET /profile/
pub async fn get_profile(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
) -> CatalogResult<Json<ClientProfile>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    Ok(Json(accounts::profile(host.store(), &account_id).await?))
}

/// POST /profile/ `{photo}`
pub async fn update_profile(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> CatalogResult<Json<ClientProfile>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;

    let mut profile = accounts::profile(host.store(), &account_id).await?;
    profile.client.photo = normalize_optional(update.photo);
    profile.client = host.store().clients().update(profile.client).await?;
    Ok(Json(profile))
}

/// GET /my-shops/
pub async fn my_shops(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
) -> CatalogResult<Json<Vec<Shop>>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    Ok(Json(host.relationships().client_shops(&account_id).await?))
}

/// POST /my-shops/ `{shop}`
pub async fn follow_shop(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    JsonBody(request): JsonBody<FollowRequest>,
) -> CatalogResult<Response> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;

    let link = host
        .relationships()
        .follow_shop(&account_id, &request.shop)
        .await?;
    Ok((StatusCode::CREATED, Json(link)).into_response())
}

/// DELETE /my-shops/{id}/
pub async fn unfollow_shop(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<StatusCode> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let account_id = caller.context().require_account()?;
    let shop_id = parse_id(&id)?;

    if !host
        .relationships()
        .unfollow_shop(&account_id, &shop_id)
        .await?
    {
        return Err(LinkError::NotFound {
            link_type: ShopToClient::link_type().to_string(),
            left_id: shop_id,
            right_id: account_id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
