//! Generic handlers instantiated once per catalog kind
//!
//! The `/api` collections are method-gated: reads for any logged-in caller,
//! writes for superusers. The permission check runs before the body is
//! parsed, so a denied caller never sees a validation error.

use crate::core::auth::AuthPolicy;
use crate::core::entity::Editable;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::extractors::Caller;
use crate::core::query::{IdQuery, PageParams, PaginatedResponse, parse_id};
use crate::server::host::ServerHost;
use crate::storage::StoreEntity;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use uuid::Uuid;

fn parse_body<D: DeserializeOwned>(body: &Bytes) -> CatalogResult<D> {
    Ok(serde_json::from_slice(body)?)
}

async fn fetch<T: StoreEntity>(host: &ServerHost, id: Uuid) -> CatalogResult<T> {
    T::service(host.store())
        .get(&id)
        .await?
        .ok_or_else(|| CatalogError::not_found(T::resource_name_singular(), id))
}

// =============================================================================
// Pages
// =============================================================================

/// GET /{plural}/?page=N
pub async fn list_page<T: StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<PaginatedResponse<T>>> {
    caller.require(AuthPolicy::Authenticated, &method)?;
    let records = T::service(host.store()).list().await?;
    Ok(Json(PaginatedResponse::paginate(
        records,
        &params,
        host.page_size(),
    )))
}

/// GET /{singular}/?id=<uuid>
///
/// Answers `{"<singular>": null}` when no id is given.
pub async fn detail<T: StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    Query(query): Query<IdQuery>,
) -> CatalogResult<Json<Value>> {
    let record = match query.parse()? {
        Some(id) => Some(fetch::<T>(&host, id).await?),
        None => None,
    };

    let mut body = Map::new();
    body.insert(
        T::resource_name_singular().to_string(),
        serde_json::to_value(record)?,
    );
    Ok(Json(Value::Object(body)))
}

// =============================================================================
// REST collections
// =============================================================================

/// GET /api/{plural}/
pub async fn api_list<T: StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
) -> CatalogResult<Json<Vec<T>>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let records = T::service(host.store()).list().await?;
    tracing::debug!(entity_type = T::resource_name(), count = records.len(), "listed");
    Ok(Json(records))
}

/// POST /api/{plural}/
pub async fn api_create<T: Editable + StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    body: Bytes,
) -> CatalogResult<Response> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let draft: T::Draft = parse_body(&body)?;

    let created = T::service(host.store())
        .create(T::from_draft(draft, Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /api/{plural}/{id}/
pub async fn api_get<T: StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<Json<T>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    Ok(Json(fetch::<T>(&host, parse_id(&id)?).await?))
}

/// PUT /api/{plural}/{id}/
pub async fn api_replace<T: Editable + StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> CatalogResult<Json<T>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let mut record = fetch::<T>(&host, parse_id(&id)?).await?;
    let draft: T::Draft = parse_body(&body)?;

    record.apply_draft(draft);
    let updated = T::service(host.store()).update(record).await?;
    Ok(Json(updated))
}

/// PATCH /api/{plural}/{id}/
pub async fn api_patch<T: Editable + StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> CatalogResult<Json<T>> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let record = fetch::<T>(&host, parse_id(&id)?).await?;
    let patch: Value = parse_body(&body)?;

    let updated = T::service(host.store()).update(record.patched(patch)?).await?;
    Ok(Json(updated))
}

/// DELETE /api/{plural}/{id}/
pub async fn api_delete<T: StoreEntity>(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    Path(id): Path<String>,
) -> CatalogResult<StatusCode> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    let id = parse_id(&id)?;
    T::service(host.store()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// OPTIONS /api/{plural}/
pub async fn api_collection_options<T: StoreEntity>(
    caller: Caller,
    method: Method,
) -> CatalogResult<Response> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    Ok(describe::<T>("GET, POST, HEAD, OPTIONS", "list"))
}

/// OPTIONS /api/{plural}/{id}/
pub async fn api_item_options<T: StoreEntity>(
    caller: Caller,
    method: Method,
) -> CatalogResult<Response> {
    caller.require(AuthPolicy::MethodGated, &method)?;
    Ok(describe::<T>("GET, PUT, PATCH, DELETE, HEAD, OPTIONS", "instance"))
}

fn describe<T: StoreEntity>(allow: &'static str, view: &str) -> Response {
    let body = json!({
        "name": format!("{} {}", T::resource_name_singular(), view),
        "renders": ["application/json"],
        "parses": ["application/json"],
    });
    (StatusCode::OK, [(header::ALLOW, allow)], Json(body)).into_response()
}
