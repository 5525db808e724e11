//! Sign-up, login and logout

use crate::accounts;
use crate::core::auth::{AuthPolicy, parse_token_header};
use crate::core::error::{AuthError, CatalogResult};
use crate::core::extractors::{Caller, JsonBody};
use crate::entities::Registration;
use crate::server::host::ServerHost;
use crate::server::router::route_with_slash;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    let router = route_with_slash(Router::new(), "/register", post(register));
    let router = route_with_slash(router, "/accounts/login", post(login));
    route_with_slash(router, "/accounts/logout", post(logout))
}

/// POST /register/
pub async fn register(
    State(host): State<Arc<ServerHost>>,
    JsonBody(registration): JsonBody<Registration>,
) -> CatalogResult<Response> {
    let profile = accounts::register(host.store(), registration).await?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

/// POST /accounts/login/
pub async fn login(
    State(host): State<Arc<ServerHost>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> CatalogResult<Json<LoginResponse>> {
    let token = accounts::login(host.store(), &request.username, &request.password).await?;
    Ok(Json(LoginResponse { token: token.key }))
}

/// POST /accounts/logout/
///
/// Revokes the token the request was authenticated with.
pub async fn logout(
    State(host): State<Arc<ServerHost>>,
    caller: Caller,
    method: Method,
    headers: HeaderMap,
) -> CatalogResult<StatusCode> {
    caller.require(AuthPolicy::Authenticated, &method)?;

    let key = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_token_header)
        .ok_or(AuthError::Unauthenticated)?;
    host.store().accounts().revoke_token(key).await?;

    tracing::info!(username = caller.context().username().unwrap_or_default(), "logged out");
    Ok(StatusCode::NO_CONTENT)
}
