//! Axum extractors for callers and request bodies
//!
//! Both extractors reject with [`CatalogError`], so malformed input and
//! failed authentication render the same `{code, message, details}` body as
//! every other error.

use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::{CatalogError, CatalogResult, ValidationError};
use crate::server::host::ServerHost;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::Method;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// The authenticated (or anonymous) caller of a request
///
/// Resolved through the host's [`AuthProvider`](crate::core::auth::AuthProvider).
/// Presenting an invalid token rejects the request with 401 before the
/// handler runs.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthContext);

impl Caller {
    /// Enforce `policy` for this caller and request method
    pub fn require(&self, policy: AuthPolicy, method: &Method) -> CatalogResult<()> {
        policy.check(&self.0, method).map_err(CatalogError::from)
    }

    pub fn context(&self) -> &AuthContext {
        &self.0
    }
}

impl FromRequestParts<Arc<ServerHost>> for Caller {
    type Rejection = CatalogError;

    async fn from_request_parts(
        parts: &mut Parts,
        host: &Arc<ServerHost>,
    ) -> Result<Self, Self::Rejection> {
        let context = host.auth().extract_context(&parts.headers).await?;
        Ok(Caller(context))
    }
}

/// JSON body whose rejection is a [`ValidationError::InvalidJson`]
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create(JsonBody(draft): JsonBody<ShopDraft>) -> CatalogResult<Json<Shop>> {
///     // draft is deserialized; field invariants are checked by the store
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = CatalogError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ValidationError::InvalidJson {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}
