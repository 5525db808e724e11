//! Router utilities shared by every route group

use axum::Router;
use axum::routing::MethodRouter;

/// Register `path` both without and with a trailing slash
///
/// Every catalog URL accepts either form. `path` must not end in `/`.
pub fn route_with_slash<S>(router: Router<S>, path: &str, method_router: MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route(path, method_router.clone())
        .route(&format!("{}/", path), method_router)
}
