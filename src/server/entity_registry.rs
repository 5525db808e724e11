//! Entity registry for managing entity descriptors and generating routes
//!
//! One [`CatalogDescriptor`] per catalog kind replaces a hand-written set of
//! list, detail and REST handlers: the generic handlers in
//! [`collections`](crate::server::exposure::rest::collections) are
//! instantiated for the kind and mounted under its names.

use crate::core::entity::Editable;
use crate::entities::{Discount, Marketplace, Shop};
use crate::server::exposure::rest::collections;
use crate::server::host::ServerHost;
use crate::server::router::route_with_slash;
use crate::storage::StoreEntity;
use axum::Router;
use axum::routing::get;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Describes how to build routes for one kind of record
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "shop")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "shops")
    fn plural(&self) -> &str;

    /// Build every route of this kind
    fn build_routes(&self) -> Router<Arc<ServerHost>>;
}

/// Routes for a catalog kind `T`
///
/// - GET /{plural}/ (paginated, login required)
/// - GET /{singular}/?id= (public detail)
/// - GET|POST|OPTIONS /api/{plural}/
/// - GET|PUT|PATCH|DELETE|OPTIONS /api/{plural}/{id}/
pub struct CatalogDescriptor<T> {
    _kind: PhantomData<fn() -> T>,
}

impl<T> CatalogDescriptor<T> {
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<T> Default for CatalogDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityDescriptor for CatalogDescriptor<T>
where
    T: Editable + StoreEntity,
{
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router<Arc<ServerHost>> {
        let plural = T::resource_name();
        let singular = T::resource_name_singular();

        let router = Router::new();
        let router = route_with_slash(
            router,
            &format!("/{}", plural),
            get(collections::list_page::<T>),
        );
        let router = route_with_slash(
            router,
            &format!("/{}", singular),
            get(collections::detail::<T>),
        );
        let router = route_with_slash(
            router,
            &format!("/api/{}", plural),
            get(collections::api_list::<T>)
                .post(collections::api_create::<T>)
                .options(collections::api_collection_options::<T>),
        );
        route_with_slash(
            router,
            &format!("/api/{}/{{id}}", plural),
            get(collections::api_get::<T>)
                .put(collections::api_replace::<T>)
                .patch(collections::api_patch::<T>)
                .delete(collections::api_delete::<T>)
                .options(collections::api_item_options::<T>),
        )
    }
}

/// Registry for all catalog kinds served by the host
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marketplaces, shops and discounts
    pub fn catalog() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CatalogDescriptor::<Marketplace>::new()));
        registry.register(Box::new(CatalogDescriptor::<Shop>::new()));
        registry.register(Box::new(CatalogDescriptor::<Discount>::new()));
        registry
    }

    /// Register an entity descriptor, keyed by its singular name
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of every registered kind
    pub fn build_routes(&self) -> Router<Arc<ServerHost>> {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered singular names, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    /// Plural name for a singular one
    pub fn plural_of(&self, entity_type: &str) -> Option<&str> {
        self.descriptors.get(entity_type).map(|d| d.plural())
    }
}
