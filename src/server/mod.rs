//! HTTP server for the catalog
//!
//! [`ServerBuilder`] assembles a [`ServerHost`] from a store, an auth
//! provider and the loaded configuration, then exposes it over REST with
//! tracing and optional CORS layers.

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use entity_registry::{CatalogDescriptor, EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::ServerHost;
