//! Core traits and types shared by every layer of the catalog

pub mod auth;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod link;
pub mod query;
pub mod service;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider, Role, TokenAuthProvider};
pub use entity::{AuditedEntity, Editable, Entity, Model};
pub use error::{CatalogError, CatalogResult};
pub use extractors::{Caller, JsonBody};
pub use link::{DeletePolicy, Link, LinkSide};
pub use query::{PageParams, PaginatedResponse, PaginationMeta};
pub use service::{AccountService, DataService, LinkService};
