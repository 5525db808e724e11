//! Relationship management
//!
//! [`RelationshipManager`] resolves and edits associations for any relation
//! the store knows; [`handlers`] exposes the shop/marketplace routes under
//! `/api`.

pub mod handlers;
pub mod service;

pub use handlers::{LinkedResponse, routes};
pub use service::{FavoriteOutcome, RelationshipManager};
