//! # Catalog
//!
//! A catalog service for shops, the marketplaces they sell on and the
//! discounts they publish, with per-account favorites and a
//! permission-gated REST API.
//!
//! ## Features
//!
//! - **Catalog records**: marketplaces, shops and discounts with write-time
//!   validation and a canonical ordering
//! - **Relations**: shop/marketplace, shop/client and favorite discounts,
//!   each unique per pair, with cascade or set-null deletion
//! - **Accounts**: registration, argon2 password hashes and API tokens
//! - **Permissions**: reads for any logged-in caller, writes for superusers
//! - **Storage**: in-memory by default, PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let store: Arc<dyn CatalogStore> = Arc::new(InMemoryStore::new());
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_config(AppConfig::load()?)
//!     .serve()
//!     .await?;
//! ```

pub mod accounts;
pub mod config;
pub mod core;
pub mod entities;
pub mod links;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider, TokenAuthProvider},
        entity::{Editable, Entity, Model},
        error::{CatalogError, CatalogResult},
        link::{DeletePolicy, Link},
        service::{AccountService, DataService, LinkService},
    };

    // === Records ===
    pub use crate::entities::{
        Account, Client, ClientProfile, Discount, FavoriteDiscount, Marketplace, Registration,
        Shop, ShopToClient, ShopToMarketplace,
    };

    // === Relations ===
    pub use crate::links::{FavoriteOutcome, RelationshipManager};

    // === Storage ===
    pub use crate::storage::{CatalogStore, InMemoryStore};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
