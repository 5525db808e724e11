//! Storage implementations for different backends
//!
//! A backend implements [`CatalogStore`]: one [`DataService`] per record
//! kind, one [`LinkService`] per relation and the [`AccountService`].
//! [`StoreEntity`] and [`StoreLink`] let generic code pick the right service
//! for a type out of a `dyn CatalogStore`.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use crate::core::entity::Model;
use crate::core::link::Link;
use crate::core::service::{AccountService, DataService, LinkService};
use crate::entities::{
    Client, Discount, FavoriteDiscount, Marketplace, Shop, ShopToClient, ShopToMarketplace,
};

/// Every service the catalog needs, from one backend
pub trait CatalogStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    fn marketplaces(&self) -> &dyn DataService<Marketplace>;

    fn shops(&self) -> &dyn DataService<Shop>;

    fn discounts(&self) -> &dyn DataService<Discount>;

    fn clients(&self) -> &dyn DataService<Client>;

    fn shop_marketplaces(&self) -> &dyn LinkService<ShopToMarketplace>;

    fn shop_clients(&self) -> &dyn LinkService<ShopToClient>;

    fn favorites(&self) -> &dyn LinkService<FavoriteDiscount>;

    fn accounts(&self) -> &dyn AccountService;
}

/// Record kinds reachable through a [`CatalogStore`]
pub trait StoreEntity: Model {
    fn service(store: &dyn CatalogStore) -> &dyn DataService<Self>;
}

/// Relations reachable through a [`CatalogStore`]
pub trait StoreLink: Link<Left: StoreEntity, Right: StoreEntity> {
    fn service(store: &dyn CatalogStore) -> &dyn LinkService<Self>;
}

impl StoreEntity for Marketplace {
    fn service(store: &dyn CatalogStore) -> &dyn DataService<Self> {
        store.marketplaces()
    }
}

impl StoreEntity for Shop {
    fn service(store: &dyn CatalogStore) -> &dyn DataService<Self> {
        store.shops()
    }
}

impl StoreEntity for Discount {
    fn service(store: &dyn CatalogStore) -> &dyn DataService<Self> {
        store.discounts()
    }
}

impl StoreEntity for Client {
    fn service(store: &dyn CatalogStore) -> &dyn DataService<Self> {
        store.clients()
    }
}

impl StoreLink for ShopToMarketplace {
    fn service(store: &dyn CatalogStore) -> &dyn LinkService<Self> {
        store.shop_marketplaces()
    }
}

impl StoreLink for ShopToClient {
    fn service(store: &dyn CatalogStore) -> &dyn LinkService<Self> {
        store.shop_clients()
    }
}

impl StoreLink for FavoriteDiscount {
    fn service(store: &dyn CatalogStore) -> &dyn LinkService<Self> {
        store.favorites()
    }
}
