//! Join records for the three many-to-many relations
//!
//! | Relation | Left | Right | On delete |
//! |---|---|---|---|
//! | [`ShopToMarketplace`] | Shop | Marketplace | set null |
//! | [`ShopToClient`] | Shop | Client | cascade |
//! | [`FavoriteDiscount`] | Client | Discount | cascade |

use crate::core::link::{DeletePolicy, Link, LinkSide};
use crate::entities::{Client, Discount, Marketplace, Shop};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shop listed on a marketplace
///
/// Keyed by a sequential integer. Either side may be cleared when its
/// endpoint is deleted; the pair is unique while both sides are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopToMarketplace {
    pub id: i64,
    pub shop: Option<Uuid>,
    pub marketplace: Option<Uuid>,
}

impl Link for ShopToMarketplace {
    type Left = Shop;
    type Right = Marketplace;

    fn link_type() -> &'static str {
        "shop_to_marketplace"
    }

    fn table_name() -> &'static str {
        "shop_to_marketplace"
    }

    fn on_delete() -> DeletePolicy {
        DeletePolicy::SetNull
    }

    /// The id is assigned by the store on insert
    fn between(left: Uuid, right: Uuid, _now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            shop: Some(left),
            marketplace: Some(right),
        }
    }

    fn left_id(&self) -> Option<Uuid> {
        self.shop
    }

    fn right_id(&self) -> Option<Uuid> {
        self.marketplace
    }

    fn clear_side(&mut self, side: LinkSide) {
        match side {
            LinkSide::Left => self.shop = None,
            LinkSide::Right => self.marketplace = None,
        }
    }
}

/// A client following a shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopToClient {
    pub id: Uuid,
    pub shop: Uuid,
    pub client: Uuid,
    pub created: DateTime<Utc>,
}

impl Link for ShopToClient {
    type Left = Shop;
    type Right = Client;

    fn link_type() -> &'static str {
        "shop_to_client"
    }

    fn table_name() -> &'static str {
        "shop_to_client"
    }

    fn on_delete() -> DeletePolicy {
        DeletePolicy::Cascade
    }

    fn between(left: Uuid, right: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shop: left,
            client: right,
            created: now,
        }
    }

    fn left_id(&self) -> Option<Uuid> {
        Some(self.shop)
    }

    fn right_id(&self) -> Option<Uuid> {
        Some(self.client)
    }

    fn clear_side(&mut self, _side: LinkSide) {}
}

/// A discount saved by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteDiscount {
    pub id: Uuid,
    pub client: Uuid,
    pub discount: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Link for FavoriteDiscount {
    type Left = Client;
    type Right = Discount;

    fn link_type() -> &'static str {
        "favorite_discount"
    }

    fn table_name() -> &'static str {
        "favorite_discount"
    }

    fn on_delete() -> DeletePolicy {
        DeletePolicy::Cascade
    }

    fn between(left: Uuid, right: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client: left,
            discount: right,
            created: now,
            modified: now,
        }
    }

    fn left_id(&self) -> Option<Uuid> {
        Some(self.client)
    }

    fn right_id(&self) -> Option<Uuid> {
        Some(self.discount)
    }

    fn clear_side(&mut self, _side: LinkSide) {}
}
