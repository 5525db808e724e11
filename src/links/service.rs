//! Relationship manager over the store's link services
//!
//! Generic over any [`StoreLink`]: linking, unlinking and resolving the
//! records on the other side of a relation. Favorites and followed shops are
//! thin account-aware wrappers around the same operations.

use crate::core::entity::Entity;
use crate::core::error::{CatalogError, CatalogResult, LinkError};
use crate::core::link::LinkSide;
use crate::entities::{Discount, FavoriteDiscount, Shop, ShopToClient};
use crate::storage::{CatalogStore, StoreEntity, StoreLink};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a favorites operation
///
/// Adding a discount twice or removing one that is not there is reported,
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
    /// The account has no client record to hold favorites
    NoClient,
}

impl FavoriteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            FavoriteOutcome::Added => "Discount added to favorites.",
            FavoriteOutcome::AlreadyPresent => "This discount is already in your favorites.",
            FavoriteOutcome::Removed => "Discount removed from favorites.",
            FavoriteOutcome::NotPresent => "This discount is not in your favorites.",
            FavoriteOutcome::NoClient => "Client account does not exist.",
        }
    }
}

/// Links and resolves records across relations
#[derive(Clone)]
pub struct RelationshipManager {
    store: Arc<dyn CatalogStore>,
}

impl RelationshipManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Associate `left` with `right`
    ///
    /// Fails with a duplicate-link error when the pair exists and with
    /// not-found when either endpoint is missing.
    pub async fn link<L>(&self, left: &Uuid, right: &Uuid) -> CatalogResult<L>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        <L as StoreLink>::service(self.store.as_ref())
            .link(left, right)
            .await
    }

    /// Remove the association; `Ok(false)` when it did not exist
    pub async fn unlink<L>(&self, left: &Uuid, right: &Uuid) -> CatalogResult<bool>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        <L as StoreLink>::service(self.store.as_ref())
            .unlink(left, right)
            .await
    }

    pub async fn is_linked<L>(&self, left: &Uuid, right: &Uuid) -> CatalogResult<bool>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        let found = <L as StoreLink>::service(self.store.as_ref())
            .find(left, right)
            .await?;
        Ok(found.is_some())
    }

    /// Right-side records linked to `left`, in their canonical order
    ///
    /// Join rows whose right side was cleared or points at a missing record
    /// are skipped.
    pub async fn linked_right<L>(&self, left: &Uuid) -> CatalogResult<Vec<L::Right>>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        let ids = self.opposite_ids::<L>(LinkSide::Left, left).await?;
        <L::Right as StoreEntity>::service(self.store.as_ref())
            .get_many(&ids)
            .await
    }

    /// Left-side records linked to `right`, in their canonical order
    pub async fn linked_left<L>(&self, right: &Uuid) -> CatalogResult<Vec<L::Left>>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        let ids = self.opposite_ids::<L>(LinkSide::Right, right).await?;
        <L::Left as StoreEntity>::service(self.store.as_ref())
            .get_many(&ids)
            .await
    }

    async fn opposite_ids<L>(&self, side: LinkSide, id: &Uuid) -> CatalogResult<Vec<Uuid>>
    where
        L: StoreLink,
        L::Left: StoreEntity,
        L::Right: StoreEntity,
    {
        let links = <L as StoreLink>::service(self.store.as_ref())
            .find_by(side, id)
            .await?;
        tracing::debug!(link_type = L::link_type(), id = %id, count = links.len(), "resolved links");
        Ok(links
            .iter()
            .filter_map(|link| link.side_id(side.opposite()))
            .collect())
    }

    /// Discounts whose `shop` is `shop_id`
    pub async fn shop_discounts(&self, shop_id: &Uuid) -> CatalogResult<Vec<Discount>> {
        let discounts = self.store.discounts().list().await?;
        Ok(discounts
            .into_iter()
            .filter(|discount| discount.shop == Some(*shop_id))
            .collect())
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Add a discount to the account's favorites
    ///
    /// The client record is created when the account has none.
    pub async fn add_favorite(
        &self,
        account_id: &Uuid,
        discount_id: &Uuid,
    ) -> CatalogResult<FavoriteOutcome> {
        let client = self.store.accounts().ensure_client(account_id).await?;
        match self.link::<FavoriteDiscount>(&client.id(), discount_id).await {
            Ok(_) => Ok(FavoriteOutcome::Added),
            Err(CatalogError::Link(LinkError::AlreadyExists { .. })) => {
                Ok(FavoriteOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a discount from the account's favorites
    ///
    /// The discount must exist; a missing favorite is only reported.
    pub async fn remove_favorite(
        &self,
        account_id: &Uuid,
        discount_id: &Uuid,
    ) -> CatalogResult<FavoriteOutcome> {
        if self.store.discounts().get(discount_id).await?.is_none() {
            return Err(CatalogError::not_found(
                Discount::resource_name_singular(),
                *discount_id,
            ));
        }

        let Some(client) = self.store.accounts().client_for(account_id).await? else {
            return Ok(FavoriteOutcome::NoClient);
        };

        if self.unlink::<FavoriteDiscount>(&client.id(), discount_id).await? {
            Ok(FavoriteOutcome::Removed)
        } else {
            Ok(FavoriteOutcome::NotPresent)
        }
    }

    /// The account's favorite discounts; empty without a client
    pub async fn favorites(&self, account_id: &Uuid) -> CatalogResult<Vec<Discount>> {
        match self.store.accounts().client_for(account_id).await? {
            Some(client) => self.linked_right::<FavoriteDiscount>(&client.id()).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn is_favorite(&self, account_id: &Uuid, discount_id: &Uuid) -> CatalogResult<bool> {
        match self.store.accounts().client_for(account_id).await? {
            Some(client) => {
                self.is_linked::<FavoriteDiscount>(&client.id(), discount_id)
                    .await
            }
            None => Ok(false),
        }
    }

    // =========================================================================
    // Followed shops
    // =========================================================================

    /// Shops the account's client is linked to
    pub async fn client_shops(&self, account_id: &Uuid) -> CatalogResult<Vec<Shop>> {
        match self.store.accounts().client_for(account_id).await? {
            Some(client) => self.linked_left::<ShopToClient>(&client.id()).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn follow_shop(&self, account_id: &Uuid, shop_id: &Uuid) -> CatalogResult<ShopToClient> {
        let client = self.store.accounts().ensure_client(account_id).await?;
        self.link::<ShopToClient>(shop_id, &client.id()).await
    }

    /// `Ok(false)` when the shop was not followed
    pub async fn unfollow_shop(&self, account_id: &Uuid, shop_id: &Uuid) -> CatalogResult<bool> {
        match self.store.accounts().client_for(account_id).await? {
            Some(client) => self.unlink::<ShopToClient>(shop_id, &client.id()).await,
            None => Ok(false),
        }
    }
}
