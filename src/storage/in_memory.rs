//! In-memory catalog store for testing and development
//!
//! All tables sit behind a single `RwLock`, so every write (validation,
//! reference checks, the change itself and any cascade) happens inside one
//! critical section and is atomic with respect to other requests.

use crate::core::entity::{Entity, Model};
use crate::core::error::{
    CatalogError, CatalogResult, EntityError, LinkError, StorageError, ValidationError,
};
use crate::core::link::{DeletePolicy, Link, LinkSide};
use crate::core::service::{AccountService, DataService, LinkService};
use crate::entities::{
    Account, ApiToken, Client, Discount, FavoriteDiscount, Marketplace, Shop, ShopToClient,
    ShopToMarketplace,
};
use crate::storage::CatalogStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Every table of the in-memory store
#[derive(Debug, Default)]
pub struct Tables {
    marketplaces: HashMap<Uuid, Marketplace>,
    shops: HashMap<Uuid, Shop>,
    discounts: HashMap<Uuid, Discount>,
    clients: HashMap<Uuid, Client>,
    accounts: HashMap<Uuid, Account>,
    tokens: HashMap<String, ApiToken>,
    shop_marketplaces: Vec<ShopToMarketplace>,
    shop_clients: Vec<ShopToClient>,
    favorites: Vec<FavoriteDiscount>,
    shop_marketplace_seq: i64,
}

/// In-memory store implementation
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CatalogResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|e| {
            StorageError::LockPoisoned {
                kind: "read",
                message: e.to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> CatalogResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|e| {
            StorageError::LockPoisoned {
                kind: "write",
                message: e.to_string(),
            }
            .into()
        })
    }
}

// =============================================================================
// Record tables
// =============================================================================

/// A record kind with its own table
pub trait MemoryTable: Model {
    fn rows(tables: &Tables) -> &HashMap<Uuid, Self>;

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Reject a write that names a record which does not exist
    fn check_references(&self, _tables: &Tables) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Apply every relation's delete policy after `id` is removed
    fn detach(_id: Uuid, _tables: &mut Tables) {}
}

fn missing_reference(field: &str, id: Uuid) -> ValidationError {
    ValidationError::FieldError {
        field: field.to_string(),
        message: format!("Invalid pk \"{}\" - object does not exist.", id),
    }
}

/// Cascade or clear join records whose `side` points at `id`
fn detach_links<L: Link>(links: &mut Vec<L>, side: LinkSide, id: Uuid) {
    match L::on_delete() {
        DeletePolicy::Cascade => links.retain(|link| link.side_id(side) != Some(id)),
        DeletePolicy::SetNull => links
            .iter_mut()
            .filter(|link| link.side_id(side) == Some(id))
            .for_each(|link| link.clear_side(side)),
    }
}

impl MemoryTable for Marketplace {
    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.marketplaces
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.marketplaces
    }

    fn detach(id: Uuid, tables: &mut Tables) {
        detach_links(&mut tables.shop_marketplaces, LinkSide::Right, id);
    }
}

impl MemoryTable for Shop {
    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.shops
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.shops
    }

    fn detach(id: Uuid, tables: &mut Tables) {
        detach_links(&mut tables.shop_marketplaces, LinkSide::Left, id);
        detach_links(&mut tables.shop_clients, LinkSide::Left, id);
        tables
            .discounts
            .values_mut()
            .filter(|discount| discount.shop == Some(id))
            .for_each(|discount| discount.shop = None);
    }
}

impl MemoryTable for Discount {
    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.discounts
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.discounts
    }

    fn check_references(&self, tables: &Tables) -> Result<(), ValidationError> {
        match self.shop {
            Some(shop) if !tables.shops.contains_key(&shop) => Err(missing_reference("shop", shop)),
            _ => Ok(()),
        }
    }

    fn detach(id: Uuid, tables: &mut Tables) {
        detach_links(&mut tables.favorites, LinkSide::Right, id);
    }
}

impl MemoryTable for Client {
    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.clients
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.clients
    }

    fn check_references(&self, tables: &Tables) -> Result<(), ValidationError> {
        if !tables.accounts.contains_key(&self.user) {
            return Err(missing_reference("user", self.user));
        }
        let taken = tables
            .clients
            .values()
            .any(|other| other.user == self.user && other.id() != self.id());
        if taken {
            return Err(ValidationError::FieldError {
                field: "user".to_string(),
                message: "client with this user already exists.".to_string(),
            });
        }
        Ok(())
    }

    fn detach(id: Uuid, tables: &mut Tables) {
        detach_links(&mut tables.shop_clients, LinkSide::Right, id);
        detach_links(&mut tables.favorites, LinkSide::Left, id);
    }
}

#[async_trait]
impl<T: MemoryTable> DataService<T> for InMemoryStore {
    async fn create(&self, entity: T) -> CatalogResult<T> {
        let mut tables = self.write()?;

        entity.validate(Utc::now())?;
        entity.check_references(&tables)?;
        if T::rows(&tables).contains_key(&entity.id()) {
            return Err(EntityError::AlreadyExists {
                entity_type: T::resource_name_singular().to_string(),
                id: entity.id(),
            }
            .into());
        }

        T::rows_mut(&mut tables).insert(entity.id(), entity.clone());
        tracing::info!(entity_type = T::resource_name_singular(), id = %entity.id(), "created");
        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> CatalogResult<Option<T>> {
        let tables = self.read()?;
        Ok(T::rows(&tables).get(id).cloned())
    }

    async fn list(&self) -> CatalogResult<Vec<T>> {
        let tables = self.read()?;
        let mut records: Vec<T> = T::rows(&tables).values().cloned().collect();
        T::sort_canonical(&mut records);
        Ok(records)
    }

    async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<T>> {
        let tables = self.read()?;
        let rows = T::rows(&tables);
        let mut records: Vec<T> = rows
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(_, record)| record.clone())
            .collect();
        T::sort_canonical(&mut records);
        Ok(records)
    }

    async fn update(&self, mut entity: T) -> CatalogResult<T> {
        let mut tables = self.write()?;
        let id = entity.id();
        if !T::rows(&tables).contains_key(&id) {
            return Err(CatalogError::not_found(T::resource_name_singular(), id));
        }

        let now = Utc::now();
        entity.audit_mut().touch(now);
        entity.validate(now)?;
        entity.check_references(&tables)?;

        T::rows_mut(&mut tables).insert(id, entity.clone());
        tracing::info!(entity_type = T::resource_name_singular(), id = %id, "updated");
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        let mut tables = self.write()?;
        if T::rows_mut(&mut tables).remove(id).is_none() {
            return Err(CatalogError::not_found(T::resource_name_singular(), *id));
        }
        T::detach(*id, &mut tables);
        tracing::info!(entity_type = T::resource_name_singular(), id = %id, "deleted");
        Ok(())
    }

    async fn count(&self) -> CatalogResult<usize> {
        let tables = self.read()?;
        Ok(T::rows(&tables).len())
    }
}

// =============================================================================
// Join tables
// =============================================================================

/// A relation with its own join table
pub trait MemoryLinkTable: Link<Left: MemoryTable, Right: MemoryTable> {
    fn links(tables: &Tables) -> &Vec<Self>;

    fn links_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// Hook for relations keyed by a store-assigned sequence
    fn assign_key(&mut self, _tables: &mut Tables) {}
}

impl MemoryLinkTable for ShopToMarketplace {
    fn links(tables: &Tables) -> &Vec<Self> {
        &tables.shop_marketplaces
    }

    fn links_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.shop_marketplaces
    }

    fn assign_key(&mut self, tables: &mut Tables) {
        tables.shop_marketplace_seq += 1;
        self.id = tables.shop_marketplace_seq;
    }
}

impl MemoryLinkTable for ShopToClient {
    fn links(tables: &Tables) -> &Vec<Self> {
        &tables.shop_clients
    }

    fn links_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.shop_clients
    }
}

impl MemoryLinkTable for FavoriteDiscount {
    fn links(tables: &Tables) -> &Vec<Self> {
        &tables.favorites
    }

    fn links_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.favorites
    }
}

#[async_trait]
impl<L> LinkService<L> for InMemoryStore
where
    L: MemoryLinkTable,
    L::Left: MemoryTable,
    L::Right: MemoryTable,
{
    async fn link(&self, left: &Uuid, right: &Uuid) -> CatalogResult<L> {
        let mut tables = self.write()?;

        if !<L::Left as MemoryTable>::rows(&tables).contains_key(left) {
            return Err(CatalogError::not_found(
                <L::Left as Entity>::resource_name_singular(),
                *left,
            ));
        }
        if !<L::Right as MemoryTable>::rows(&tables).contains_key(right) {
            return Err(CatalogError::not_found(
                <L::Right as Entity>::resource_name_singular(),
                *right,
            ));
        }
        if L::links(&tables).iter().any(|link| link.connects(*left, *right)) {
            return Err(LinkError::AlreadyExists {
                link_type: L::link_type().to_string(),
                left_id: *left,
                right_id: *right,
            }
            .into());
        }

        let mut record = L::between(*left, *right, Utc::now());
        record.assign_key(&mut tables);
        L::links_mut(&mut tables).push(record.clone());
        tracing::info!(link_type = L::link_type(), left = %left, right = %right, "linked");
        Ok(record)
    }

    async fn unlink(&self, left: &Uuid, right: &Uuid) -> CatalogResult<bool> {
        let mut tables = self.write()?;
        let links = L::links_mut(&mut tables);
        let before = links.len();
        links.retain(|link| !link.connects(*left, *right));
        let removed = links.len() != before;
        if removed {
            tracing::info!(link_type = L::link_type(), left = %left, right = %right, "unlinked");
        }
        Ok(removed)
    }

    async fn find(&self, left: &Uuid, right: &Uuid) -> CatalogResult<Option<L>> {
        let tables = self.read()?;
        Ok(L::links(&tables)
            .iter()
            .find(|link| link.connects(*left, *right))
            .cloned())
    }

    async fn find_by(&self, side: LinkSide, id: &Uuid) -> CatalogResult<Vec<L>> {
        let tables = self.read()?;
        Ok(L::links(&tables)
            .iter()
            .filter(|link| link.side_id(side) == Some(*id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> CatalogResult<Vec<L>> {
        let tables = self.read()?;
        Ok(L::links(&tables).clone())
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[async_trait]
impl AccountService for InMemoryStore {
    async fn register(&self, account: Account) -> CatalogResult<(Account, Client)> {
        let mut tables = self.write()?;

        let taken = tables
            .accounts
            .values()
            .any(|existing| existing.username == account.username);
        if taken {
            return Err(CatalogError::invalid_field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let client = Client::new(account.id, Utc::now());
        tables.accounts.insert(account.id, account.clone());
        tables.clients.insert(client.id(), client.clone());
        tracing::info!(account_id = %account.id, username = %account.username, "registered account");
        Ok((account, client))
    }

    async fn get_account(&self, id: &Uuid) -> CatalogResult<Option<Account>> {
        let tables = self.read()?;
        Ok(tables.accounts.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<Account>> {
        let tables = self.read()?;
        Ok(tables
            .accounts
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn delete_account(&self, id: &Uuid) -> CatalogResult<()> {
        let mut tables = self.write()?;
        if tables.accounts.remove(id).is_none() {
            return Err(CatalogError::not_found("account", *id));
        }
        tables.tokens.retain(|_, token| token.account_id != *id);

        let client_ids: Vec<Uuid> = tables
            .clients
            .values()
            .filter(|client| client.user == *id)
            .map(|client| client.id())
            .collect();
        for client_id in client_ids {
            tables.clients.remove(&client_id);
            Client::detach(client_id, &mut tables);
        }

        tracing::info!(account_id = %id, "deleted account");
        Ok(())
    }

    async fn client_for(&self, account_id: &Uuid) -> CatalogResult<Option<Client>> {
        let tables = self.read()?;
        Ok(tables
            .clients
            .values()
            .find(|client| client.user == *account_id)
            .cloned())
    }

    async fn ensure_client(&self, account_id: &Uuid) -> CatalogResult<Client> {
        let mut tables = self.write()?;
        if let Some(client) = tables.clients.values().find(|c| c.user == *account_id) {
            return Ok(client.clone());
        }
        if !tables.accounts.contains_key(account_id) {
            return Err(CatalogError::not_found("account", *account_id));
        }

        let client = Client::new(*account_id, Utc::now());
        tables.clients.insert(client.id(), client.clone());
        tracing::info!(account_id = %account_id, client_id = %client.id(), "created missing client");
        Ok(client)
    }

    async fn issue_token(&self, account_id: &Uuid) -> CatalogResult<ApiToken> {
        let mut tables = self.write()?;
        if !tables.accounts.contains_key(account_id) {
            return Err(CatalogError::not_found("account", *account_id));
        }
        if let Some(token) = tables.tokens.values().find(|t| t.account_id == *account_id) {
            return Ok(token.clone());
        }

        let token = ApiToken::generate(*account_id, Utc::now());
        tables.tokens.insert(token.key.clone(), token.clone());
        Ok(token)
    }

    async fn resolve_token(&self, key: &str) -> CatalogResult<Option<Account>> {
        let tables = self.read()?;
        Ok(tables
            .tokens
            .get(key)
            .and_then(|token| tables.accounts.get(&token.account_id))
            .cloned())
    }

    async fn revoke_token(&self, key: &str) -> CatalogResult<bool> {
        let mut tables = self.write()?;
        Ok(tables.tokens.remove(key).is_some())
    }
}

impl CatalogStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    fn marketplaces(&self) -> &dyn DataService<Marketplace> {
        self
    }

    fn shops(&self) -> &dyn DataService<Shop> {
        self
    }

    fn discounts(&self) -> &dyn DataService<Discount> {
        self
    }

    fn clients(&self) -> &dyn DataService<Client> {
        self
    }

    fn shop_marketplaces(&self) -> &dyn LinkService<ShopToMarketplace> {
        self
    }

    fn shop_clients(&self) -> &dyn LinkService<ShopToClient> {
        self
    }

    fn favorites(&self) -> &dyn LinkService<FavoriteDiscount> {
        self
    }

    fn accounts(&self) -> &dyn AccountService {
        self
    }
}
