//! Service traits for records, associations and accounts

use crate::core::entity::Model;
use crate::core::error::CatalogResult;
use crate::core::link::{Link, LinkSide};
use crate::entities::{Account, ApiToken, Client};
use async_trait::async_trait;
use uuid::Uuid;

/// CRUD over one kind of record
///
/// Every write runs validation, reference checks and the change itself as
/// one atomic step; a failure leaves storage untouched.
#[async_trait]
pub trait DataService<T: Model>: Send + Sync {
    /// Persist a new record; fails with a validation error on any broken invariant
    async fn create(&self, entity: T) -> CatalogResult<T>;

    async fn get(&self, id: &Uuid) -> CatalogResult<Option<T>>;

    /// All records in canonical order
    async fn list(&self) -> CatalogResult<Vec<T>>;

    /// Records for the given ids in canonical order; unknown ids are skipped
    async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<T>>;

    /// Replace an existing record, refreshing `modified`
    async fn update(&self, entity: T) -> CatalogResult<T>;

    /// Remove a record, applying each relation's delete policy
    async fn delete(&self, id: &Uuid) -> CatalogResult<()>;

    async fn count(&self) -> CatalogResult<usize>;
}

/// Join-record storage for one relation
#[async_trait]
pub trait LinkService<L: Link>: Send + Sync {
    /// Associate `left` with `right`
    ///
    /// Fails with a duplicate-link error when the pair already exists and
    /// with not-found when either endpoint is missing.
    async fn link(&self, left: &Uuid, right: &Uuid) -> CatalogResult<L>;

    /// Remove the association; `Ok(false)` when there was none
    async fn unlink(&self, left: &Uuid, right: &Uuid) -> CatalogResult<bool>;

    async fn find(&self, left: &Uuid, right: &Uuid) -> CatalogResult<Option<L>>;

    /// Records whose `side` points at `id`
    async fn find_by(&self, side: LinkSide, id: &Uuid) -> CatalogResult<Vec<L>>;

    async fn list(&self) -> CatalogResult<Vec<L>>;
}

/// Accounts, their client records and API tokens
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Store `account` and create its client in the same step
    ///
    /// The username must be unused.
    async fn register(&self, account: Account) -> CatalogResult<(Account, Client)>;

    async fn get_account(&self, id: &Uuid) -> CatalogResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<Account>>;

    /// Remove the account together with its client and tokens
    async fn delete_account(&self, id: &Uuid) -> CatalogResult<()>;

    async fn client_for(&self, account_id: &Uuid) -> CatalogResult<Option<Client>>;

    /// Return the account's client, creating it when missing
    async fn ensure_client(&self, account_id: &Uuid) -> CatalogResult<Client>;

    /// Existing token for the account, or a fresh one
    async fn issue_token(&self, account_id: &Uuid) -> CatalogResult<ApiToken>;

    async fn resolve_token(&self, key: &str) -> CatalogResult<Option<Account>>;

    /// `Ok(false)` when the key was unknown
    async fn revoke_token(&self, key: &str) -> CatalogResult<bool>;
}
