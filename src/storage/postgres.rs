//! PostgreSQL storage backend using sqlx
//!
//! Every table lives in one schema (default `online`) which the pool puts
//! first on each connection's search path; `connect` creates the schema and
//! runs the migrations in `migrations/`. Each write runs its checks and the
//! change in a single transaction. Delete policies are the foreign keys'
//! `ON DELETE` clauses.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag.

use crate::core::entity::{AuditedEntity, Entity, Model};
use crate::core::error::{
    CatalogError, CatalogResult, ConfigError, EntityError, LinkError, StorageError,
};
use crate::core::link::{Link, LinkSide};
use crate::core::service::{AccountService, DataService, LinkService};
use crate::entities::{
    Account, ApiToken, Client, Discount, FavoriteDiscount, Marketplace, Shop, ShopToClient,
    ShopToMarketplace,
};
use crate::storage::CatalogStore;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Postgres, Row};
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

static SCHEMA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("schema pattern is a valid regex")
});

/// Catalog store backed by a PostgreSQL pool
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap a pool whose connections already resolve the catalog tables
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, create `schema` when missing and apply pending migrations
    pub async fn connect(url: &str, schema: &str) -> CatalogResult<Self> {
        if !SCHEMA_NAME.is_match(schema) {
            return Err(ConfigError::InvalidValue {
                field: "storage.schema".to_string(),
                value: schema.to_string(),
                message: "expected a lowercase SQL identifier".to_string(),
            }
            .into());
        }

        let options = PgConnectOptions::from_str(url)
            .map_err(|e| connection_error(e.to_string()))?
            .options([("search_path", schema)]);
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
            .execute(&pool)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        tracing::info!(schema, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn connection_error(message: String) -> CatalogError {
    StorageError::ConnectionError {
        backend: "PostgreSQL".to_string(),
        message,
    }
    .into()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn exists(conn: &mut PgConnection, table: &str, id: &Uuid) -> CatalogResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
    let (found,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(conn).await?;
    Ok(found)
}

fn missing_reference(field: &str, id: Uuid) -> CatalogError {
    CatalogError::invalid_field(
        field,
        format!("Invalid pk \"{}\" - object does not exist.", id),
    )
}

// =============================================================================
// Record tables
// =============================================================================

/// A record kind mapped onto its own table
#[async_trait]
pub trait PgTable: Model {
    /// Columns after `id, created, modified`, in bind order
    const COLUMNS: &'static [&'static str];

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    /// Reject a write that names a record which does not exist
    async fn check_references(&self, _conn: &mut PgConnection) -> CatalogResult<()> {
        Ok(())
    }

    /// Error for a write rejected by a unique constraint
    fn unique_violation(&self) -> CatalogError {
        EntityError::AlreadyExists {
            entity_type: Self::resource_name_singular().to_string(),
            id: self.id(),
        }
        .into()
    }
}

fn audit_from_row(row: &PgRow) -> Result<AuditedEntity, sqlx::Error> {
    Ok(AuditedEntity {
        id: row.try_get("id")?,
        created: row.try_get("created")?,
        modified: row.try_get("modified")?,
    })
}

fn insert_sql<T: PgTable>() -> String {
    let columns: Vec<&str> = ["id", "created", "modified"]
        .into_iter()
        .chain(T::COLUMNS.iter().copied())
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${}", n)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::table_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql<T: PgTable>() -> String {
    let assignments: Vec<String> = ["created", "modified"]
        .into_iter()
        .chain(T::COLUMNS.iter().copied())
        .enumerate()
        .map(|(n, column)| format!("{} = ${}", column, n + 2))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = $1",
        T::table_name(),
        assignments.join(", ")
    )
}

fn bind_record<'q, T: PgTable>(record: &T, query: PgQuery<'q>) -> PgQuery<'q> {
    let audit = *record.audit();
    record.bind_columns(
        query
            .bind(audit.id)
            .bind(audit.created)
            .bind(audit.modified),
    )
}

#[async_trait]
impl PgTable for Marketplace {
    const COLUMNS: &'static [&'static str] = &["title", "url_address"];

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.title.clone())
            .bind(self.url_address.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            audit: audit_from_row(row)?,
            title: row.try_get("title")?,
            url_address: row.try_get("url_address")?,
        })
    }
}

#[async_trait]
impl PgTable for Shop {
    const COLUMNS: &'static [&'static str] = &["title", "description", "rating"];

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.title.clone())
            .bind(self.description.clone())
            .bind(self.rating)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            audit: audit_from_row(row)?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            rating: row.try_get("rating")?,
        })
    }
}

#[async_trait]
impl PgTable for Discount {
    const COLUMNS: &'static [&'static str] = &[
        "shop_id",
        "title",
        "description",
        "start_date",
        "end_date",
        "image",
    ];

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.shop)
            .bind(self.title.clone())
            .bind(self.description.clone())
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(self.image.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            audit: audit_from_row(row)?,
            shop: row.try_get("shop_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            image: row.try_get("image")?,
        })
    }

    async fn check_references(&self, conn: &mut PgConnection) -> CatalogResult<()> {
        if let Some(shop) = self.shop {
            if !exists(conn, Shop::table_name(), &shop).await? {
                return Err(missing_reference("shop", shop));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PgTable for Client {
    const COLUMNS: &'static [&'static str] = &["user_id", "money", "photo"];

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.user)
            .bind(self.money)
            .bind(self.photo.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            audit: audit_from_row(row)?,
            user: row.try_get("user_id")?,
            money: row.try_get("money")?,
            photo: row.try_get("photo")?,
        })
    }

    async fn check_references(&self, conn: &mut PgConnection) -> CatalogResult<()> {
        if !exists(conn, "account", &self.user).await? {
            return Err(missing_reference("user", self.user));
        }
        Ok(())
    }

    /// `user_id` is the only unique column besides the key
    fn unique_violation(&self) -> CatalogError {
        CatalogError::invalid_field("user", "client with this user already exists.")
    }
}

fn decode_all<T, F>(rows: Vec<PgRow>, decode: F) -> CatalogResult<Vec<T>>
where
    F: Fn(&PgRow) -> Result<T, sqlx::Error>,
{
    rows.iter()
        .map(|row| decode(row).map_err(CatalogError::from))
        .collect()
}

#[async_trait]
impl<T: PgTable> DataService<T> for PostgresStore {
    async fn create(&self, entity: T) -> CatalogResult<T> {
        entity.validate(Utc::now())?;

        let mut tx = self.pool.begin().await?;
        entity.check_references(&mut tx).await?;

        let sql = insert_sql::<T>();
        match bind_record(&entity, sqlx::query(&sql)).execute(&mut *tx).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(entity.unique_violation()),
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        tracing::info!(entity_type = T::resource_name_singular(), id = %entity.id(), "created");
        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> CatalogResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::table_name());
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(T::from_row).transpose()?)
    }

    async fn list(&self) -> CatalogResult<Vec<T>> {
        let sql = format!("SELECT * FROM {}", T::table_name());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut records = decode_all(rows, T::from_row)?;
        T::sort_canonical(&mut records);
        Ok(records)
    }

    async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT * FROM {} WHERE id = ANY($1)", T::table_name());
        let rows = sqlx::query(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        let mut records = decode_all(rows, T::from_row)?;
        T::sort_canonical(&mut records);
        Ok(records)
    }

    async fn update(&self, mut entity: T) -> CatalogResult<T> {
        let now = Utc::now();
        entity.audit_mut().touch(now);
        entity.validate(now)?;

        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, T::table_name(), &entity.id()).await? {
            return Err(CatalogError::not_found(
                T::resource_name_singular(),
                entity.id(),
            ));
        }
        entity.check_references(&mut tx).await?;

        let sql = update_sql::<T>();
        match bind_record(&entity, sqlx::query(&sql)).execute(&mut *tx).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(entity.unique_violation()),
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        tracing::info!(entity_type = T::resource_name_singular(), id = %entity.id(), "updated");
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::table_name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found(T::resource_name_singular(), *id));
        }
        tracing::info!(entity_type = T::resource_name_singular(), id = %id, "deleted");
        Ok(())
    }

    async fn count(&self) -> CatalogResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::table_name());
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

// =============================================================================
// Join tables
// =============================================================================

/// A relation mapped onto its own join table
pub trait PgLinkTable: Link<Left: PgTable, Right: PgTable> {
    const LEFT_COLUMN: &'static str;

    const RIGHT_COLUMN: &'static str;

    /// Insert statement ending in `RETURNING *`
    const INSERT: &'static str;

    const ORDER_BY: &'static str;

    fn bind_insert<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    fn column(side: LinkSide) -> &'static str {
        match side {
            LinkSide::Left => Self::LEFT_COLUMN,
            LinkSide::Right => Self::RIGHT_COLUMN,
        }
    }
}

impl PgLinkTable for ShopToMarketplace {
    const LEFT_COLUMN: &'static str = "shop_id";
    const RIGHT_COLUMN: &'static str = "marketplace_id";
    const INSERT: &'static str =
        "INSERT INTO shop_to_marketplace (shop_id, marketplace_id) VALUES ($1, $2) RETURNING *";
    const ORDER_BY: &'static str = "id";

    fn bind_insert<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.shop).bind(self.marketplace)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            shop: row.try_get("shop_id")?,
            marketplace: row.try_get("marketplace_id")?,
        })
    }
}

impl PgLinkTable for ShopToClient {
    const LEFT_COLUMN: &'static str = "shop_id";
    const RIGHT_COLUMN: &'static str = "client_id";
    const INSERT: &'static str = "INSERT INTO shop_to_client (id, shop_id, client_id, created) \
         VALUES ($1, $2, $3, $4) RETURNING *";
    const ORDER_BY: &'static str = "created, id";

    fn bind_insert<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(self.shop)
            .bind(self.client)
            .bind(self.created)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            shop: row.try_get("shop_id")?,
            client: row.try_get("client_id")?,
            created: row.try_get("created")?,
        })
    }
}

impl PgLinkTable for FavoriteDiscount {
    const LEFT_COLUMN: &'static str = "client_id";
    const RIGHT_COLUMN: &'static str = "discount_id";
    const INSERT: &'static str =
        "INSERT INTO favorite_discount (id, client_id, discount_id, created, modified) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *";
    const ORDER_BY: &'static str = "created, id";

    fn bind_insert<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(self.client)
            .bind(self.discount)
            .bind(self.created)
            .bind(self.modified)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            client: row.try_get("client_id")?,
            discount: row.try_get("discount_id")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
        })
    }
}

fn duplicate_link<L: Link>(left: &Uuid, right: &Uuid) -> CatalogError {
    LinkError::AlreadyExists {
        link_type: L::link_type().to_string(),
        left_id: *left,
        right_id: *right,
    }
    .into()
}

#[async_trait]
impl<L> LinkService<L> for PostgresStore
where
    L: PgLinkTable,
    L::Left: PgTable,
    L::Right: PgTable,
{
    async fn link(&self, left: &Uuid, right: &Uuid) -> CatalogResult<L> {
        let mut tx = self.pool.begin().await?;

        if !exists(&mut tx, <L::Left as Entity>::table_name(), left).await? {
            return Err(CatalogError::not_found(
                <L::Left as Entity>::resource_name_singular(),
                *left,
            ));
        }
        if !exists(&mut tx, <L::Right as Entity>::table_name(), right).await? {
            return Err(CatalogError::not_found(
                <L::Right as Entity>::resource_name_singular(),
                *right,
            ));
        }

        let record = L::between(*left, *right, Utc::now());
        let row = match record.bind_insert(sqlx::query(L::INSERT)).fetch_one(&mut *tx).await {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Err(duplicate_link::<L>(left, right)),
            Err(e) => return Err(e.into()),
        };
        let record = L::from_row(&row)?;
        tx.commit().await?;

        tracing::info!(link_type = L::link_type(), left = %left, right = %right, "linked");
        Ok(record)
    }

    async fn unlink(&self, left: &Uuid, right: &Uuid) -> CatalogResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            L::table_name(),
            L::LEFT_COLUMN,
            L::RIGHT_COLUMN
        );
        let result = sqlx::query(&sql)
            .bind(left)
            .bind(right)
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(link_type = L::link_type(), left = %left, right = %right, "unlinked");
        }
        Ok(removed)
    }

    async fn find(&self, left: &Uuid, right: &Uuid) -> CatalogResult<Option<L>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 AND {} = $2",
            L::table_name(),
            L::LEFT_COLUMN,
            L::RIGHT_COLUMN
        );
        let row = sqlx::query(&sql)
            .bind(left)
            .bind(right)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(L::from_row).transpose()?)
    }

    async fn find_by(&self, side: LinkSide, id: &Uuid) -> CatalogResult<Vec<L>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {}",
            L::table_name(),
            L::column(side),
            L::ORDER_BY
        );
        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;
        decode_all(rows, L::from_row)
    }

    async fn list(&self) -> CatalogResult<Vec<L>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", L::table_name(), L::ORDER_BY);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        decode_all(rows, L::from_row)
    }
}

// =============================================================================
// Accounts
// =============================================================================

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_superuser: row.try_get("is_superuser")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn token_from_row(row: &PgRow) -> Result<ApiToken, sqlx::Error> {
    Ok(ApiToken {
        key: row.try_get("key")?,
        account_id: row.try_get("account_id")?,
        created: row.try_get("created")?,
    })
}

fn username_taken() -> CatalogError {
    CatalogError::invalid_field("username", "A user with that username already exists.")
}

async fn insert_client(conn: &mut PgConnection, client: &Client) -> CatalogResult<()> {
    let sql = insert_sql::<Client>();
    bind_record(client, sqlx::query(&sql)).execute(conn).await?;
    Ok(())
}

async fn client_of(conn: &mut PgConnection, account_id: &Uuid) -> CatalogResult<Option<Client>> {
    let row = sqlx::query("SELECT * FROM client WHERE user_id = $1")
        .bind(account_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.as_ref().map(Client::from_row).transpose()?)
}

#[async_trait]
impl AccountService for PostgresStore {
    async fn register(&self, account: Account) -> CatalogResult<(Account, Client)> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO account \
             (id, username, first_name, last_name, email, password_hash, is_superuser, date_joined) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_superuser)
        .bind(account.date_joined)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(username_taken()),
            Err(e) => return Err(e.into()),
        }

        let client = Client::new(account.id, Utc::now());
        insert_client(&mut tx, &client).await?;
        tx.commit().await?;

        tracing::info!(account_id = %account.id, username = %account.username, "registered account");
        Ok((account, client))
    }

    async fn get_account(&self, id: &Uuid) -> CatalogResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM account WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM account WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn delete_account(&self, id: &Uuid) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("account", *id));
        }
        tracing::info!(account_id = %id, "deleted account");
        Ok(())
    }

    async fn client_for(&self, account_id: &Uuid) -> CatalogResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        client_of(&mut conn, account_id).await
    }

    async fn ensure_client(&self, account_id: &Uuid) -> CatalogResult<Client> {
        let mut conn = self.pool.acquire().await?;
        if let Some(client) = client_of(&mut conn, account_id).await? {
            return Ok(client);
        }
        if !exists(&mut conn, "account", account_id).await? {
            return Err(CatalogError::not_found("account", *account_id));
        }

        // A concurrent caller may insert first; the loser reads the winner's row.
        let client = Client::new(*account_id, Utc::now());
        let sql = format!("{} ON CONFLICT (user_id) DO NOTHING", insert_sql::<Client>());
        let inserted = bind_record(&client, sqlx::query(&sql))
            .execute(&mut *conn)
            .await?
            .rows_affected();
        if inserted > 0 {
            tracing::info!(account_id = %account_id, client_id = %client.id(), "created missing client");
        }

        client_of(&mut conn, account_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("account", *account_id))
    }

    async fn issue_token(&self, account_id: &Uuid) -> CatalogResult<ApiToken> {
        let mut tx = self.pool.begin().await?;
        if !exists(&mut tx, "account", account_id).await? {
            return Err(CatalogError::not_found("account", *account_id));
        }

        let existing = sqlx::query("SELECT * FROM api_token WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = existing {
            return Ok(token_from_row(&row)?);
        }

        let token = ApiToken::generate(*account_id, Utc::now());
        sqlx::query(
            "INSERT INTO api_token (key, account_id, created) VALUES ($1, $2, $3) \
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(&token.key)
        .bind(token.account_id)
        .bind(token.created)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT * FROM api_token WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(token_from_row(&row)?)
    }

    async fn resolve_token(&self, key: &str) -> CatalogResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT account.* FROM account \
             JOIN api_token ON api_token.account_id = account.id \
             WHERE api_token.key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn revoke_token(&self, key: &str) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM api_token WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl CatalogStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
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
