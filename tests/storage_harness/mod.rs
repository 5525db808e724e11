//! Shared test harness for storage backend testing
//!
//! Provides record factories, account helpers and a REST test application
//! built on any [`CatalogStore`]. The contract suites live in
//! [`store_contract_tests`] and [`rest_tests`] as macros, invoked once per
//! backend.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! catalog_store_tests!(async { InMemoryStore::new() });
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_contract_tests;

#[macro_use]
pub mod rest_tests;

use axum::http::{HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use catalog::core::entity::Editable;
use catalog::entities::{
    Account, Client, Discount, DiscountDraft, Marketplace, MarketplaceDraft, Registration, Shop,
    ShopDraft,
};
use catalog::prelude::*;
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Record factories
// ---------------------------------------------------------------------------

pub fn shop(title: &str, rating: Option<f64>) -> Shop {
    Shop::from_draft(ShopDraft::new(title, Some("A test shop"), rating), Utc::now())
}

pub fn marketplace(title: &str) -> Marketplace {
    Marketplace::from_draft(
        MarketplaceDraft::new(title, Some("https://market.example.com")),
        Utc::now(),
    )
}

pub fn discount(title: &str, shop: Option<Uuid>) -> Discount {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1);
    let end = NaiveDate::from_ymd_opt(2024, 12, 31);
    Discount::from_draft(
        DiscountDraft::new(title, shop).with_dates(start, end),
        Utc::now(),
    )
}

/// Register an account directly through the store, skipping password hashing
pub async fn account(store: &dyn CatalogStore, username: &str) -> (Account, Client) {
    let registration = Registration::new(username, "correct-horse-battery");
    let account = Account::new(&registration, String::new(), Utc::now());
    store
        .accounts()
        .register(account)
        .await
        .expect("account should register")
}

/// A superuser account with its API token key
pub async fn superuser_token(store: &dyn CatalogStore, username: &str) -> String {
    let registration = Registration::new(username, "correct-horse-battery");
    let mut account = Account::new(&registration, String::new(), Utc::now());
    account.is_superuser = true;
    let (account, _) = store
        .accounts()
        .register(account)
        .await
        .expect("superuser should register");
    issue_token(store, &account).await
}

/// An ordinary account with its API token key
pub async fn user_token(store: &dyn CatalogStore, username: &str) -> String {
    let (account, _) = account(store, username).await;
    issue_token(store, &account).await
}

async fn issue_token(store: &dyn CatalogStore, account: &Account) -> String {
    store
        .accounts()
        .issue_token(&account.id)
        .await
        .expect("token should be issued")
        .key
}

// ---------------------------------------------------------------------------
// REST application
// ---------------------------------------------------------------------------

/// A running test server with one superuser and one ordinary user
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<dyn CatalogStore>,
    pub admin: String,
    pub user: String,
}

impl TestApp {
    pub async fn new(store: Arc<dyn CatalogStore>) -> Self {
        let admin = superuser_token(store.as_ref(), "admin").await;
        let user = user_token(store.as_ref(), "jane").await;

        let app = ServerBuilder::new()
            .with_store(store.clone())
            .build()
            .expect("Failed to build app");
        let server = TestServer::try_new(app).expect("Failed to create test server");

        Self {
            server,
            store,
            admin,
            user,
        }
    }
}

/// Attach `Authorization: Token <key>` to a request
pub trait WithToken {
    fn token(self, key: &str) -> Self;
}

impl WithToken for TestRequest {
    fn token(self, key: &str) -> Self {
        let value = HeaderValue::from_str(&format!("Token {}", key))
            .expect("token is a valid header value");
        self.add_header(header::AUTHORIZATION, value)
    }
}
