//! Macro-generated test suite for `CatalogStore` contract validation.
//!
//! The `catalog_store_tests!` macro generates a test module that validates
//! any [`CatalogStore`](catalog::storage::CatalogStore) implementation: record
//! CRUD with validation, the three relations with their delete policies, and
//! the account service.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use catalog::storage::InMemoryStore;
//!
//! catalog_store_tests!(async { InMemoryStore::new() });
//! ```

/// Generate a full `CatalogStore` conformance test suite.
///
/// `$factory` must be a future resolving to an empty store. It is
/// re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! catalog_store_tests {
    ($factory:expr) => {
        mod catalog_store_contract_tests {
            use super::*;
            use catalog::core::error::{EntityError, LinkError};
            use catalog::core::link::LinkSide;
            use catalog::prelude::*;
            use chrono::NaiveDate;

            fn invalid_fields(err: CatalogError) -> Vec<String> {
                match err {
                    CatalogError::Validation(e) => {
                        e.fields().into_iter().map(str::to_string).collect()
                    }
                    other => panic!("expected a validation error, got {:?}", other),
                }
            }

            // ==================================================================
            // Records
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory.await;
                let created = store.shops().create(shop("Corner", Some(4.5))).await.unwrap();

                let fetched = store.shops().get(&created.id()).await.unwrap().unwrap();
                assert_eq!(fetched.title, "Corner");
                assert_eq!(fetched.rating, Some(4.5));
                assert_eq!(fetched.id(), created.id());
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory.await;
                assert!(store.shops().get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_in_canonical_order() {
                let store = $factory.await;
                store.shops().create(shop("Beta", Some(1.0))).await.unwrap();
                store.shops().create(shop("Alpha", None)).await.unwrap();
                store.shops().create(shop("Alpha", Some(3.0))).await.unwrap();

                let shops = store.shops().list().await.unwrap();
                let keys: Vec<(&str, Option<f64>)> =
                    shops.iter().map(|s| (s.title.as_str(), s.rating)).collect();
                assert_eq!(
                    keys,
                    vec![("Alpha", Some(3.0)), ("Alpha", None), ("Beta", Some(1.0))]
                );
                assert_eq!(store.shops().count().await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_invalid_record_is_not_stored() {
                let store = $factory.await;
                let err = store.shops().create(shop("   ", Some(7.5))).await.unwrap_err();
                let fields = invalid_fields(err);
                assert!(fields.contains(&"title".to_string()));
                assert!(fields.contains(&"rating".to_string()));
                assert_eq!(store.shops().count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_discount_requires_existing_shop() {
                let store = $factory.await;
                let err = store
                    .discounts()
                    .create(discount("Ghost", Some(Uuid::new_v4())))
                    .await
                    .unwrap_err();
                assert_eq!(invalid_fields(err), vec!["shop".to_string()]);
                assert_eq!(store.discounts().count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_discount_dates_must_be_ordered() {
                let store = $factory.await;
                let mut bad = discount("Backwards", None);
                bad.start_date = NaiveDate::from_ymd_opt(2024, 6, 1);
                bad.end_date = NaiveDate::from_ymd_opt(2024, 5, 1);

                let err = store.discounts().create(bad).await.unwrap_err();
                assert_eq!(invalid_fields(err), vec!["start_date".to_string()]);
            }

            #[tokio::test]
            async fn test_update_refreshes_modified() {
                let store = $factory.await;
                let created = store.marketplaces().create(marketplace("Bazaar")).await.unwrap();

                let mut changed = created.clone();
                changed.title = "Grand Bazaar".to_string();
                let updated = store.marketplaces().update(changed).await.unwrap();

                assert_eq!(updated.title, "Grand Bazaar");
                assert_eq!(updated.created(), created.created());
                assert!(updated.modified() >= created.modified());
                let fetched = store.marketplaces().get(&created.id()).await.unwrap().unwrap();
                assert_eq!(fetched.title, "Grand Bazaar");
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory.await;
                let err = store.marketplaces().update(marketplace("Nowhere")).await.unwrap_err();
                assert!(matches!(err, CatalogError::Entity(EntityError::NotFound { .. })));
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory.await;
                let err = store.shops().delete(&Uuid::new_v4()).await.unwrap_err();
                assert!(matches!(err, CatalogError::Entity(EntityError::NotFound { .. })));
            }

            #[tokio::test]
            async fn test_get_many_skips_unknown_ids() {
                let store = $factory.await;
                let b = store.shops().create(shop("B", None)).await.unwrap();
                let a = store.shops().create(shop("A", None)).await.unwrap();

                let found = store
                    .shops()
                    .get_many(&[b.id(), Uuid::new_v4(), a.id()])
                    .await
                    .unwrap();
                let titles: Vec<&str> = found.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles, vec!["A", "B"]);
            }

            // ==================================================================
            // Relations
            // ==================================================================

            #[tokio::test]
            async fn test_link_is_unique_per_pair() {
                let store = $factory.await;
                let s = store.shops().create(shop("S", None)).await.unwrap();
                let m = store.marketplaces().create(marketplace("M")).await.unwrap();

                let link = store.shop_marketplaces().link(&s.id(), &m.id()).await.unwrap();
                assert_eq!(link.shop, Some(s.id()));
                assert_eq!(link.marketplace, Some(m.id()));

                let err = store.shop_marketplaces().link(&s.id(), &m.id()).await.unwrap_err();
                assert!(matches!(err, CatalogError::Link(LinkError::AlreadyExists { .. })));
                assert_eq!(store.shop_marketplaces().list().await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_link_requires_both_endpoints() {
                let store = $factory.await;
                let s = store.shops().create(shop("S", None)).await.unwrap();

                let err = store
                    .shop_marketplaces()
                    .link(&s.id(), &Uuid::new_v4())
                    .await
                    .unwrap_err();
                assert!(matches!(err, CatalogError::Entity(EntityError::NotFound { .. })));
            }

            #[tokio::test]
            async fn test_unlink_reports_whether_a_pair_existed() {
                let store = $factory.await;
                let s = store.shops().create(shop("S", None)).await.unwrap();
                let m = store.marketplaces().create(marketplace("M")).await.unwrap();
                store.shop_marketplaces().link(&s.id(), &m.id()).await.unwrap();

                assert!(store.shop_marketplaces().unlink(&s.id(), &m.id()).await.unwrap());
                assert!(!store.shop_marketplaces().unlink(&s.id(), &m.id()).await.unwrap());
                assert!(store.shop_marketplaces().find(&s.id(), &m.id()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_deleting_shop_clears_marketplace_links_and_discounts() {
                let store = $factory.await;
                let s = store.shops().create(shop("S", None)).await.unwrap();
                let m = store.marketplaces().create(marketplace("M")).await.unwrap();
                let d = store.discounts().create(discount("D", Some(s.id()))).await.unwrap();
                store.shop_marketplaces().link(&s.id(), &m.id()).await.unwrap();

                store.shops().delete(&s.id()).await.unwrap();

                let links = store
                    .shop_marketplaces()
                    .find_by(LinkSide::Right, &m.id())
                    .await
                    .unwrap();
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].shop, None);
                assert_eq!(links[0].marketplace, Some(m.id()));

                let orphan = store.discounts().get(&d.id()).await.unwrap().unwrap();
                assert_eq!(orphan.shop, None);
            }

            #[tokio::test]
            async fn test_deleting_marketplace_clears_shop_links() {
                let store = $factory.await;
                let s = store.shops().create(shop("S", None)).await.unwrap();
                let m = store.marketplaces().create(marketplace("M")).await.unwrap();
                store.shop_marketplaces().link(&s.id(), &m.id()).await.unwrap();

                store.marketplaces().delete(&m.id()).await.unwrap();

                let links = store
                    .shop_marketplaces()
                    .find_by(LinkSide::Left, &s.id())
                    .await
                    .unwrap();
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].marketplace, None);
            }

            #[tokio::test]
            async fn test_deleting_shop_cascades_followers() {
                let store = $factory.await;
                let (_, client) = account(&store, "follower").await;
                let s = store.shops().create(shop("S", None)).await.unwrap();
                store.shop_clients().link(&s.id(), &client.id()).await.unwrap();

                store.shops().delete(&s.id()).await.unwrap();

                assert!(store.shop_clients().list().await.unwrap().is_empty());
                assert!(store.clients().get(&client.id()).await.unwrap().is_some());
            }

            #[tokio::test]
            async fn test_deleting_discount_cascades_favorites() {
                let store = $factory.await;
                let (_, client) = account(&store, "saver").await;
                let d = store.discounts().create(discount("D", None)).await.unwrap();
                store.favorites().link(&client.id(), &d.id()).await.unwrap();

                store.discounts().delete(&d.id()).await.unwrap();

                let left = store
                    .favorites()
                    .find_by(LinkSide::Left, &client.id())
                    .await
                    .unwrap();
                assert!(left.is_empty());
            }

            // ==================================================================
            // Accounts
            // ==================================================================

            #[tokio::test]
            async fn test_register_creates_client() {
                let store = $factory.await;
                let (account, client) = account(&store, "newcomer").await;

                assert_eq!(client.user, account.id);
                assert_eq!(client.money, Decimal::ZERO);
                let found = store.accounts().client_for(&account.id).await.unwrap().unwrap();
                assert_eq!(found.id(), client.id());
                let by_name = store.accounts().find_by_username("newcomer").await.unwrap();
                assert_eq!(by_name.map(|a| a.id), Some(account.id));
            }

            #[tokio::test]
            async fn test_register_rejects_taken_username() {
                let store = $factory.await;
                account(&store, "taken").await;

                let registration = Registration::new("taken", "another-pass-1");
                let duplicate = Account::new(&registration, String::new(), Utc::now());
                let err = store.accounts().register(duplicate).await.unwrap_err();
                assert_eq!(invalid_fields(err), vec!["username".to_string()]);
            }

            #[tokio::test]
            async fn test_one_client_per_account() {
                let store = $factory.await;
                let (account, _) = account(&store, "single").await;

                let err = store
                    .clients()
                    .create(Client::new(account.id, Utc::now()))
                    .await
                    .unwrap_err();
                assert_eq!(invalid_fields(err), vec!["user".to_string()]);
            }

            #[tokio::test]
            async fn test_ensure_client_recreates_missing_client() {
                let store = $factory.await;
                let (account, client) = account(&store, "lapsed").await;
                store.clients().delete(&client.id()).await.unwrap();
                assert!(store.accounts().client_for(&account.id).await.unwrap().is_none());

                let restored = store.accounts().ensure_client(&account.id).await.unwrap();
                assert_eq!(restored.user, account.id);
                let again = store.accounts().ensure_client(&account.id).await.unwrap();
                assert_eq!(again.id(), restored.id());
            }

            #[tokio::test]
            async fn test_concurrent_ensure_client_creates_one_client() {
                let store = $factory.await;
                let (account, client) = account(&store, "racer").await;
                store.clients().delete(&client.id()).await.unwrap();

                let (first, second) = tokio::join!(
                    store.accounts().ensure_client(&account.id),
                    store.accounts().ensure_client(&account.id),
                );
                let (first, second) = (first.unwrap(), second.unwrap());
                assert_eq!(first.id(), second.id());
                assert_eq!(store.clients().count().await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_concurrent_logins_share_one_token() {
                let store = $factory.await;
                let (account, _) = account(&store, "twice").await;

                let (first, second) = tokio::join!(
                    store.accounts().issue_token(&account.id),
                    store.accounts().issue_token(&account.id),
                );
                assert_eq!(first.unwrap().key, second.unwrap().key);
            }

            #[tokio::test]
            async fn test_token_lifecycle() {
                let store = $factory.await;
                let (account, _) = account(&store, "holder").await;

                let token = store.accounts().issue_token(&account.id).await.unwrap();
                assert_eq!(token.key.len(), 40);
                let same = store.accounts().issue_token(&account.id).await.unwrap();
                assert_eq!(same.key, token.key);

                let resolved = store.accounts().resolve_token(&token.key).await.unwrap();
                assert_eq!(resolved.map(|a| a.id), Some(account.id));

                assert!(store.accounts().revoke_token(&token.key).await.unwrap());
                assert!(!store.accounts().revoke_token(&token.key).await.unwrap());
                assert!(store.accounts().resolve_token(&token.key).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_account_removes_client_and_tokens() {
                let store = $factory.await;
                let (account, client) = account(&store, "leaver").await;
                let token = store.accounts().issue_token(&account.id).await.unwrap();
                let d = store.discounts().create(discount("D", None)).await.unwrap();
                store.favorites().link(&client.id(), &d.id()).await.unwrap();

                store.accounts().delete_account(&account.id).await.unwrap();

                assert!(store.accounts().get_account(&account.id).await.unwrap().is_none());
                assert!(store.clients().get(&client.id()).await.unwrap().is_none());
                assert!(store.accounts().resolve_token(&token.key).await.unwrap().is_none());
                assert!(store.favorites().list().await.unwrap().is_empty());
            }
        }
    };
}
