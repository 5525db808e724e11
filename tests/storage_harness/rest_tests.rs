//! Macro-generated HTTP tests run against a [`TestApp`](super::TestApp)
//!
//! Everything goes through the real router, so permissions, status codes
//! and error bodies are checked exactly as a client would see them.

/// Generate the REST integration suite for one backend.
///
/// `$factory` must be a future resolving to an empty
/// `Arc<dyn CatalogStore>`, re-evaluated for each test.
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::{Method, StatusCode, header};
            use catalog::prelude::*;
            use serde_json::{Value, json};

            async fn app() -> TestApp {
                TestApp::new($factory.await).await
            }

            fn error_code(body: &Value) -> &str {
                body["code"].as_str().unwrap_or_default()
            }

            // ==================================================================
            // Pages
            // ==================================================================

            #[tokio::test]
            async fn test_health_is_public() {
                let app = app().await;
                let response = app.server.get("/health").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["status"], "ok");
                assert_eq!(body["storage"], app.store.backend());
            }

            #[tokio::test]
            async fn test_home_counts() {
                let app = app().await;
                let s = app.store.shops().create(shop("S", None)).await.unwrap();
                app.store.discounts().create(discount("D", Some(s.id()))).await.unwrap();

                let body: Value = app.server.get("/").await.json();
                assert_eq!(body["shops"], 1);
                assert_eq!(body["marketplaces"], 0);
                assert_eq!(body["discounts"], 1);
            }

            #[tokio::test]
            async fn test_list_page_requires_login() {
                let app = app().await;
                let response = app.server.get("/shops").await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(response.header(header::WWW_AUTHENTICATE), "Token");
            }

            #[tokio::test]
            async fn test_list_page_clamps_page_number() {
                let app = app().await;
                for i in 0..12 {
                    let title = format!("Shop {:02}", i);
                    app.store.shops().create(shop(&title, None)).await.unwrap();
                }

                let first: Value = app.server.get("/shops/").token(&app.user).await.json();
                assert_eq!(first["data"].as_array().unwrap().len(), 10);
                assert_eq!(first["data"][0]["title"], "Shop 00");
                assert_eq!(first["pagination"]["total"], 12);
                assert_eq!(first["pagination"]["total_pages"], 2);
                assert_eq!(first["pagination"]["has_next"], true);

                let beyond: Value = app
                    .server
                    .get("/shops/")
                    .add_query_param("page", 99)
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(beyond["pagination"]["page"], 2);
                assert_eq!(beyond["data"].as_array().unwrap().len(), 2);

                let garbage: Value = app
                    .server
                    .get("/shops/")
                    .add_query_param("page", "abc")
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(garbage["pagination"]["page"], 1);
            }

            #[tokio::test]
            async fn test_detail_view_is_public() {
                let app = app().await;
                let m = app.store.marketplaces().create(marketplace("Bazaar")).await.unwrap();

                let body: Value = app
                    .server
                    .get("/marketplace/")
                    .add_query_param("id", m.id())
                    .await
                    .json();
                assert_eq!(body["marketplace"]["title"], "Bazaar");

                let empty: Value = app.server.get("/marketplace/").await.json();
                assert!(empty["marketplace"].is_null());

                let missing = app
                    .server
                    .get("/marketplace/")
                    .add_query_param("id", Uuid::new_v4())
                    .await;
                missing.assert_status(StatusCode::NOT_FOUND);
            }

            // ==================================================================
            // REST collections
            // ==================================================================

            #[tokio::test]
            async fn test_superuser_full_lifecycle() {
                let app = app().await;

                let created = app
                    .server
                    .post("/api/shops/")
                    .token(&app.admin)
                    .json(&json!({ "title": "ABC", "description": "ABC", "rating": 4.5 }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let created: Value = created.json();
                let id = created["id"].as_str().unwrap().to_string();
                let path = format!("/api/shops/{}/", id);

                let replaced = app
                    .server
                    .put(&path)
                    .token(&app.admin)
                    .json(&json!({ "title": "XYZ", "rating": 2.0 }))
                    .await;
                replaced.assert_status_ok();
                let replaced: Value = replaced.json();
                assert_eq!(replaced["title"], "XYZ");
                assert!(replaced["description"].is_null());
                assert_eq!(replaced["created"], created["created"]);

                let patched = app
                    .server
                    .patch(&path)
                    .token(&app.admin)
                    .json(&json!({ "description": "Patched" }))
                    .await;
                patched.assert_status_ok();
                let patched: Value = patched.json();
                assert_eq!(patched["title"], "XYZ");
                assert_eq!(patched["description"], "Patched");

                app.server
                    .delete(&path)
                    .token(&app.admin)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let gone = app.server.get(&path).token(&app.admin).await;
                gone.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(error_code(&gone.json()), "ENTITY_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_user_can_read_but_not_write() {
                let app = app().await;
                let s = app.store.shops().create(shop("S", Some(3.0))).await.unwrap();
                let path = format!("/api/shops/{}", s.id());

                app.server.get("/api/shops").token(&app.user).await.assert_status_ok();
                app.server.get(&path).token(&app.user).await.assert_status_ok();
                app.server
                    .method(Method::HEAD, &path)
                    .token(&app.user)
                    .await
                    .assert_status_ok();

                let denied = app
                    .server
                    .post("/api/shops")
                    .token(&app.user)
                    .json(&json!({ "title": "Nope" }))
                    .await;
                denied.assert_status(StatusCode::FORBIDDEN);
                assert_eq!(error_code(&denied.json()), "FORBIDDEN");

                app.server
                    .delete(&path)
                    .token(&app.user)
                    .await
                    .assert_status(StatusCode::FORBIDDEN);
                assert_eq!(app.store.shops().count().await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_anonymous_gets_unauthorized() {
                let app = app().await;
                let response = app.server.get("/api/discounts/").await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(response.header(header::WWW_AUTHENTICATE), "Token");
                assert_eq!(error_code(&response.json()), "UNAUTHORIZED");

                app.server
                    .post("/api/discounts/")
                    .json(&json!({ "title": "Free" }))
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_unknown_token_is_rejected() {
                let app = app().await;
                app.server
                    .get("/api/shops/")
                    .token("0000000000000000000000000000000000000000")
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_permission_checked_before_body() {
                let app = app().await;
                app.server
                    .post("/api/shops/")
                    .token(&app.user)
                    .text("not json")
                    .await
                    .assert_status(StatusCode::FORBIDDEN);
            }

            #[tokio::test]
            async fn test_validation_errors_name_fields() {
                let app = app().await;
                let response = app
                    .server
                    .post("/api/shops/")
                    .token(&app.admin)
                    .json(&json!({ "title": "", "rating": 9.0 }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(error_code(&body), "VALIDATION_ERROR");
                let fields: Vec<&str> = body["details"]["fields"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .filter_map(|f| f["field"].as_str())
                    .collect();
                assert_eq!(fields, vec!["title", "rating"]);
                assert_eq!(app.store.shops().count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_put_replaces_every_field() {
                let app = app().await;
                let s = app.store.shops().create(shop("ABC", Some(4.5))).await.unwrap();
                let path = format!("/api/shops/{}/", s.id());

                let response = app
                    .server
                    .put(&path)
                    .token(&app.admin)
                    .json(&json!({ "description": "No title given" }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["details"]["fields"][0]["field"], "title");

                let stored = app.store.shops().get(&s.id()).await.unwrap().unwrap();
                assert_eq!(stored.title, "ABC");
                assert_eq!(stored.rating, Some(4.5));
            }

            #[tokio::test]
            async fn test_discount_with_unknown_shop_rejected() {
                let app = app().await;
                let response = app
                    .server
                    .post("/api/discounts/")
                    .token(&app.admin)
                    .json(&json!({ "title": "Sale", "shop": Uuid::new_v4() }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["details"]["fields"][0]["field"], "shop");
            }

            #[tokio::test]
            async fn test_invalid_id_in_path() {
                let app = app().await;
                let response = app.server.get("/api/shops/not-a-uuid/").token(&app.user).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(error_code(&response.json()), "INVALID_ENTITY_ID");
            }

            #[tokio::test]
            async fn test_options_lists_allowed_methods() {
                let app = app().await;
                let response = app
                    .server
                    .method(Method::OPTIONS, "/api/marketplaces/")
                    .token(&app.user)
                    .await;
                response.assert_status_ok();
                assert_eq!(response.header(header::ALLOW), "GET, POST, HEAD, OPTIONS");
                let body: Value = response.json();
                assert_eq!(body["name"], "marketplace list");
            }

            // ==================================================================
            // Relations
            // ==================================================================

            #[tokio::test]
            async fn test_link_and_unlink_shop_marketplace() {
                let app = app().await;
                let s = app.store.shops().create(shop("S", None)).await.unwrap();
                let m = app.store.marketplaces().create(marketplace("M")).await.unwrap();
                let path = format!("/api/shops/{}/marketplaces/{}", s.id(), m.id());

                app.server
                    .post(&path)
                    .token(&app.user)
                    .await
                    .assert_status(StatusCode::FORBIDDEN);

                let linked = app.server.post(&path).token(&app.admin).await;
                linked.assert_status(StatusCode::CREATED);
                let linked: Value = linked.json();
                assert_eq!(linked["shop"], s.id().to_string());

                let duplicate = app.server.post(&path).token(&app.admin).await;
                duplicate.assert_status(StatusCode::CONFLICT);
                assert_eq!(error_code(&duplicate.json()), "DUPLICATE_LINK");

                let markets: Value = app
                    .server
                    .get(&format!("/api/shops/{}/marketplaces", s.id()))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(markets["count"], 1);
                assert_eq!(markets["data"][0]["title"], "M");
                assert_eq!(markets["link_type"], "shop_to_marketplace");

                let shops: Value = app
                    .server
                    .get(&format!("/api/marketplaces/{}/shops", m.id()))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(shops["data"][0]["title"], "S");

                app.server
                    .delete(&path)
                    .token(&app.admin)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let again = app.server.delete(&path).token(&app.admin).await;
                again.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(error_code(&again.json()), "LINK_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_shop_discounts() {
                let app = app().await;
                let s = app.store.shops().create(shop("S", None)).await.unwrap();
                app.store.discounts().create(discount("B", Some(s.id()))).await.unwrap();
                app.store.discounts().create(discount("A", Some(s.id()))).await.unwrap();
                app.store.discounts().create(discount("Other", None)).await.unwrap();

                let body: Value = app
                    .server
                    .get(&format!("/api/shops/{}/discounts/", s.id()))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(body["count"], 2);
                assert_eq!(body["data"][0]["title"], "A");
                assert_eq!(body["data"][1]["title"], "B");
            }

            // ==================================================================
            // Favorites
            // ==================================================================

            #[tokio::test]
            async fn test_favorite_round_trip() {
                let app = app().await;
                let d = app.store.discounts().create(discount("Half off", None)).await.unwrap();
                let id = d.id().to_string();

                let added: Value = app
                    .server
                    .get("/add/")
                    .add_query_param("id", &id)
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(added["status"], "added");

                let again: Value = app
                    .server
                    .post("/add/")
                    .add_query_param("id", &id)
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(again["status"], "already_present");

                let favorites: Value = app.server.get("/favorites/").token(&app.user).await.json();
                assert_eq!(favorites["count"], 1);
                assert_eq!(favorites["data"][0]["title"], "Half off");

                let view: Value = app
                    .server
                    .get(&format!("/discount/{}/", id))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(view["is_favorite"], true);
                let other: Value = app
                    .server
                    .get(&format!("/discount/{}/", id))
                    .token(&app.admin)
                    .await
                    .json();
                assert_eq!(other["is_favorite"], false);

                let removed: Value = app
                    .server
                    .get(&format!("/remove/{}/", id))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(removed["status"], "removed");
                let absent: Value = app
                    .server
                    .get(&format!("/remove/{}/", id))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(absent["status"], "not_present");
            }

            #[tokio::test]
            async fn test_add_favorite_needs_id() {
                let app = app().await;
                let response = app.server.get("/add/").token(&app.user).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(error_code(&response.json()), "MISSING_PARAMETER");
            }

            #[tokio::test]
            async fn test_discount_view_requires_login() {
                let app = app().await;
                let d = app.store.discounts().create(discount("Half off", None)).await.unwrap();
                let response = app.server.get(&format!("/discount/{}/", d.id())).await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(error_code(&response.json()), "UNAUTHORIZED");
            }

            #[tokio::test]
            async fn test_remove_favorite_of_unknown_discount() {
                let app = app().await;
                let response = app
                    .server
                    .get(&format!("/remove/{}/", Uuid::new_v4()))
                    .token(&app.user)
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(error_code(&response.json()), "ENTITY_NOT_FOUND");

                let d = app.store.discounts().create(discount("Half off", None)).await.unwrap();
                let absent: Value = app
                    .server
                    .get(&format!("/remove/{}/", d.id()))
                    .token(&app.user)
                    .await
                    .json();
                assert_eq!(absent["status"], "not_present");
                assert_eq!(absent["message"], "This discount is not in your favorites.");
            }

            #[tokio::test]
            async fn test_favorites_require_login() {
                let app = app().await;
                app.server
                    .get("/favorites/")
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            // ==================================================================
            // Profile
            // ==================================================================

            #[tokio::test]
            async fn test_profile_photo_update() {
                let app = app().await;
                let profile: Value = app.server.get("/profile/").token(&app.user).await.json();
                assert_eq!(profile["username"], "jane");
                assert!(profile["photo"].is_null());

                let updated = app
                    .server
                    .post("/profile/")
                    .token(&app.user)
                    .json(&json!({ "photo": "photos/jane.png" }))
                    .await;
                updated.assert_status_ok();
                let updated: Value = updated.json();
                assert_eq!(updated["photo"], "photos/jane.png");
            }

            #[tokio::test]
            async fn test_follow_and_unfollow_shop() {
                let app = app().await;
                let s = app.store.shops().create(shop("Followed", None)).await.unwrap();

                app.server
                    .post("/my-shops/")
                    .token(&app.user)
                    .json(&json!({ "shop": s.id() }))
                    .await
                    .assert_status(StatusCode::CREATED);
                app.server
                    .post("/my-shops/")
                    .token(&app.user)
                    .json(&json!({ "shop": s.id() }))
                    .await
                    .assert_status(StatusCode::CONFLICT);

                let shops: Value = app.server.get("/my-shops/").token(&app.user).await.json();
                assert_eq!(shops[0]["title"], "Followed");

                let path = format!("/my-shops/{}/", s.id());
                app.server
                    .delete(&path)
                    .token(&app.user)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let again = app.server.delete(&path).token(&app.user).await;
                again.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(error_code(&again.json()), "LINK_NOT_FOUND");
            }

            // ==================================================================
            // Accounts
            // ==================================================================

            #[tokio::test]
            async fn test_register_login_logout() {
                let app = app().await;
                let registration =
                    Registration::new("newbie", "s3cret-pass").with_names("New", "Bie");

                let created = app.server.post("/register/").json(&registration).await;
                created.assert_status(StatusCode::CREATED);
                let profile: Value = created.json();
                assert_eq!(profile["username"], "newbie");
                assert_eq!(profile["display"], "newbie (New Bie)");

                let login = app
                    .server
                    .post("/accounts/login/")
                    .json(&json!({ "username": "newbie", "password": "s3cret-pass" }))
                    .await;
                login.assert_status_ok();
                let login: Value = login.json();
                let token = login["token"].as_str().unwrap().to_string();

                app.server.get("/profile/").token(&token).await.assert_status_ok();
                app.server
                    .post("/accounts/logout/")
                    .token(&token)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                app.server
                    .get("/profile/")
                    .token(&token)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_login_with_wrong_password() {
                let app = app().await;
                let registration = Registration::new("careful", "s3cret-pass");
                app.server
                    .post("/register/")
                    .json(&registration)
                    .await
                    .assert_status(StatusCode::CREATED);

                let response = app
                    .server
                    .post("/accounts/login/")
                    .json(&json!({ "username": "careful", "password": "wrong-pass" }))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(error_code(&response.json()), "INVALID_CREDENTIALS");
            }

            #[tokio::test]
            async fn test_register_rejects_taken_username_and_mismatch() {
                let app = app().await;
                let taken = app
                    .server
                    .post("/register/")
                    .json(&Registration::new("jane", "s3cret-pass"))
                    .await;
                taken.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = taken.json();
                assert_eq!(body["details"]["fields"][0]["field"], "username");

                let mut mismatch = Registration::new("other", "s3cret-pass");
                mismatch.password2 = "different".to_string();
                let response = app.server.post("/register/").json(&mismatch).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["details"]["fields"][0]["field"], "password2");
            }
        }
    };
}
