//! Account registration, login and superuser bootstrap
//!
//! Passwords are hashed with Argon2 (PHC string format). Storage of accounts,
//! clients and tokens goes through the store's
//! [`AccountService`](crate::core::service::AccountService).

use crate::config::SuperuserConfig;
use crate::core::error::{AuthError, CatalogError, CatalogResult};
use crate::entities::{Account, ApiToken, ClientProfile, Registration};
use crate::storage::CatalogStore;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use uuid::Uuid;

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Create an account and its client from a sign-up form
///
/// Form errors and a taken username come back as one validation error.
pub async fn register(
    store: &dyn CatalogStore,
    registration: Registration,
) -> CatalogResult<ClientProfile> {
    registration.validate()?;

    let password_hash = hash_password(&registration.password1)?;
    let account = Account::new(&registration, password_hash, Utc::now());
    let (account, client) = store.accounts().register(account).await?;

    Ok(ClientProfile::new(client, &account))
}

/// Check a username and password
pub async fn authenticate(
    store: &dyn CatalogStore,
    username: &str,
    password: &str,
) -> CatalogResult<Account> {
    let account = store
        .accounts()
        .find_by_username(username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if let Err(e) = verify_password(password, &account.password_hash) {
        tracing::warn!(username = %account.username, "failed login");
        return Err(e.into());
    }

    Ok(account)
}

/// Authenticate and hand out the account's API token
pub async fn login(
    store: &dyn CatalogStore,
    username: &str,
    password: &str,
) -> CatalogResult<ApiToken> {
    let account = authenticate(store, username, password).await?;
    let token = store.accounts().issue_token(&account.id).await?;
    tracing::info!(username = %account.username, "logged in");
    Ok(token)
}

/// Profile of an account, creating its client when missing
pub async fn profile(store: &dyn CatalogStore, account_id: &Uuid) -> CatalogResult<ClientProfile> {
    let account = store
        .accounts()
        .get_account(account_id)
        .await?
        .ok_or_else(|| CatalogError::not_found("account", *account_id))?;
    let client = store.accounts().ensure_client(account_id).await?;
    Ok(ClientProfile::new(client, &account))
}

/// Make sure the configured superuser exists
///
/// An existing account with that username is left untouched.
pub async fn ensure_superuser(
    store: &dyn CatalogStore,
    superuser: &SuperuserConfig,
) -> CatalogResult<Account> {
    if let Some(existing) = store.accounts().find_by_username(&superuser.username).await? {
        if !existing.is_superuser {
            tracing::warn!(
                username = %existing.username,
                "bootstrap account exists without superuser rights"
            );
        }
        return Ok(existing);
    }

    let mut registration = Registration::new(&superuser.username, &superuser.password);
    registration.email = superuser.email.clone();
    registration.validate()?;

    let mut account = Account::new(&registration, hash_password(&superuser.password)?, Utc::now());
    account.is_superuser = true;
    let (account, _) = store.accounts().register(account).await?;

    tracing::info!(username = %account.username, "created superuser");
    Ok(account)
}
