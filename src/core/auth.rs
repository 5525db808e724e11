//! Authorization for catalog requests
//!
//! The decision itself is the pure [`authorize`] function over a caller
//! [`Role`] and an [`OperationClass`]. [`AuthPolicy`] maps a route's policy
//! onto that decision and turns a denial into the right rejection: 401 for
//! anonymous callers, 403 for authenticated ones.

use crate::core::error::{AuthError, CatalogResult};
use crate::entities::Account;
use crate::storage::CatalogStore;
use async_trait::async_trait;
use axum::http::{HeaderMap, Method, header};
use std::sync::Arc;
use uuid::Uuid;

/// Caller role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Unauthenticated,
    Authenticated,
    /// Superuser
    Privileged,
}

/// Whether an HTTP method can change state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    /// GET, HEAD, OPTIONS
    Safe,
    /// Everything else, including methods the catalog does not know
    Unsafe,
}

impl OperationClass {
    pub fn from_method(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS {
            OperationClass::Safe
        } else {
            OperationClass::Unsafe
        }
    }
}

/// Safe operations need an authenticated caller, unsafe ones a privileged one
pub fn authorize(role: Role, operation: OperationClass) -> bool {
    match operation {
        OperationClass::Safe => role >= Role::Authenticated,
        OperationClass::Unsafe => role >= Role::Privileged,
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// No credentials presented
    Anonymous,

    /// Ordinary account
    User { account_id: Uuid, username: String },

    /// Superuser account
    Admin { account_id: Uuid, username: String },
}

impl AuthContext {
    /// Context for a resolved account
    pub fn for_account(account: &Account) -> Self {
        if account.is_superuser {
            AuthContext::Admin {
                account_id: account.id,
                username: account.username.clone(),
            }
        } else {
            AuthContext::User {
                account_id: account.id,
                username: account.username.clone(),
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            AuthContext::Anonymous => Role::Unauthenticated,
            AuthContext::User { .. } => Role::Authenticated,
            AuthContext::Admin { .. } => Role::Privileged,
        }
    }

    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::User { account_id, .. } | AuthContext::Admin { account_id, .. } => {
                Some(*account_id)
            }
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::User { username, .. } | AuthContext::Admin { username, .. } => {
                Some(username)
            }
        }
    }

    /// The account id, or an unauthenticated error for anonymous callers
    pub fn require_account(&self) -> Result<Uuid, AuthError> {
        self.account_id().ok_or(AuthError::Unauthenticated)
    }
}

/// Authorization policy for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No credentials needed
    Public,

    /// Any logged-in caller, whatever the method
    Authenticated,

    /// Superusers only
    Privileged,

    /// Safe methods for logged-in callers, unsafe methods for superusers
    MethodGated,
}

impl AuthPolicy {
    /// Check `context` against this policy for a request using `method`
    pub fn check(&self, context: &AuthContext, method: &Method) -> Result<(), AuthError> {
        let role = context.role();
        let allowed = match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => role >= Role::Authenticated,
            AuthPolicy::Privileged => role >= Role::Privileged,
            AuthPolicy::MethodGated => authorize(role, OperationClass::from_method(method)),
        };

        if allowed {
            return Ok(());
        }

        if role == Role::Unauthenticated {
            Err(AuthError::Unauthenticated)
        } else {
            tracing::warn!(
                username = context.username().unwrap_or_default(),
                method = %method,
                "permission denied"
            );
            Err(AuthError::Forbidden {
                operation: method.to_string(),
            })
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the caller from request headers
    ///
    /// Missing credentials yield [`AuthContext::Anonymous`]; credentials that
    /// are present but invalid are an error.
    async fn extract_context(&self, headers: &HeaderMap) -> CatalogResult<AuthContext>;
}

/// Token authentication against the store's API tokens
///
/// Accepts `Authorization: Token <key>` and `Authorization: Bearer <key>`.
pub struct TokenAuthProvider {
    store: Arc<dyn CatalogStore>,
}

impl TokenAuthProvider {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

/// Extract the token key from an `Authorization` header value
pub fn parse_token_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !key.is_empty()).then_some(key)
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> CatalogResult<AuthContext> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let key = value
            .to_str()
            .ok()
            .and_then(parse_token_header)
            .ok_or(AuthError::Unauthenticated)?;

        match self.store.accounts().resolve_token(key).await? {
            Some(account) => Ok(AuthContext::for_account(&account)),
            None => {
                tracing::debug!("rejected unknown token");
                Err(AuthError::Unauthenticated.into())
            }
        }
    }
}

/// Treats every request as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> CatalogResult<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}
