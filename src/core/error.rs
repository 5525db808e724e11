//! Typed error handling for the catalog service
//!
//! Every fallible operation in the crate returns [`CatalogResult`]. Errors are
//! grouped by category so callers can match on them instead of parsing
//! messages, and each category knows its HTTP status and a stable error code.
//!
//! # Error Categories
//!
//! - [`EntityError`]: lookups and CRUD on catalog records
//! - [`LinkError`]: many-to-many association operations
//! - [`ValidationError`]: rejected writes with field-level detail
//! - [`AuthError`]: authentication and authorization failures
//! - [`RequestError`]: malformed HTTP input
//! - [`StorageError`]: backend failures
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! match store.shops().get(&id).await {
//!     Ok(Some(shop)) => println!("Found: {}", shop.title),
//!     Ok(None) => println!("No shop {}", id),
//!     Err(CatalogError::Storage(e)) => eprintln!("backend failure: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Entity(e) => e.status_code(),
            CatalogError::Link(e) => e.status_code(),
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Auth(e) => e.status_code(),
            CatalogError::Request(e) => e.status_code(),
            CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Entity(e) => e.error_code(),
            CatalogError::Link(e) => e.error_code(),
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::Auth(e) => e.error_code(),
            CatalogError::Request(e) => e.error_code(),
            CatalogError::Storage(_) => "STORAGE_ERROR",
            CatalogError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            CatalogError::Link(LinkError::AlreadyExists {
                link_type,
                left_id,
                right_id,
            }) => Some(serde_json::json!({
                "link_type": link_type,
                "left_id": left_id.to_string(),
                "right_id": right_id.to_string()
            })),
            CatalogError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            CatalogError::Validation(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({
                    "fields": [FieldValidationError::new(field.clone(), message.clone())]
                }))
            }
            _ => None,
        }
    }

    /// Shorthand for a missing record
    pub fn not_found(entity_type: &str, id: Uuid) -> Self {
        CatalogError::Entity(EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        })
    }

    /// Shorthand for a single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Validation(ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        if matches!(self, CatalogError::Auth(AuthError::Unauthenticated)) {
            return (status, [(header::WWW_AUTHENTICATE, "Token")], body).into_response();
        }
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to catalog records
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    #[error("{entity_type} with id '{id}' already exists")]
    AlreadyExists { entity_type: String, id: Uuid },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

// =============================================================================
// Link Errors
// =============================================================================

/// Errors related to association records
#[derive(Debug, Error)]
pub enum LinkError {
    /// The pair is already associated
    #[error("Link '{link_type}' between '{left_id}' and '{right_id}' already exists")]
    AlreadyExists {
        link_type: String,
        left_id: Uuid,
        right_id: Uuid,
    },

    #[error("Link '{link_type}' between '{left_id}' and '{right_id}' not found")]
    NotFound {
        link_type: String,
        left_id: Uuid,
        right_id: Uuid,
    },
}

impl LinkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkError::AlreadyExists { .. } => StatusCode::CONFLICT,
            LinkError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LinkError::AlreadyExists { .. } => "DUPLICATE_LINK",
            LinkError::NotFound { .. } => "LINK_NOT_FOUND",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Field names carried by this error, in report order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldError { field, .. } => vec![field.as_str()],
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            ValidationError::InvalidJson { .. } => Vec::new(),
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Authentication and authorization failures
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    /// No credentials, or credentials that do not resolve to an account
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Authenticated, but the role does not permit the operation
    #[error("You do not have permission to perform this action: {operation}")]
    Forbidden { operation: String },

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("Failed to hash password")]
    PasswordHash,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHORIZED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::PasswordHash => "PASSWORD_HASH_ERROR",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors caused by malformed HTTP input
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid entity ID format: '{id}'")]
    InvalidEntityId { id: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Missing required parameter: {parameter}")]
    MissingParameter { parameter: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingParameter { .. } => "MISSING_PARAMETER",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    #[error("Failed to acquire {kind} lock: {message}")]
    LockPoisoned { kind: &'static str, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", describe_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

fn describe_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|path| format!(" file '{}'", path))
        .unwrap_or_default()
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Storage(StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
