//! Query parameters and pagination utilities

use crate::core::error::RequestError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?page=N` on the paginated listings
///
/// The raw value is kept as text so a malformed page falls back to the first
/// page instead of rejecting the request.
///
/// # Example
/// ```rust,ignore
/// pub async fn list_shops(Query(params): Query<PageParams>) -> Json<PaginatedResponse<Shop>> {
///     let shops = store.shops().list().await?;
///     Json(PaginatedResponse::paginate(shops, &params, 10))
/// }
///
/// // GET /shops/?page=2
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
        }
    }

    /// Resolve the requested page against the number of pages
    ///
    /// Missing or non-numeric input gives page 1; a number outside
    /// `1..=total_pages` gives the last page.
    pub fn resolve(&self, total_pages: usize) -> usize {
        let last = total_pages.max(1);
        match self.page.as_deref().map(|p| p.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && (n as u64) <= last as u64 => n as usize,
            Some(Ok(_)) => last,
        }
    }
}

/// `?id=<uuid>` on the detail views
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    /// `Ok(None)` when the parameter is absent or blank
    pub fn parse(&self) -> Result<Option<Uuid>, RequestError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_id(raw).map(Some),
        }
    }
}

/// Parse a path or query identifier
pub fn parse_id(raw: &str) -> Result<Uuid, RequestError> {
    Uuid::parse_str(raw).map_err(|_| RequestError::InvalidEntityId {
        id: raw.to_string(),
    })
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// Records of the current page
    pub data: Vec<T>,

    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// Cut one page out of an already ordered listing
    pub fn paginate(items: Vec<T>, params: &PageParams, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total = items.len();
        let page = params.resolve(total.div_ceil(per_page));
        let data = items
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    pub total: usize,

    /// Never zero: an empty listing still has one (empty) page
    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit).max(1);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
