//! Entity traits defining the core abstraction for all catalog records

use crate::core::error::{CatalogResult, RequestError, ValidationError};
use crate::core::validation::{FieldChecks, validate_not_future};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Debug;
use uuid::Uuid;

/// Identity and audit timestamps shared by every catalog record
///
/// Concrete entities embed this struct (flattened on the wire) instead of
/// repeating the three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditedEntity {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl AuditedEntity {
    /// Fresh identity stamped at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: now,
            modified: now,
        }
    }

    /// Fresh identity keeping caller-supplied timestamps when present
    pub fn with_timestamps(
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: created.unwrap_or(now),
            modified: modified.unwrap_or(now),
        }
    }

    /// Refresh `modified` after a mutation
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified = now;
    }

    /// Neither timestamp may lie in the future
    pub fn check(&self, checks: &mut FieldChecks, now: DateTime<Utc>) {
        checks
            .check(validate_not_future("created", self.created, now))
            .check(validate_not_future("modified", self.modified, now));
    }
}

/// Base trait for all catalog records
///
/// Usually implemented through [`impl_audited_entity!`](crate::impl_audited_entity).
pub trait Entity: Clone + Debug + Serialize + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "shops")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "shop")
    fn resource_name_singular() -> &'static str;

    /// Table name inside the `online` schema
    fn table_name() -> &'static str;

    fn audit(&self) -> &AuditedEntity;

    fn audit_mut(&mut self) -> &mut AuditedEntity;

    fn id(&self) -> Uuid {
        self.audit().id
    }

    fn created(&self) -> DateTime<Utc> {
        self.audit().created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.audit().modified
    }
}

/// Domain behaviour on top of [`Entity`]: ordering and invariants
pub trait Model: Entity {
    /// Canonical listing order
    fn canonical_cmp(&self, other: &Self) -> Ordering;

    /// Field-level invariants, excluding the audit timestamps
    fn validate_fields(&self, checks: &mut FieldChecks);

    /// Every invariant of the record, evaluated against `now`
    fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        self.audit().check(&mut checks, now);
        self.validate_fields(&mut checks);
        checks.finish()
    }

    /// Sort a slice in canonical order, id as the final tiebreak
    fn sort_canonical(records: &mut [Self]) {
        records.sort_by(|a, b| a.canonical_cmp(b).then_with(|| a.id().cmp(&b.id())));
    }
}

/// Records writable through the REST collections
///
/// `Draft` is the client-facing body for POST and PUT. PATCH merges a partial
/// JSON object over the current draft, so it needs no separate type.
pub trait Editable: Model {
    type Draft: Serialize + DeserializeOwned + Send + 'static;

    /// Build a new record, stamping identity at `now`
    fn from_draft(draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Current writable state of the record
    fn to_draft(&self) -> Self::Draft;

    /// Replace every writable field, keeping identity
    fn apply_draft(&mut self, draft: Self::Draft);

    /// A copy of `self` with the keys of `patch` overlaid
    fn patched(&self, patch: serde_json::Value) -> CatalogResult<Self> {
        let serde_json::Value::Object(changes) = patch else {
            return Err(RequestError::InvalidBody {
                message: "expected a JSON object".to_string(),
            }
            .into());
        };

        let mut current = serde_json::to_value(self.to_draft())?;
        if let Some(fields) = current.as_object_mut() {
            for (key, value) in changes {
                fields.insert(key, value);
            }
        }

        let draft: Self::Draft = serde_json::from_value(current)?;
        let mut next = self.clone();
        next.apply_draft(draft);
        Ok(next)
    }
}

/// Compare optional keys with `None` after every present value
pub fn cmp_nulls_last<T: PartialOrd>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
