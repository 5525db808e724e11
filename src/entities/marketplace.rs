//! Marketplace: a platform on which shops sell

use crate::core::entity::{AuditedEntity, Editable, Model};
use crate::core::validation::{
    FieldChecks, TITLE_MAX_LENGTH, normalize_optional, validate_max_length, validate_required,
    validate_url,
};
use crate::impl_audited_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

impl_audited_entity!(
    /// A platform on which shops sell, ordered by title
    Marketplace, "marketplace", "marketplaces", "marketplace",
    {
        pub title: String,
        pub url_address: Option<String>,
    }
);

/// Writable fields of a [`Marketplace`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url_address: Option<String>,
    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub modified: Option<DateTime<Utc>>,
}

impl MarketplaceDraft {
    pub fn new(title: impl Into<String>, url_address: Option<&str>) -> Self {
        Self {
            title: title.into(),
            url_address: url_address.map(str::to_string),
            ..Default::default()
        }
    }
}

impl Model for Marketplace {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.title.cmp(&other.title)
    }

    fn validate_fields(&self, checks: &mut FieldChecks) {
        checks
            .check(validate_required("title", &self.title))
            .check(validate_max_length("title", &self.title, TITLE_MAX_LENGTH))
            .check_some(self.url_address.as_deref(), |url| {
                validate_url("url_address", url)
            });
    }
}

impl Editable for Marketplace {
    type Draft = MarketplaceDraft;

    fn from_draft(draft: MarketplaceDraft, now: DateTime<Utc>) -> Self {
        let audit = AuditedEntity::with_timestamps(draft.created, draft.modified, now);
        let mut marketplace = Self {
            audit,
            title: String::new(),
            url_address: None,
        };
        marketplace.apply_draft(draft);
        marketplace
    }

    fn to_draft(&self) -> MarketplaceDraft {
        MarketplaceDraft {
            title: self.title.clone(),
            url_address: self.url_address.clone(),
            created: None,
            modified: None,
        }
    }

    fn apply_draft(&mut self, draft: MarketplaceDraft) {
        self.title = draft.title.trim().to_string();
        self.url_address = normalize_optional(draft.url_address);
        if let Some(created) = draft.created {
            self.audit.created = created;
        }
    }
}
