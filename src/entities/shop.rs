//! Shop: a seller that can be listed on marketplaces and followed by clients

use crate::core::entity::{AuditedEntity, Editable, Model, cmp_nulls_last};
use crate::core::validation::{
    DESCRIPTION_MAX_LENGTH, FieldChecks, RATING_MAX, RATING_MIN, TITLE_MAX_LENGTH,
    normalize_optional, validate_max_length, validate_range, validate_required,
};
use crate::impl_audited_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

impl_audited_entity!(
    /// A seller, ordered by title then rating
    Shop, "shop", "shops", "shop",
    {
        pub title: String,
        pub description: Option<String>,
        /// Absent, or within `[0.0, 5.0]`
        pub rating: Option<f64>,
    }
);

/// Writable fields of a [`Shop`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub modified: Option<DateTime<Utc>>,
}

impl ShopDraft {
    pub fn new(title: impl Into<String>, description: Option<&str>, rating: Option<f64>) -> Self {
        Self {
            title: title.into(),
            description: description.map(str::to_string),
            rating,
            ..Default::default()
        }
    }
}

impl Model for Shop {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then_with(|| cmp_nulls_last(&self.rating, &other.rating))
    }

    fn validate_fields(&self, checks: &mut FieldChecks) {
        checks
            .check(validate_required("title", &self.title))
            .check(validate_max_length("title", &self.title, TITLE_MAX_LENGTH))
            .check_some(self.description.as_deref(), |text| {
                validate_max_length("description", text, DESCRIPTION_MAX_LENGTH)
            })
            .check_some(self.rating, |rating| {
                validate_range("rating", rating, RATING_MIN, RATING_MAX)
            });
    }
}

impl Editable for Shop {
    type Draft = ShopDraft;

    fn from_draft(draft: ShopDraft, now: DateTime<Utc>) -> Self {
        let audit = AuditedEntity::with_timestamps(draft.created, draft.modified, now);
        let mut shop = Self {
            audit,
            title: String::new(),
            description: None,
            rating: None,
        };
        shop.apply_draft(draft);
        shop
    }

    fn to_draft(&self) -> ShopDraft {
        ShopDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            rating: self.rating,
            created: None,
            modified: None,
        }
    }

    fn apply_draft(&mut self, draft: ShopDraft) {
        self.title = draft.title.trim().to_string();
        self.description = normalize_optional(draft.description);
        self.rating = draft.rating;
        if let Some(created) = draft.created {
            self.audit.created = created;
        }
    }
}
