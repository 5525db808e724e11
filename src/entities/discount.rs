//! Discount: a time-boxed offer, optionally attached to a shop

use crate::core::entity::{AuditedEntity, Editable, Model, cmp_nulls_last};
use crate::core::validation::{
    DESCRIPTION_MAX_LENGTH, FieldChecks, TITLE_MAX_LENGTH, normalize_optional,
    validate_date_order, validate_max_length, validate_required,
};
use crate::impl_audited_entity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

impl_audited_entity!(
    /// An offer, ordered by title, start date, end date
    ///
    /// `shop` is cleared, not cascaded, when the shop is deleted.
    Discount, "discount", "discounts", "discount",
    {
        pub shop: Option<Uuid>,
        pub title: String,
        pub description: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        /// Stored image path
        pub image: Option<String>,
    }
);

fn today() -> Option<NaiveDate> {
    Some(Utc::now().date_naive())
}

/// Writable fields of a [`Discount`]
///
/// Omitted dates default to today; an explicit `null` leaves them unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountDraft {
    #[serde(default)]
    pub shop: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "today")]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "today")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub modified: Option<DateTime<Utc>>,
}

impl DiscountDraft {
    pub fn new(title: impl Into<String>, shop: Option<Uuid>) -> Self {
        Self {
            shop,
            title: title.into(),
            description: None,
            start_date: today(),
            end_date: today(),
            image: None,
            created: None,
            modified: None,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

impl Model for Discount {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then_with(|| cmp_nulls_last(&self.start_date, &other.start_date))
            .then_with(|| cmp_nulls_last(&self.end_date, &other.end_date))
    }

    fn validate_fields(&self, checks: &mut FieldChecks) {
        checks
            .check(validate_required("title", &self.title))
            .check(validate_max_length("title", &self.title, TITLE_MAX_LENGTH))
            .check_some(self.description.as_deref(), |text| {
                validate_max_length("description", text, DESCRIPTION_MAX_LENGTH)
            })
            .check(validate_date_order(self.start_date, self.end_date));
    }
}

impl Editable for Discount {
    type Draft = DiscountDraft;

    fn from_draft(draft: DiscountDraft, now: DateTime<Utc>) -> Self {
        let audit = AuditedEntity::with_timestamps(draft.created, draft.modified, now);
        let mut discount = Self {
            audit,
            shop: None,
            title: String::new(),
            description: None,
            start_date: None,
            end_date: None,
            image: None,
        };
        discount.apply_draft(draft);
        discount
    }

    fn to_draft(&self) -> DiscountDraft {
        DiscountDraft {
            shop: self.shop,
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            image: self.image.clone(),
            created: None,
            modified: None,
        }
    }

    fn apply_draft(&mut self, draft: DiscountDraft) {
        self.shop = draft.shop;
        self.title = draft.title.trim().to_string();
        self.description = normalize_optional(draft.description);
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.image = normalize_optional(draft.image);
        if let Some(created) = draft.created {
            self.audit.created = created;
        }
    }
}
