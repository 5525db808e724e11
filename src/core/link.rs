//! Association records between two entity kinds
//!
//! Every many-to-many relation is an explicit join record implementing
//! [`Link`]. The trait names both endpoint types, so the relationship
//! manager can resolve either side without knowing the concrete relation.

use crate::core::entity::Model;
use serde::Serialize;
use std::fmt::Debug;
use uuid::Uuid;

/// What happens to a join record when one of its endpoints is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// The record survives with the deleted side cleared
    SetNull,
    /// The record is deleted with the endpoint
    Cascade,
}

/// Which side of a relation an entity sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    Left,
    Right,
}

impl LinkSide {
    pub fn opposite(self) -> Self {
        match self {
            LinkSide::Left => LinkSide::Right,
            LinkSide::Right => LinkSide::Left,
        }
    }
}

/// A join record between `Left` and `Right`
pub trait Link: Clone + Debug + Serialize + Send + Sync + 'static {
    type Left: Model;
    type Right: Model;

    /// Relation name used in errors and logs (e.g., "shop_to_marketplace")
    fn link_type() -> &'static str;

    fn table_name() -> &'static str;

    fn on_delete() -> DeletePolicy;

    /// New record joining `left` and `right`
    fn between(left: Uuid, right: Uuid, now: chrono::DateTime<chrono::Utc>) -> Self;

    fn left_id(&self) -> Option<Uuid>;

    fn right_id(&self) -> Option<Uuid>;

    /// Clear one side; only meaningful under [`DeletePolicy::SetNull`]
    fn clear_side(&mut self, side: LinkSide);

    fn side_id(&self, side: LinkSide) -> Option<Uuid> {
        match side {
            LinkSide::Left => self.left_id(),
            LinkSide::Right => self.right_id(),
        }
    }

    /// Both ends present and equal to the given pair
    fn connects(&self, left: Uuid, right: Uuid) -> bool {
        self.left_id() == Some(left) && self.right_id() == Some(right)
    }
}
