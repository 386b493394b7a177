//! Bucket entity - A user-owned, ordered category containing cards.
//!
//! Buckets are the kanban columns of the brain-dump board. Each bucket belongs
//! to exactly one user and carries an integer sort order; ties and gaps in the
//! order values are tolerated because ascending sort is the only consumer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bucket database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buckets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the bucket
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user identity (token subject claim)
    pub user_id: String,
    /// Human-readable name of the bucket (e.g., "Work", "Motorcycles")
    pub name: String,
    /// Display color token (e.g., "#3b82f6")
    pub color: String,
    /// Integer sort position; Unsorted is pinned to 99 so it sorts last
    #[sea_orm(column_name = "sort_order")]
    pub order: i32,
    /// Whether this bucket was created by the default bootstrap
    pub is_default: bool,
    /// Creation timestamp (UTC)
    pub created_at: DateTimeUtc,
    /// Last-modified timestamp (UTC)
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Bucket and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One bucket has many cards
    #[sea_orm(has_many = "super::card::Entity")]
    Cards,
}

impl Related<super::card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
