//! Card entity - A single captured idea or task belonging to one bucket.
//!
//! Labels and the optional reminder sub-record are stored as JSON columns;
//! they are owned by the card and have no identity of their own. The
//! `source_intake_id` back-reference links a card to the intake session it
//! was materialized from.

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Card database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the card
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user identity (token subject claim)
    pub user_id: String,
    /// The bucket this card currently belongs to
    pub bucket_id: i64,
    /// Short summary of the idea
    pub title: String,
    /// Full free-text content
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Name + color label pairs; order is irrelevant
    #[sea_orm(column_type = "Json")]
    pub labels: CardLabels,
    /// Integer sort position within the owning bucket
    #[sea_orm(column_name = "sort_order")]
    pub order: i32,
    /// Whether this is a todo (true) or just a note/thought (false)
    pub is_actionable: bool,
    /// Optional priority level
    pub priority: Option<Priority>,
    /// Optional reminder sub-record, set once a due time is known
    #[sea_orm(column_type = "Json", nullable)]
    pub reminder: Option<CardReminder>,
    /// Intake session this card was materialized from, if any
    pub source_intake_id: Option<i64>,
    /// Creation timestamp (UTC)
    pub created_at: DateTimeUtc,
    /// Last-modified timestamp (UTC)
    pub updated_at: DateTimeUtc,
}

/// A single label attached to a card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct CardLabel {
    /// Label text
    pub name: String,
    /// Display color token
    pub color: String,
}

/// JSON-backed collection of labels
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct CardLabels(pub Vec<CardLabel>);

/// Reminder sub-record tracking the push state to the external reminders app
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CardReminder {
    /// When the reminder should fire (UTC)
    pub remind_at: DateTimeUtc,
    /// Whether this reminder has been pushed to Apple Reminders
    #[serde(default)]
    pub pushed_to_apple: bool,
    /// External reminder identifier, authoritative for dedup once pushed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_reminder_id: Option<String>,
    /// When the push happened, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTimeUtc>,
}

/// Card priority level
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority
    #[sea_orm(string_value = "low")]
    Low,
    /// Medium priority
    #[sea_orm(string_value = "medium")]
    Medium,
    /// High priority
    #[sea_orm(string_value = "high")]
    High,
}

/// Defines relationships between Card and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each card belongs to exactly one bucket
    #[sea_orm(
        belongs_to = "super::bucket::Entity",
        from = "Column::BucketId",
        to = "super::bucket::Column::Id"
    )]
    Bucket,
}

impl Related<super::bucket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bucket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
