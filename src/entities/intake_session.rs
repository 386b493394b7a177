//! IntakeSession entity - One raw-text-to-cards conversion attempt.
//!
//! A session records the raw input, the ideas the model proposed, and a
//! forward-only status machine: `pending -> parsed -> processed`, with
//! `failed` absorbing from `pending`. Parsed ideas are embedded as a JSON
//! column; after confirmation they remain only as session history.

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Intake session database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "intake_sessions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the session
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user identity (token subject claim)
    pub user_id: String,
    /// The raw brain-dump text as submitted
    #[sea_orm(column_type = "Text")]
    pub raw_content: String,
    /// Original filename when the text came from an upload
    pub filename: Option<String>,
    /// Ideas proposed by the extraction model, in model order
    #[sea_orm(column_type = "Json")]
    pub parsed_ideas: ParsedIdeas,
    /// Lifecycle status
    pub status: IntakeStatus,
    /// Identifier of the model that produced the ideas
    pub model: Option<String>,
    /// Wall-clock extraction time in milliseconds
    pub processing_time_ms: Option<i64>,
    /// Failure detail when status is `failed`
    pub error_message: Option<String>,
    /// Creation timestamp (UTC)
    pub created_at: DateTimeUtc,
    /// Last-modified timestamp (UTC)
    pub updated_at: DateTimeUtc,
}

/// A single model-proposed idea, pending user confirmation.
///
/// Every field is already sanitized by the extraction client before it is
/// stored here; see `services::claude`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIdea {
    /// Concise summary, at most 80 characters
    pub title: String,
    /// Verbatim excerpt from the raw text
    pub content: String,
    /// Free-text bucket name suggestion, matched case-insensitively at
    /// confirmation time (not a live reference)
    pub suggested_bucket: String,
    /// Whether the model considers this a todo
    pub is_actionable: bool,
    /// 0-3 short lowercase labels
    pub suggested_labels: Vec<String>,
    /// ISO-8601-like timestamp string, when the text carried a due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_reminder: Option<String>,
}

/// JSON-backed ordered sequence of parsed ideas
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ParsedIdeas(pub Vec<ParsedIdea>);

/// Session lifecycle status; strictly forward-only
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    /// Session created, extraction not yet attempted
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Extraction succeeded, ideas await user confirmation
    #[sea_orm(string_value = "parsed")]
    Parsed,
    /// Ideas were confirmed and materialized into cards
    #[sea_orm(string_value = "processed")]
    Processed,
    /// Extraction failed; absorbing state
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Defines relationships between IntakeSession and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
