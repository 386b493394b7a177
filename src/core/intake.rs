//! Intake pipeline - The raw-text-to-cards state machine.
//!
//! A session moves `pending -> parsed -> processed`; extraction failure sends
//! it from `pending` to the absorbing `failed` state. Confirmation resolves
//! each idea to a bucket by case-insensitive name, falls back to Unsorted
//! (created on demand, at most once per confirm), and materializes cards in
//! one database transaction before marking the session processed.
//!
//! Confirmation is only valid from `pending` or `parsed`: a `processed`
//! session cannot be re-confirmed (the source system allowed it and silently
//! produced duplicate cards, see DESIGN.md) and a `failed` one never leaves
//! that state.

use crate::{
    core::bucket::{DEFAULT_COLOR, ensure_default_buckets, get_or_create_unsorted},
    core::card::{NewCard, create_card},
    entities::{
        IntakeSession, bucket,
        card::{self, CardLabel, CardReminder},
        intake_session::{self, IntakeStatus, ParsedIdeas},
    },
    errors::{Error, Result},
    services::claude::IdeaExtractor,
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::HashMap;

/// One user-reviewed idea arriving at confirm time.
///
/// The client may have renamed the target bucket (`bucket_name`) or left the
/// model's suggestion (`suggested_bucket`); the same pairing exists for
/// labels. Whichever is present wins, client edit first.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedIdea {
    /// Card title
    pub title: Option<String>,
    /// Card content
    pub content: Option<String>,
    /// Bucket chosen by the user during review
    pub bucket_name: Option<String>,
    /// Bucket the model suggested
    pub suggested_bucket: Option<String>,
    /// Actionable flag
    pub is_actionable: Option<bool>,
    /// Labels chosen by the user during review
    pub labels: Option<Vec<String>>,
    /// Labels the model suggested
    pub suggested_labels: Option<Vec<String>>,
    /// Due timestamp string (ISO-8601-like)
    pub reminder: Option<String>,
}

/// Creates a new intake session in the `pending` state.
pub async fn start_session(
    db: &DatabaseConnection,
    user_id: &str,
    raw_content: String,
    filename: Option<String>,
) -> Result<intake_session::Model> {
    let now = Utc::now();
    let model = intake_session::ActiveModel {
        user_id: Set(user_id.to_string()),
        raw_content: Set(raw_content),
        filename: Set(filename),
        parsed_ideas: Set(ParsedIdeas::default()),
        status: Set(IntakeStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Fetches a session by id, scoped to the owning user.
pub async fn get_session(
    db: &DatabaseConnection,
    user_id: &str,
    session_id: i64,
) -> Result<Option<intake_session::Model>> {
    IntakeSession::find_by_id(session_id)
        .filter(intake_session::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Runs extraction for a pending session and records the outcome.
///
/// On success the session transitions to `parsed` with the ideas, model id,
/// and elapsed time stored. On failure it transitions to `failed` with the
/// error message persisted, and the error is returned so the route layer can
/// surface it alongside the (still inspectable) session id.
pub async fn run_extraction(
    db: &DatabaseConnection,
    extractor: &dyn IdeaExtractor,
    user_id: &str,
    session: intake_session::Model,
) -> Result<intake_session::Model> {
    // Seed the model with the user's current bucket names, bootstrapping
    // defaults first so a brand-new user still gets grounded suggestions.
    let bucket_names: Vec<String> = ensure_default_buckets(db, user_id)
        .await?
        .into_iter()
        .map(|b| b.name)
        .collect();

    let session_id = session.id;
    match extractor.extract(&session.raw_content, &bucket_names).await {
        Ok(outcome) => {
            tracing::info!(
                session_id,
                ideas = outcome.ideas.len(),
                elapsed_ms = outcome.processing_time_ms,
                "extraction succeeded"
            );
            let mut model: intake_session::ActiveModel = session.into();
            model.parsed_ideas = Set(ParsedIdeas(outcome.ideas));
            model.status = Set(IntakeStatus::Parsed);
            model.model = Set(Some(outcome.model));
            model.processing_time_ms = Set(Some(outcome.processing_time_ms));
            model.updated_at = Set(Utc::now());
            model.update(db).await.map_err(Into::into)
        }
        Err(err) => {
            tracing::warn!(session_id, error = %err, "extraction failed");
            let mut model: intake_session::ActiveModel = session.into();
            model.status = Set(IntakeStatus::Failed);
            model.error_message = Set(Some(err.to_string()));
            model.updated_at = Set(Utc::now());
            model.update(db).await?;
            Err(err)
        }
    }
}

/// Materializes confirmed ideas into cards and marks the session processed.
///
/// The card creation loop and the status transition run in one database
/// transaction: either every idea becomes a card or none do.
pub async fn confirm_session(
    db: &DatabaseConnection,
    user_id: &str,
    session_id: i64,
    ideas: Vec<ConfirmedIdea>,
) -> Result<Vec<card::Model>> {
    let session = get_session(db, user_id, session_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Intake session",
        })?;

    match session.status {
        IntakeStatus::Processed => {
            return Err(Error::validation(
                "Intake session has already been confirmed",
            ));
        }
        IntakeStatus::Failed => {
            return Err(Error::validation(
                "Intake session failed extraction and cannot be confirmed",
            ));
        }
        IntakeStatus::Pending | IntakeStatus::Parsed => {}
    }

    // Map lowercase bucket name -> id for case-insensitive resolution.
    let buckets = ensure_default_buckets(db, user_id).await?;
    let mut bucket_map: HashMap<String, i64> = buckets
        .iter()
        .map(|b| (b.name.to_lowercase(), b.id))
        .collect();

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(ideas.len());

    for idea in ideas {
        let bucket_id = resolve_bucket(&txn, user_id, &mut bucket_map, &idea).await?;

        let labels = idea
            .labels
            .or(idea.suggested_labels)
            .unwrap_or_default()
            .into_iter()
            .map(|name| CardLabel {
                name,
                color: DEFAULT_COLOR.to_string(),
            })
            .collect();

        let reminder = idea
            .reminder
            .as_deref()
            .and_then(parse_reminder_timestamp)
            .map(|remind_at| CardReminder {
                remind_at,
                pushed_to_apple: false,
                apple_reminder_id: None,
                pushed_at: None,
            });

        let card = create_card(
            &txn,
            user_id,
            NewCard {
                bucket_id,
                title: idea.title,
                content: idea.content,
                labels,
                is_actionable: idea.is_actionable,
                priority: None,
                reminder,
                source_intake_id: Some(session.id),
                order: None,
            },
        )
        .await?;
        created.push(card);
    }

    let mut model: intake_session::ActiveModel = session.into();
    model.status = Set(IntakeStatus::Processed);
    model.updated_at = Set(Utc::now());
    model.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(session_id, cards = created.len(), "intake confirmed");
    Ok(created)
}

/// Resolves an idea's target bucket: user edit first, then model suggestion,
/// case-insensitively; anything unresolved lands in Unsorted, which is
/// created at most once per confirm call.
async fn resolve_bucket<C>(
    conn: &C,
    user_id: &str,
    bucket_map: &mut HashMap<String, i64>,
    idea: &ConfirmedIdea,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let requested = idea
        .bucket_name
        .as_deref()
        .or(idea.suggested_bucket.as_deref())
        .unwrap_or("Unsorted")
        .to_lowercase();

    if let Some(id) = bucket_map.get(&requested) {
        return Ok(*id);
    }
    if let Some(id) = bucket_map.get("unsorted") {
        return Ok(*id);
    }

    let unsorted: bucket::Model = get_or_create_unsorted(conn, user_id).await?;
    bucket_map.insert("unsorted".to_string(), unsorted.id);
    Ok(unsorted.id)
}

/// Parses the model's ISO-8601-like reminder string; an unparseable value
/// means no reminder rather than a failed confirm.
fn parse_reminder_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Tolerate a missing timezone designator, treated as UTC
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
