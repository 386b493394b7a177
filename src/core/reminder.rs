//! Pushing card reminders into Apple Reminders.
//!
//! Card state only changes after the external push succeeds; a failed push
//! leaves the card exactly as it was so the user can retry.

use crate::{
    core::card::get_card,
    entities::card::{self, CardReminder},
    errors::{Error, Result},
    services::apple_reminders::{NewReminder, ReminderSync},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};
use serde::Serialize;

/// Per-card result of a batch push.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    /// Card the push was attempted for
    pub card_id: i64,
    /// Whether the push succeeded
    pub success: bool,
    /// Identifier assigned by the reminder store on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<String>,
    /// Failure detail when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a batch push run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Number of cards successfully pushed
    pub pushed: usize,
    /// Number of cards attempted
    pub total: usize,
    /// Per-card results, in request order
    pub results: Vec<BatchItemResult>,
}

/// Pushes one card to the reminder store and records the push on the card.
///
/// Returns the updated card and the identifier assigned by the store. The
/// card's existing due date is kept; a card without one gets the push time
/// as its `remind_at` so the stored reminder is always dated.
pub async fn push_card(
    db: &DatabaseConnection,
    sync: &dyn ReminderSync,
    user_id: &str,
    card_id: i64,
    list_name: &str,
) -> Result<(card::Model, Option<String>)> {
    let card = get_card(db, user_id, card_id)
        .await?
        .ok_or(Error::NotFound { entity: "Card" })?;

    let outcome = sync
        .create_reminder(&NewReminder {
            title: card.title.clone(),
            notes: card.content.clone(),
            due_date: card.reminder.as_ref().map(|r| r.remind_at),
            list_name: list_name.to_string(),
        })
        .await;

    if !outcome.success {
        return Err(Error::ReminderSync {
            message: outcome
                .error
                .unwrap_or_else(|| "Failed to create reminder".to_string()),
        });
    }

    let now = Utc::now();
    let remind_at = card.reminder.as_ref().map_or(now, |r| r.remind_at);
    let reminder_id = outcome.reminder_id;

    let mut model = card.into_active_model();
    model.reminder = Set(Some(CardReminder {
        remind_at,
        pushed_to_apple: true,
        apple_reminder_id: reminder_id.clone(),
        pushed_at: Some(now),
    }));
    model.updated_at = Set(now);
    let updated = model.update(db).await?;

    Ok((updated, reminder_id))
}

/// Pushes several cards, continuing past individual failures.
pub async fn push_batch(
    db: &DatabaseConnection,
    sync: &dyn ReminderSync,
    user_id: &str,
    card_ids: &[i64],
    list_name: &str,
) -> BatchOutcome {
    let mut results = Vec::with_capacity(card_ids.len());
    let mut pushed = 0;

    for &card_id in card_ids {
        match push_card(db, sync, user_id, card_id, list_name).await {
            Ok((_, reminder_id)) => {
                pushed += 1;
                results.push(BatchItemResult {
                    card_id,
                    success: true,
                    reminder_id,
                    error: None,
                });
            }
            Err(err) => results.push(BatchItemResult {
                card_id,
                success: false,
                reminder_id: None,
                error: Some(err.to_string()),
            }),
        }
    }

    BatchOutcome {
        pushed,
        total: card_ids.len(),
        results,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::card::{NewCard, create_card};
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_push_card_records_push_state() -> Result<()> {
        let (db, bucket) = setup_with_bucket().await?;
        let due = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        let card = create_card(
            &db,
            "user1",
            NewCard {
                reminder: Some(CardReminder {
                    remind_at: due,
                    pushed_to_apple: false,
                    apple_reminder_id: None,
                    pushed_at: None,
                }),
                ..NewCard::in_bucket(bucket.id).title("Buy oil")
            },
        )
        .await?;

        let sync = MockReminderSync::succeeding("x-apple-reminder://123");
        let (updated, reminder_id) = push_card(&db, &sync, "user1", card.id, "Brain Dump").await?;

        assert_eq!(reminder_id.as_deref(), Some("x-apple-reminder://123"));
        let reminder = updated.reminder.unwrap();
        assert!(reminder.pushed_to_apple);
        assert_eq!(reminder.remind_at, due);
        assert_eq!(
            reminder.apple_reminder_id.as_deref(),
            Some("x-apple-reminder://123")
        );
        assert!(reminder.pushed_at.is_some());

        // The push carried the card's title, content, and due date
        let calls = sync.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "Buy oil");
        assert_eq!(calls[0].due_date, Some(due));
        assert_eq!(calls[0].list_name, "Brain Dump");

        Ok(())
    }

    #[tokio::test]
    async fn test_push_card_without_due_date_gets_one() -> Result<()> {
        let (db, bucket) = setup_with_bucket().await?;
        let card = create_card(&db, "user1", NewCard::in_bucket(bucket.id)).await?;

        let sync = MockReminderSync::succeeding("id-1");
        let (updated, _) = push_card(&db, &sync, "user1", card.id, "Brain Dump").await?;

        let reminder = updated.reminder.unwrap();
        assert!(reminder.pushed_to_apple);
        assert_eq!(Some(reminder.remind_at), reminder.pushed_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_push_failure_leaves_card_untouched() -> Result<()> {
        let (db, bucket) = setup_with_bucket().await?;
        let card = create_card(&db, "user1", NewCard::in_bucket(bucket.id)).await?;

        let sync = MockReminderSync::failing("Reminders app not accessible");
        let result = push_card(&db, &sync, "user1", card.id, "Brain Dump").await;
        assert!(matches!(result, Err(Error::ReminderSync { .. })));

        let stored = get_card(&db, "user1", card.id).await?.unwrap();
        assert!(stored.reminder.is_none());
        assert_eq!(stored.updated_at, card.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_push_missing_card_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let sync = MockReminderSync::succeeding("id-1");

        let result = push_card(&db, &sync, "user1", 42, "Brain Dump").await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Card" })));
        assert!(sync.calls().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_push_batch_continues_past_failures() -> Result<()> {
        let (db, bucket) = setup_with_bucket().await?;
        let a = create_card(&db, "user1", NewCard::in_bucket(bucket.id)).await?;
        let b = create_card(&db, "user1", NewCard::in_bucket(bucket.id)).await?;
        let c = create_card(&db, "user1", NewCard::in_bucket(bucket.id)).await?;

        // Second call fails, the rest succeed
        let sync = MockReminderSync::with_script(vec![
            Ok("id-a".to_string()),
            Err("transient".to_string()),
            Ok("id-c".to_string()),
        ]);
        let outcome = push_batch(&db, &sync, "user1", &[a.id, b.id, c.id], "Brain Dump").await;

        assert_eq!(outcome.pushed, 2);
        assert_eq!(outcome.total, 3);
        assert!(outcome.results[0].success);
        assert!(!outcome.results[1].success);
        assert!(outcome.results[1].error.is_some());
        assert!(outcome.results[2].success);

        let stored_b = get_card(&db, "user1", b.id).await?.unwrap();
        assert!(stored_b.reminder.is_none());

        Ok(())
    }
}
