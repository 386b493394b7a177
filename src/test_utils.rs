//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults, plus in-memory doubles
//! for the external extraction and reminder services.

use crate::{
    core::bucket::{NewBucket, create_bucket},
    entities::{bucket, intake_session::ParsedIdea},
    errors::{Error, Result},
    services::{
        apple_reminders::{NewReminder, ReminderOutcome, ReminderStatus, ReminderSync},
        claude::{ExtractionOutcome, IdeaExtractor},
    },
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test bucket with default color and appended order.
pub async fn create_test_bucket(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<bucket::Model> {
    create_bucket(
        db,
        user_id,
        NewBucket {
            name: Some(name.to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Creates an in-memory database plus one bucket for "user1".
///
/// Most card tests need exactly this much scaffolding.
pub async fn setup_with_bucket() -> Result<(DatabaseConnection, bucket::Model)> {
    let db = setup_test_db().await?;
    let bucket = create_test_bucket(&db, "user1", "Inbox").await?;
    Ok((db, bucket))
}

/// `IdeaExtractor` double with a fixed outcome, recording the bucket names
/// each call was seeded with.
pub struct MockExtractor {
    outcome: std::result::Result<Vec<ParsedIdea>, String>,
    seen_buckets: Mutex<Vec<String>>,
}

impl MockExtractor {
    /// Extractor that always succeeds with the given ideas.
    pub fn returning(ideas: Vec<ParsedIdea>) -> Self {
        Self {
            outcome: Ok(ideas),
            seen_buckets: Mutex::new(Vec::new()),
        }
    }

    /// Extractor that always fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            seen_buckets: Mutex::new(Vec::new()),
        }
    }

    /// Bucket names passed to the most recent `extract` call.
    pub fn seen_bucket_names(&self) -> Vec<String> {
        self.seen_buckets.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdeaExtractor for MockExtractor {
    async fn extract(&self, _content: &str, bucket_names: &[String]) -> Result<ExtractionOutcome> {
        *self.seen_buckets.lock().unwrap() = bucket_names.to_vec();
        match &self.outcome {
            Ok(ideas) => Ok(ExtractionOutcome {
                ideas: ideas.clone(),
                model: "mock-model".to_string(),
                processing_time_ms: 1,
            }),
            Err(message) => Err(Error::Extraction {
                message: message.clone(),
            }),
        }
    }
}

/// `ReminderSync` double with scriptable per-call results, recording every
/// reminder it was asked to create.
pub struct MockReminderSync {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: std::result::Result<String, String>,
    calls: Mutex<Vec<NewReminder>>,
}

impl MockReminderSync {
    /// Sync that always succeeds with the given reminder id.
    pub fn succeeding(reminder_id: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(reminder_id.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sync that always fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sync that plays back the given results in order, then fails.
    pub fn with_script(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Err("script exhausted".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every reminder passed to `create_reminder`, in call order.
    pub fn calls(&self) -> Vec<NewReminder> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderSync for MockReminderSync {
    async fn check_status(&self) -> ReminderStatus {
        ReminderStatus {
            available: true,
            lists: Some(vec!["Brain Dump".to_string()]),
            error: None,
        }
    }

    async fn create_reminder(&self, input: &NewReminder) -> ReminderOutcome {
        self.calls.lock().unwrap().push(input.clone());
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match result {
            Ok(reminder_id) => ReminderOutcome {
                success: true,
                reminder_id: Some(reminder_id),
                error: None,
            },
            Err(error) => ReminderOutcome {
                success: false,
                reminder_id: None,
                error: Some(error),
            },
        }
    }
}
