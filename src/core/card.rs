//! Card business logic - Handles all card-related operations.
//!
//! Cards live inside exactly one bucket and carry an integer order within it.
//! Appending computes `max(order in bucket) + 1`; a move sets the bucket
//! reference and an explicit target order in a single write without
//! renumbering either side, so order collisions are possible and resolved by
//! sort stability at read time.

use crate::{
    entities::{
        Card,
        card::{self, CardLabel, CardLabels, CardReminder, Priority},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Attributes for card creation; only the bucket is mandatory.
#[derive(Debug)]
pub struct NewCard {
    /// The bucket the card is created in
    pub bucket_id: i64,
    /// Title; defaults to "Untitled"
    pub title: Option<String>,
    /// Free-text content; defaults to empty
    pub content: Option<String>,
    /// Labels; defaults to none
    pub labels: Vec<CardLabel>,
    /// Actionable flag; defaults to false
    pub is_actionable: Option<bool>,
    /// Optional priority
    pub priority: Option<Priority>,
    /// Optional reminder sub-record
    pub reminder: Option<CardReminder>,
    /// Intake session this card originates from, if any
    pub source_intake_id: Option<i64>,
    /// Explicit sort position; defaults to max(order in bucket) + 1
    pub order: Option<i32>,
}

impl NewCard {
    /// Starts a card in the given bucket with every other field defaulted.
    pub fn in_bucket(bucket_id: i64) -> Self {
        NewCard {
            bucket_id,
            title: None,
            content: None,
            labels: Vec::new(),
            is_actionable: None,
            priority: None,
            reminder: None,
            source_intake_id: None,
            order: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Partial update for an existing card; `None` fields are left untouched.
///
/// `reminder` is doubly optional so callers can distinguish "leave alone"
/// (`None`) from "clear it" (`Some(None)`).
#[derive(Debug, Default)]
pub struct CardUpdate {
    /// New title
    pub title: Option<String>,
    /// New content
    pub content: Option<String>,
    /// Replacement label set
    pub labels: Option<Vec<CardLabel>>,
    /// New actionable flag
    pub is_actionable: Option<bool>,
    /// New priority (`Some(None)` clears it)
    pub priority: Option<Option<Priority>>,
    /// New reminder sub-record (`Some(None)` clears it)
    pub reminder: Option<Option<CardReminder>>,
    /// New owning bucket
    pub bucket_id: Option<i64>,
}

/// Retrieves a user's cards sorted ascending by order, optionally filtered to
/// one bucket. Ties break by id so the sort is stable.
pub async fn list_cards(
    db: &DatabaseConnection,
    user_id: &str,
    bucket_id: Option<i64>,
) -> Result<Vec<card::Model>> {
    let mut query = Card::find().filter(card::Column::UserId.eq(user_id));
    if let Some(bucket_id) = bucket_id {
        query = query.filter(card::Column::BucketId.eq(bucket_id));
    }
    query
        .order_by_asc(card::Column::Order)
        .order_by_asc(card::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a card by id, scoped to the owning user.
pub async fn get_card(
    db: &DatabaseConnection,
    user_id: &str,
    card_id: i64,
) -> Result<Option<card::Model>> {
    Card::find_by_id(card_id)
        .filter(card::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a card, appending it to its bucket when no explicit order is given.
///
/// Generic over the connection so intake confirmation can create cards inside
/// its transaction.
pub async fn create_card<C>(conn: &C, user_id: &str, data: NewCard) -> Result<card::Model>
where
    C: ConnectionTrait,
{
    let order = match data.order {
        Some(order) => order,
        None => next_card_order(conn, user_id, data.bucket_id).await?,
    };

    let now = Utc::now();
    let model = card::ActiveModel {
        user_id: Set(user_id.to_string()),
        bucket_id: Set(data.bucket_id),
        title: Set(data.title.unwrap_or_else(|| "Untitled".to_string())),
        content: Set(data.content.unwrap_or_default()),
        labels: Set(CardLabels(data.labels)),
        order: Set(order),
        is_actionable: Set(data.is_actionable.unwrap_or(false)),
        priority: Set(data.priority),
        reminder: Set(data.reminder),
        source_intake_id: Set(data.source_intake_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(conn).await.map_err(Into::into)
}

/// Applies a partial update to a card and stamps `updated_at`.
pub async fn update_card(
    db: &DatabaseConnection,
    user_id: &str,
    card_id: i64,
    data: CardUpdate,
) -> Result<card::Model> {
    let existing = get_card(db, user_id, card_id)
        .await?
        .ok_or(Error::NotFound { entity: "Card" })?;

    let mut model: card::ActiveModel = existing.into();
    if let Some(title) = data.title {
        model.title = Set(title);
    }
    if let Some(content) = data.content {
        model.content = Set(content);
    }
    if let Some(labels) = data.labels {
        model.labels = Set(CardLabels(labels));
    }
    if let Some(is_actionable) = data.is_actionable {
        model.is_actionable = Set(is_actionable);
    }
    if let Some(priority) = data.priority {
        model.priority = Set(priority);
    }
    if let Some(reminder) = data.reminder {
        model.reminder = Set(reminder);
    }
    if let Some(bucket_id) = data.bucket_id {
        model.bucket_id = Set(bucket_id);
    }
    model.updated_at = Set(Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes a card owned by the user.
pub async fn delete_card(db: &DatabaseConnection, user_id: &str, card_id: i64) -> Result<()> {
    let existing = get_card(db, user_id, card_id)
        .await?
        .ok_or(Error::NotFound { entity: "Card" })?;

    Card::delete_by_id(existing.id).exec(db).await?;
    Ok(())
}

/// Moves a card to another bucket at an explicit order, as one atomic write.
///
/// Neither the source nor the destination bucket's other cards are
/// renumbered.
pub async fn move_card(
    db: &DatabaseConnection,
    user_id: &str,
    card_id: i64,
    to_bucket_id: i64,
    order: i32,
) -> Result<card::Model> {
    let existing = get_card(db, user_id, card_id)
        .await?
        .ok_or(Error::NotFound { entity: "Card" })?;

    let mut model: card::ActiveModel = existing.into();
    model.bucket_id = Set(to_bucket_id);
    model.order = Set(order);
    model.updated_at = Set(Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Assigns `order = index` (and the given bucket) to each listed card in one
/// transaction.
///
/// Callers are responsible for supplying the complete sequence for the
/// bucket; omitted cards keep their stale order values.
pub async fn reorder_cards(
    db: &DatabaseConnection,
    user_id: &str,
    bucket_id: i64,
    ordered_ids: &[i64],
) -> Result<()> {
    let txn = db.begin().await?;
    let now = Utc::now();

    for (index, id) in ordered_ids.iter().enumerate() {
        Card::update_many()
            .col_expr(card::Column::Order, Expr::value(index as i32))
            .col_expr(card::Column::BucketId, Expr::value(bucket_id))
            .col_expr(card::Column::UpdatedAt, Expr::value(now))
            .filter(card::Column::Id.eq(*id))
            .filter(card::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Computes the next append position within a bucket.
async fn next_card_order<C>(conn: &C, user_id: &str, bucket_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let highest = Card::find()
        .filter(card::Column::UserId.eq(user_id))
        .filter(card::Column::BucketId.eq(bucket_id))
        .order_by_desc(card::Column::Order)
        .one(conn)
        .await?;

    Ok(highest.map_or(0, |c| c.order + 1))
}
