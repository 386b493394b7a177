//! Bucket business logic - Handles all bucket-related operations.
//!
//! Provides functions for listing, bootstrapping, creating, updating,
//! reordering, and deleting buckets. Every operation is scoped to the owning
//! user; cross-user access is impossible by construction. All functions are
//! async and return Result types for error handling.

use crate::{
    entities::{Bucket, Card, bucket, card},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// The seven fixed buckets every new user starts with.
///
/// Unsorted is pinned to a high order value (99) so it always sorts last,
/// leaving room for user-created buckets in between.
pub const DEFAULT_BUCKETS: [(&str, &str, i32); 7] = [
    ("Work", "#3b82f6", 0),
    ("Music", "#8b5cf6", 1),
    ("Social", "#ec4899", 2),
    ("Motorcycles", "#f97316", 3),
    ("Health", "#22c55e", 4),
    ("Ideas", "#eab308", 5),
    ("Unsorted", "#6b7280", 99),
];

/// Neutral gray used for buckets and labels without an explicit color.
pub const DEFAULT_COLOR: &str = "#6b7280";

/// Optional attributes for bucket creation; anything missing gets a default.
#[derive(Debug, Default)]
pub struct NewBucket {
    /// Display name; defaults to "New Bucket"
    pub name: Option<String>,
    /// Color token; defaults to neutral gray
    pub color: Option<String>,
    /// Explicit sort position; defaults to max(existing) + 1
    pub order: Option<i32>,
}

/// Partial update for an existing bucket; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct BucketUpdate {
    /// New display name
    pub name: Option<String>,
    /// New color token
    pub color: Option<String>,
    /// New sort position
    pub order: Option<i32>,
}

/// Retrieves all of a user's buckets, sorted ascending by order.
///
/// Ties are broken by id (insertion order) so the sort is stable even when
/// order values collide.
pub async fn list_buckets(db: &DatabaseConnection, user_id: &str) -> Result<Vec<bucket::Model>> {
    Bucket::find()
        .filter(bucket::Column::UserId.eq(user_id))
        .order_by_asc(bucket::Column::Order)
        .order_by_asc(bucket::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Bootstraps the seven default buckets for a user with none, or returns the
/// existing buckets unchanged.
///
/// Safe to call on every read path: a user who already has buckets is never
/// given duplicates.
pub async fn ensure_default_buckets(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<bucket::Model>> {
    let existing = list_buckets(db, user_id).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    tracing::info!(user_id, "bootstrapping default buckets");
    let now = Utc::now();
    let mut created = Vec::with_capacity(DEFAULT_BUCKETS.len());
    for (name, color, order) in DEFAULT_BUCKETS {
        let model = bucket::ActiveModel {
            user_id: Set(user_id.to_string()),
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            order: Set(order),
            is_default: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(model.insert(db).await?);
    }
    Ok(created)
}

/// Creates a new bucket for a user.
///
/// A missing order defaults to one past the user's current maximum (0 when
/// the user has no buckets); missing name and color fall back to
/// "New Bucket" and neutral gray.
pub async fn create_bucket(
    db: &DatabaseConnection,
    user_id: &str,
    data: NewBucket,
) -> Result<bucket::Model> {
    let order = match data.order {
        Some(order) => order,
        None => next_bucket_order(db, user_id).await?,
    };

    let now = Utc::now();
    let model = bucket::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(data.name.unwrap_or_else(|| "New Bucket".to_string())),
        color: Set(data.color.unwrap_or_else(|| DEFAULT_COLOR.to_string())),
        order: Set(order),
        is_default: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a bucket by id, scoped to the owning user.
pub async fn get_bucket(
    db: &DatabaseConnection,
    user_id: &str,
    bucket_id: i64,
) -> Result<Option<bucket::Model>> {
    Bucket::find_by_id(bucket_id)
        .filter(bucket::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a bucket and stamps `updated_at`.
pub async fn update_bucket(
    db: &DatabaseConnection,
    user_id: &str,
    bucket_id: i64,
    data: BucketUpdate,
) -> Result<bucket::Model> {
    let existing = get_bucket(db, user_id, bucket_id)
        .await?
        .ok_or(Error::NotFound { entity: "Bucket" })?;

    let mut model: bucket::ActiveModel = existing.into();
    if let Some(name) = data.name {
        model.name = Set(name);
    }
    if let Some(color) = data.color {
        model.color = Set(color);
    }
    if let Some(order) = data.order {
        model.order = Set(order);
    }
    model.updated_at = Set(Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes a bucket, first reassigning all of its cards to the user's
/// Unsorted bucket (created on demand).
///
/// The cascade and the delete run in one database transaction so a failure
/// partway through never leaves orphaned cards.
pub async fn delete_bucket(db: &DatabaseConnection, user_id: &str, bucket_id: i64) -> Result<()> {
    let target = get_bucket(db, user_id, bucket_id)
        .await?
        .ok_or(Error::NotFound { entity: "Bucket" })?;

    let txn = db.begin().await?;

    let unsorted = get_or_create_unsorted(&txn, user_id).await?;

    Card::update_many()
        .col_expr(card::Column::BucketId, Expr::value(unsorted.id))
        .col_expr(card::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(card::Column::UserId.eq(user_id))
        .filter(card::Column::BucketId.eq(target.id))
        .exec(&txn)
        .await?;

    Bucket::delete_by_id(target.id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(user_id, bucket_id, "deleted bucket, cards moved to Unsorted");
    Ok(())
}

/// Assigns `order = index` to each listed bucket in one transaction.
///
/// Ids not present in the sequence are left untouched; duplicate or gapped
/// order values that result are acceptable because sort is the only consumer.
pub async fn reorder_buckets(
    db: &DatabaseConnection,
    user_id: &str,
    ordered_ids: &[i64],
) -> Result<()> {
    let txn = db.begin().await?;
    let now = Utc::now();

    for (index, id) in ordered_ids.iter().enumerate() {
        Bucket::update_many()
            .col_expr(bucket::Column::Order, Expr::value(index as i32))
            .col_expr(bucket::Column::UpdatedAt, Expr::value(now))
            .filter(bucket::Column::Id.eq(*id))
            .filter(bucket::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Finds the user's Unsorted bucket, creating it (order 99, default color)
/// when absent.
///
/// Generic over the connection so it can participate in an enclosing
/// transaction (bucket delete, intake confirm).
pub async fn get_or_create_unsorted<C>(conn: &C, user_id: &str) -> Result<bucket::Model>
where
    C: ConnectionTrait,
{
    let existing = Bucket::find()
        .filter(bucket::Column::UserId.eq(user_id))
        .filter(bucket::Column::Name.eq("Unsorted"))
        .one(conn)
        .await?;

    if let Some(found) = existing {
        return Ok(found);
    }

    let now = Utc::now();
    let model = bucket::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set("Unsorted".to_string()),
        color: Set(DEFAULT_COLOR.to_string()),
        order: Set(99),
        is_default: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(conn).await.map_err(Into::into)
}

/// Computes the next append position: max(existing order) + 1, or 0 for a
/// user with no buckets.
async fn next_bucket_order(db: &DatabaseConnection, user_id: &str) -> Result<i32> {
    let highest = Bucket::find()
        .filter(bucket::Column::UserId.eq(user_id))
        .order_by_desc(bucket::Column::Order)
        .one(db)
        .await?;

    Ok(highest.map_or(0, |b| b.order + 1))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::card::{NewCard, create_card, list_cards};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_bootstrap_creates_seven_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let buckets = ensure_default_buckets(&db, "user1").await?;
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.is_default));

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let first = ensure_default_buckets(&db, "user1").await?;
        let second = ensure_default_buckets(&db, "user1").await?;
        assert_eq!(first.len(), 7);
        assert_eq!(second.len(), 7);

        // No duplicates in the table either
        let listed = list_buckets(&db, "user1").await?;
        assert_eq!(listed.len(), 7);

        Ok(())
    }

    #[tokio::test]
    async fn test_default_bucket_ordering() -> Result<()> {
        let db = setup_test_db().await?;

        ensure_default_buckets(&db, "user1").await?;
        let names: Vec<String> = list_buckets(&db, "user1")
            .await?
            .into_iter()
            .map(|b| b.name)
            .collect();

        assert_eq!(
            names,
            vec!["Work", "Music", "Social", "Motorcycles", "Health", "Ideas", "Unsorted"]
        );

        let unsorted = list_buckets(&db, "user1").await?.pop().unwrap();
        assert_eq!(unsorted.name, "Unsorted");
        assert_eq!(unsorted.order, 99);

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_is_per_user() -> Result<()> {
        let db = setup_test_db().await?;

        ensure_default_buckets(&db, "user1").await?;
        assert!(list_buckets(&db, "user2").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_bucket_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let bucket = create_bucket(&db, "user1", NewBucket::default()).await?;
        assert_eq!(bucket.name, "New Bucket");
        assert_eq!(bucket.color, DEFAULT_COLOR);
        assert_eq!(bucket.order, 0);
        assert!(!bucket.is_default);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_bucket_appends_after_max_order() -> Result<()> {
        let db = setup_test_db().await?;
        ensure_default_buckets(&db, "user1").await?;

        let bucket = create_bucket(
            &db,
            "user1",
            NewBucket {
                name: Some("Cooking".to_string()),
                ..Default::default()
            },
        )
        .await?;

        // Unsorted sits at 99, so the next append lands at 100
        assert_eq!(bucket.order, 100);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_bucket_partial() -> Result<()> {
        let db = setup_test_db().await?;
        let bucket = create_test_bucket(&db, "user1", "Projects").await?;

        let updated = update_bucket(
            &db,
            "user1",
            bucket.id,
            BucketUpdate {
                color: Some("#ff0000".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Projects");
        assert_eq!(updated.color, "#ff0000");
        assert!(updated.updated_at >= bucket.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_bucket_not_owned() -> Result<()> {
        let db = setup_test_db().await?;
        let bucket = create_test_bucket(&db, "user1", "Projects").await?;

        let result = update_bucket(&db, "someone_else", bucket.id, BucketUpdate::default()).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Bucket" })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_bucket_cascades_cards_to_unsorted() -> Result<()> {
        let db = setup_test_db().await?;
        ensure_default_buckets(&db, "user1").await?;
        let doomed = create_test_bucket(&db, "user1", "Doomed").await?;

        for title in ["a", "b", "c"] {
            create_card(&db, "user1", NewCard::in_bucket(doomed.id).title(title)).await?;
        }

        delete_bucket(&db, "user1", doomed.id).await?;

        let buckets = list_buckets(&db, "user1").await?;
        assert!(!buckets.iter().any(|b| b.id == doomed.id));

        let unsorted = buckets.iter().find(|b| b.name == "Unsorted").unwrap();
        let cards = list_cards(&db, "user1", None).await?;
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c.bucket_id == unsorted.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_bucket_creates_unsorted_when_absent() -> Result<()> {
        let db = setup_test_db().await?;
        // No bootstrap: the user only has this one bucket
        let doomed = create_test_bucket(&db, "user1", "Only").await?;
        create_card(&db, "user1", NewCard::in_bucket(doomed.id).title("x")).await?;

        delete_bucket(&db, "user1", doomed.id).await?;

        let buckets = list_buckets(&db, "user1").await?;
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].name, "Unsorted");
        assert_eq!(buckets[0].order, 99);

        let cards = list_cards(&db, "user1", None).await?;
        assert_eq!(cards[0].bucket_id, buckets[0].id);

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_buckets_by_index() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_bucket(&db, "user1", "A").await?;
        let b = create_test_bucket(&db, "user1", "B").await?;
        let c = create_test_bucket(&db, "user1", "C").await?;

        reorder_buckets(&db, "user1", &[c.id, a.id, b.id]).await?;

        let names: Vec<String> = list_buckets(&db, "user1")
            .await?
            .into_iter()
            .map(|bk| bk.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_buckets_ignores_foreign_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let mine = create_test_bucket(&db, "user1", "Mine").await?;
        let theirs = create_test_bucket(&db, "user2", "Theirs").await?;

        reorder_buckets(&db, "user1", &[theirs.id, mine.id]).await?;

        // The other user's bucket keeps its original order value
        let other = list_buckets(&db, "user2").await?;
        assert_eq!(other[0].order, theirs.order);

        // Mine got index 1
        let own = list_buckets(&db, "user1").await?;
        assert_eq!(own[0].order, 1);

        Ok(())
    }
}
