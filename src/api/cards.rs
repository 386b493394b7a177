//! Card endpoints.

use crate::{
    api::{AppState, auth::AuthUser},
    core::card::{
        self, CardUpdate, NewCard, create_card, delete_card, get_card, list_cards, reorder_cards,
        update_card,
    },
    entities::card::{CardLabel, CardReminder, Model as Card, Priority},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

/// Deserializes a present-but-possibly-null field into `Some(Option<T>)`,
/// keeping "field absent" (`None`) distinct from "field set to null"
/// (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameters for card listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCardsQuery {
    bucket_id: Option<i64>,
}

/// Body for card creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    bucket_id: Option<i64>,
    title: Option<String>,
    content: Option<String>,
    labels: Option<Vec<CardLabel>>,
    is_actionable: Option<bool>,
    priority: Option<Priority>,
    reminder: Option<CardReminder>,
}

/// Body for partial card update; absent and null fields differ.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    title: Option<String>,
    content: Option<String>,
    labels: Option<Vec<CardLabel>>,
    is_actionable: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "double_option")]
    reminder: Option<Option<CardReminder>>,
    bucket_id: Option<i64>,
}

/// Body for moving a card between buckets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    to_bucket_id: Option<i64>,
    order: Option<i32>,
}

/// Body for bulk card reorder within a bucket.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderCardsRequest {
    bucket_id: Option<i64>,
    ordered_ids: Option<Vec<i64>>,
}

/// GET /api/brain-dump/cards?bucketId={id}
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListCardsQuery>,
) -> Result<Json<Vec<Card>>> {
    let cards = list_cards(&state.db, &user.user_id, query.bucket_id).await?;
    Ok(Json(cards))
}

/// GET /api/brain-dump/cards/{id}
pub async fn get_one(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Card>> {
    let card = get_card(&state.db, &user.user_id, id)
        .await?
        .ok_or(Error::NotFound { entity: "Card" })?;
    Ok(Json(card))
}

/// POST /api/brain-dump/cards
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>)> {
    let bucket_id = body
        .bucket_id
        .ok_or_else(|| Error::validation("bucketId is required"))?;

    let created = create_card(
        &state.db,
        &user.user_id,
        NewCard {
            title: body.title,
            content: body.content,
            labels: body.labels.unwrap_or_default(),
            is_actionable: body.is_actionable,
            priority: body.priority,
            reminder: body.reminder,
            ..NewCard::in_bucket(bucket_id)
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/brain-dump/cards/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    let updated = update_card(
        &state.db,
        &user.user_id,
        id,
        CardUpdate {
            title: body.title,
            content: body.content,
            labels: body.labels,
            is_actionable: body.is_actionable,
            priority: body.priority,
            reminder: body.reminder,
            bucket_id: body.bucket_id,
        },
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/brain-dump/cards/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    delete_card(&state.db, &user.user_id, id).await?;
    Ok(Json(json!({ "message": "Card deleted successfully" })))
}

/// PUT /api/brain-dump/cards/{id}/move
pub async fn move_card(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<MoveCardRequest>,
) -> Result<Json<Card>> {
    let to_bucket_id = body
        .to_bucket_id
        .ok_or_else(|| Error::validation("toBucketId is required"))?;

    let moved = card::move_card(
        &state.db,
        &user.user_id,
        id,
        to_bucket_id,
        body.order.unwrap_or(0),
    )
    .await?;
    Ok(Json(moved))
}

/// PUT /api/brain-dump/cards/reorder
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ReorderCardsRequest>,
) -> Result<Json<Value>> {
    let (bucket_id, ordered_ids) = match (body.bucket_id, body.ordered_ids) {
        (Some(bucket_id), Some(ordered_ids)) => (bucket_id, ordered_ids),
        _ => return Err(Error::validation("bucketId and orderedIds are required")),
    };

    reorder_cards(&state.db, &user.user_id, bucket_id, &ordered_ids).await?;
    Ok(Json(json!({ "message": "Cards reordered successfully" })))
}
