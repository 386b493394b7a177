//! Bucket endpoints.

use crate::{
    api::{AppState, auth::AuthUser},
    core::bucket::{
        BucketUpdate, NewBucket, create_bucket, delete_bucket, ensure_default_buckets,
        reorder_buckets, update_bucket,
    },
    entities::bucket::Model as Bucket,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Body for bucket creation.
#[derive(Debug, Deserialize)]
pub struct CreateBucketRequest {
    name: Option<String>,
    color: Option<String>,
}

/// Body for partial bucket update.
#[derive(Debug, Deserialize)]
pub struct UpdateBucketRequest {
    name: Option<String>,
    color: Option<String>,
    order: Option<i32>,
}

/// Body for bulk bucket reorder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBucketsRequest {
    ordered_ids: Option<Vec<i64>>,
}

/// GET /api/brain-dump/buckets
///
/// Bootstraps the default buckets on a user's first visit, so the client
/// always gets a non-empty board.
pub async fn list(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Bucket>>> {
    let buckets = ensure_default_buckets(&state.db, &user.user_id).await?;
    Ok(Json(buckets))
}

/// POST /api/brain-dump/buckets
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateBucketRequest>,
) -> Result<(StatusCode, Json<Bucket>)> {
    let name = body
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::validation("Bucket name is required"))?;

    let created = create_bucket(
        &state.db,
        &user.user_id,
        NewBucket {
            name: Some(name),
            color: body.color,
            order: None,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/brain-dump/buckets/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBucketRequest>,
) -> Result<Json<Bucket>> {
    let updated = update_bucket(
        &state.db,
        &user.user_id,
        id,
        BucketUpdate {
            name: body.name,
            color: body.color,
            order: body.order,
        },
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/brain-dump/buckets/{id}
///
/// Orphaned cards move to Unsorted rather than being destroyed.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    delete_bucket(&state.db, &user.user_id, id).await?;
    Ok(Json(json!({ "message": "Bucket deleted successfully" })))
}

/// PUT /api/brain-dump/buckets/reorder
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ReorderBucketsRequest>,
) -> Result<Json<Value>> {
    let ordered_ids = body
        .ordered_ids
        .ok_or_else(|| Error::validation("orderedIds must be an array"))?;

    reorder_buckets(&state.db, &user.user_id, &ordered_ids).await?;
    Ok(Json(json!({ "message": "Buckets reordered successfully" })))
}
