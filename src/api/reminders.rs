//! Apple Reminders endpoints.

use crate::{
    api::{AppState, auth::AuthUser},
    core::reminder::{push_batch as push_batch_core, push_card},
    errors::{Error, Result},
    services::apple_reminders::ReminderStatus,
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

/// Body for a single-card push.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    card_id: Option<i64>,
}

/// Body for a batch push.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBatchRequest {
    card_ids: Option<Vec<i64>>,
}

/// GET /api/brain-dump/reminders/status
pub async fn status(State(state): State<AppState>, _user: AuthUser) -> Json<ReminderStatus> {
    Json(state.reminders.check_status().await)
}

/// POST /api/brain-dump/reminders/push
pub async fn push(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PushRequest>,
) -> Result<Json<Value>> {
    let card_id = body
        .card_id
        .ok_or_else(|| Error::validation("cardId is required"))?;

    let (_, reminder_id) = push_card(
        &state.db,
        state.reminders.as_ref(),
        &user.user_id,
        card_id,
        &state.reminders_list,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "reminderId": reminder_id,
        "message": "Reminder created in Apple Reminders",
    })))
}

/// POST /api/brain-dump/reminders/push-batch
pub async fn push_batch(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PushBatchRequest>,
) -> Result<Json<Value>> {
    let card_ids = body
        .card_ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| Error::validation("cardIds array is required"))?;

    let outcome = push_batch_core(
        &state.db,
        state.reminders.as_ref(),
        &user.user_id,
        &card_ids,
        &state.reminders_list,
    )
    .await;

    Ok(Json(json!({
        "message": format!("Pushed {} of {} reminders", outcome.pushed, outcome.total),
        "results": outcome.results,
    })))
}
