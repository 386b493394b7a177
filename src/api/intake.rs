//! Intake endpoints.
//!
//! `parse` and `upload` share one quirk worth knowing: when extraction fails
//! the session still exists (status `failed`), so the 500 body carries the
//! session id for later inspection.

use crate::{
    api::{AppState, auth::AuthUser},
    core::intake::{ConfirmedIdea, confirm_session, get_session, run_extraction, start_session},
    entities::intake_session::Model as IntakeSession,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

const ALLOWED_CONTENT_TYPES: [&str; 3] = ["text/plain", "text/markdown", "text/x-markdown"];
const ALLOWED_EXTENSIONS: [&str; 3] = [".txt", ".md", ".markdown"];

/// Body for text-based intake.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    content: Option<String>,
}

/// Body for intake confirmation.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    ideas: Option<Vec<ConfirmedIdea>>,
}

/// POST /api/brain-dump/intake/parse
pub async fn parse(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ParseRequest>,
) -> Result<Response> {
    let content = body
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::validation("Content is required"))?;

    let session = start_session(&state.db, &user.user_id, content, None).await?;
    Ok(extract_and_respond(&state, &user.user_id, session).await)
}

/// POST /api/brain-dump/intake/upload
///
/// Accepts one multipart `file` field holding a plain-text or markdown file.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut uploaded: Option<(String, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::validation(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let extension_ok = ALLOWED_EXTENSIONS
            .iter()
            .any(|ext| filename.to_lowercase().ends_with(ext));
        let content_type_ok = field
            .content_type()
            .is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct));
        if !extension_ok && !content_type_ok {
            return Err(Error::validation("Only .txt and .md files are allowed"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|err| Error::validation(err.to_string()))?;
        uploaded = Some((String::from_utf8_lossy(&bytes).into_owned(), filename));
        break;
    }

    let (content, filename) = uploaded.ok_or_else(|| Error::validation("File is required"))?;
    let session = start_session(&state.db, &user.user_id, content, Some(filename)).await?;
    Ok(extract_and_respond(&state, &user.user_id, session).await)
}

/// GET /api/brain-dump/intake/{id}
pub async fn get_session_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<IntakeSession>> {
    let session = get_session(&state.db, &user.user_id, id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Intake session",
        })?;
    Ok(Json(session))
}

/// POST /api/brain-dump/intake/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<serde_json::Value>> {
    let ideas = body
        .ideas
        .ok_or_else(|| Error::validation("ideas array is required"))?;

    let cards = confirm_session(&state.db, &user.user_id, id, ideas).await?;
    Ok(Json(json!({
        "message": format!("Created {} cards", cards.len()),
        "cards": cards,
    })))
}

/// Runs extraction for a fresh session, turning an extraction failure into a
/// 500 that still names the session.
async fn extract_and_respond(state: &AppState, user_id: &str, session: IntakeSession) -> Response {
    let session_id = session.id;
    match run_extraction(&state.db, state.extractor.as_ref(), user_id, session).await {
        Ok(updated) => Json(updated).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string(), "sessionId": session_id })),
        )
            .into_response(),
    }
}
