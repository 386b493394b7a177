//! HTTP API surface.
//!
//! Thin axum handlers over the core modules: extract, validate, delegate,
//! serialize. Every route except the reminders status probe is scoped to the
//! authenticated user.

/// Bearer token verification extractor
pub mod auth;
/// Bucket endpoints
pub mod buckets;
/// Card endpoints
pub mod cards;
/// Intake endpoints
pub mod intake;
/// Apple Reminders endpoints
pub mod reminders;

use crate::services::{apple_reminders::ReminderSync, claude::IdeaExtractor};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use jsonwebtoken::DecodingKey;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Upload size cap, matching the intake file limit.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: DatabaseConnection,
    /// Idea extraction backend
    pub extractor: Arc<dyn IdeaExtractor>,
    /// Reminder sync backend
    pub reminders: Arc<dyn ReminderSync>,
    /// Key for verifying bearer tokens
    pub jwt_key: Arc<DecodingKey>,
    /// Target Apple Reminders list
    pub reminders_list: Arc<str>,
}

/// Builds the application router with all routes and middleware attached.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/buckets", get(buckets::list).post(buckets::create))
        .route("/buckets/reorder", put(buckets::reorder))
        .route(
            "/buckets/{id}",
            put(buckets::update).delete(buckets::delete),
        )
        .route("/cards", get(cards::list).post(cards::create))
        .route("/cards/reorder", put(cards::reorder))
        .route(
            "/cards/{id}",
            get(cards::get_one).put(cards::update).delete(cards::delete),
        )
        .route("/cards/{id}/move", put(cards::move_card))
        .route("/intake/parse", post(intake::parse))
        .route("/intake/upload", post(intake::upload))
        .route("/intake/{id}", get(intake::get_session_handler))
        .route("/intake/{id}/confirm", post(intake::confirm))
        .route("/reminders/status", get(reminders::status))
        .route("/reminders/push", post(reminders::push))
        .route("/reminders/push-batch", post(reminders::push_batch));

    Router::new()
        .nest("/api/brain-dump", api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Result;
    use crate::test_utils::{MockExtractor, MockReminderSync, setup_test_db};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TEST_SECRET: &[u8] = b"test-secret";

    async fn test_router() -> Result<Router> {
        let db = setup_test_db().await?;
        Ok(router(AppState {
            db,
            extractor: Arc::new(MockExtractor::returning(Vec::new())),
            reminders: Arc::new(MockReminderSync::succeeding("id-1")),
            jwt_key: Arc::new(DecodingKey::from_secret(TEST_SECRET)),
            reminders_list: Arc::from("Brain Dump"),
        }))
    }

    fn bearer_token(sub: &str) -> String {
        #[derive(serde::Serialize)]
        struct Claims<'a> {
            sub: &'a str,
            exp: i64,
        }
        let claims = Claims {
            sub,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/brain-dump/buckets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/brain-dump/buckets")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[tokio::test]
    async fn test_first_bucket_listing_bootstraps_defaults() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/brain-dump/buckets")
                    .header(header::AUTHORIZATION, bearer_token("user1"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let buckets = body.as_array().unwrap();
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0]["name"], "Work");
        assert_eq!(buckets[6]["name"], "Unsorted");
        // Wire field is camelCase `order`, not the storage column name
        assert_eq!(buckets[6]["order"], 99);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_card_requires_bucket_id() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/brain-dump/cards")
                    .header(header::AUTHORIZATION, bearer_token("user1"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "title": "no bucket" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "bucketId is required");

        Ok(())
    }

    #[tokio::test]
    async fn test_parse_requires_content() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/brain-dump/intake/parse")
                    .header(header::AUTHORIZATION, bearer_token("user1"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Content is required");

        Ok(())
    }

    #[tokio::test]
    async fn test_reminders_status_reports_available() -> Result<()> {
        let app = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/brain-dump/reminders/status")
                    .header(header::AUTHORIZATION, bearer_token("user1"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["available"], true);

        Ok(())
    }
}
