//! Bearer token verification.
//!
//! Tokens are HS256 JWTs whose `sub` claim identifies the user. The
//! extractor rejects with 401 before any handler logic runs, so handlers can
//! assume a verified identity.

use crate::api::AppState;
use crate::errors::Error;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

/// Extractor for authenticated requests.
///
/// Usage:
/// ```ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     // user.user_id is the verified token subject
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified `sub` claim of the bearer token
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Unauthorized {
                message: "Missing authorization header".to_string(),
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized {
                message: "Authorization header must be a Bearer token".to_string(),
            })?;

        let data =
            jsonwebtoken::decode::<Claims>(token, &state.jwt_key, &Validation::new(Algorithm::HS256))
                .map_err(|err| {
                    tracing::debug!(%err, "rejected bearer token");
                    Error::Unauthorized {
                        message: "Invalid or expired token".to_string(),
                    }
                })?;

        if data.claims.sub.is_empty() {
            return Err(Error::Unauthorized {
                message: "User ID not found in token".to_string(),
            });
        }

        Ok(AuthUser {
            user_id: data.claims.sub,
        })
    }
}
