//! Configuration management for database and application settings.

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};

/// Application configuration, resolved once at startup from the environment.
///
/// A missing `ANTHROPIC_API_KEY` is not fatal here: the extraction client
/// reports the failure per-call so the rest of the API keeps working.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// SeaORM connection string
    pub database_url: String,
    /// API key for the extraction model provider
    pub anthropic_api_key: Option<String>,
    /// Extraction model identifier
    pub claude_model: String,
    /// HS256 secret used to verify bearer tokens
    pub jwt_secret: String,
    /// Name of the Apple Reminders list cards are pushed into
    pub reminders_list: String,
}

/// Default extraction model when `CLAUDE_MODEL` is not set.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

/// Loads the application configuration from environment variables.
///
/// `JWT_SECRET` is the only hard requirement; everything else has a sensible
/// default or degrades gracefully.
pub fn load_app_configuration() -> Result<AppConfig> {
    let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| Error::Config {
        message: "JWT_SECRET environment variable is not set".to_string(),
    })?;

    let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
    if anthropic_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set - brain dump parsing will not work");
    }

    Ok(AppConfig {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string()),
        database_url: database::get_database_url(),
        anthropic_api_key,
        claude_model: std::env::var("CLAUDE_MODEL")
            .unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.to_string()),
        jwt_secret,
        reminders_list: std::env::var("REMINDERS_LIST").unwrap_or_else(|_| "Brain Dump".to_string()),
    })
}
