use braindump::{
    api::{self, AppState},
    config,
    errors::Result,
    services::{apple_reminders::AppleReminderSync, claude::ClaudeExtractor},
};
use dotenvy::dotenv;
use jsonwebtoken::DecodingKey;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = config::database::create_connection(&app_config.database_url).await?;
    config::database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Wire up external services and shared state
    let state = AppState {
        db,
        extractor: Arc::new(ClaudeExtractor::new(
            app_config.anthropic_api_key.clone(),
            app_config.claude_model.clone(),
        )),
        reminders: Arc::new(AppleReminderSync),
        jwt_key: Arc::new(DecodingKey::from_secret(app_config.jwt_secret.as_bytes())),
        reminders_list: Arc::from(app_config.reminders_list.as_str()),
    };

    // 6. Serve
    let listener = tokio::net::TcpListener::bind(&app_config.bind_addr).await?;
    info!("Listening on {}", app_config.bind_addr);
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
