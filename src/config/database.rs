//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Bucket, Card, IntakeSession};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/braindump.sqlite".to_string())
}

/// Establishes a connection to the database.
///
/// Absence of a reachable database is a fatal configuration error at startup,
/// not a per-call recoverable condition: callers propagate this error and exit.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Table creation is idempotent (`IF NOT EXISTS`), so this is safe to run on
/// every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut bucket_table = schema.create_table_from_entity(Bucket);
    let mut card_table = schema.create_table_from_entity(Card);
    let mut session_table = schema.create_table_from_entity(IntakeSession);

    db.execute(builder.build(bucket_table.if_not_exists()))
        .await?;
    db.execute(builder.build(card_table.if_not_exists())).await?;
    db.execute(builder.build(session_table.if_not_exists()))
        .await?;

    Ok(())
}
