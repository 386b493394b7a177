//! Core business logic modules.
//!
//! Each module exposes free async functions over a database connection;
//! handlers stay thin and all invariants live here.

/// Bucket management and default bootstrap
pub mod bucket;
/// Card CRUD, movement, and ordering
pub mod card;
/// Intake sessions: extraction and confirmation
pub mod intake;
/// Pushing card reminders to Apple Reminders
pub mod reminder;
