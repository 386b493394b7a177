//! External service integrations.

/// Apple Reminders bridge via `osascript`
pub mod apple_reminders;
/// Claude-backed idea extraction
pub mod claude;
