//! Apple Reminders bridge.
//!
//! Talks to the macOS Reminders app through `osascript`. The script is
//! passed as its own argv element rather than interpolated into a shell
//! string, so reminder text can never break out of the AppleScript literal
//! it is escaped into. Everything here is best-effort: failures come back as
//! a result payload, never as an error that would block card state.

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::process::Command;

/// Reminder to be created in the Reminders app.
#[derive(Debug, Clone)]
pub struct NewReminder {
    /// Reminder name
    pub title: String,
    /// Reminder body
    pub notes: String,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Target list, created if missing
    pub list_name: String,
}

/// Outcome of a single reminder creation attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOutcome {
    /// Whether the reminder was created
    pub success: bool,
    /// Identifier assigned by the Reminders app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<String>,
    /// Failure detail when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Availability probe result for the Reminders integration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    /// Whether the Reminders app responded
    pub available: bool,
    /// Names of the user's reminder lists, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<String>>,
    /// Failure detail when unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Pushes reminders to an external reminder store.
///
/// A trait seam so the push operations and their tests do not require a
/// macOS host.
#[async_trait]
pub trait ReminderSync: Send + Sync {
    /// Probes whether the reminder store is reachable.
    async fn check_status(&self) -> ReminderStatus;
    /// Creates one reminder, reporting failure in the outcome.
    async fn create_reminder(&self, input: &NewReminder) -> ReminderOutcome;
}

/// `ReminderSync` implementation backed by `osascript`.
#[derive(Debug, Clone, Default)]
pub struct AppleReminderSync;

#[async_trait]
impl ReminderSync for AppleReminderSync {
    async fn check_status(&self) -> ReminderStatus {
        match run_osascript("tell application \"Reminders\" to return name of lists").await {
            Ok(stdout) => ReminderStatus {
                available: true,
                lists: Some(
                    stdout
                        .split(", ")
                        .map(|name| name.trim().to_string())
                        .collect(),
                ),
                error: None,
            },
            Err(error) => ReminderStatus {
                available: false,
                lists: None,
                error: Some(error),
            },
        }
    }

    async fn create_reminder(&self, input: &NewReminder) -> ReminderOutcome {
        let script = build_create_script(input);
        match run_osascript(&script).await {
            Ok(stdout) => ReminderOutcome {
                success: true,
                reminder_id: Some(stdout),
                error: None,
            },
            Err(error) => {
                tracing::error!(title = %input.title, %error, "failed to create reminder");
                ReminderOutcome {
                    success: false,
                    reminder_id: None,
                    error: Some(error),
                }
            }
        }
    }
}

async fn run_osascript(script: &str) -> std::result::Result<String, String> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(|e| e.to_string())?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(if stderr.is_empty() {
            format!("osascript exited with {}", output.status)
        } else {
            stderr
        })
    }
}

/// Builds the AppleScript that creates the reminder, making the target list
/// first if it does not exist yet.
fn build_create_script(input: &NewReminder) -> String {
    let title = escape_applescript(&input.title);
    let notes = escape_applescript(&input.notes);
    let list_name = escape_applescript(&input.list_name);

    let mut script = format!(
        r#"tell application "Reminders"
    try
        set targetList to list "{list_name}"
    on error
        make new list with properties {{name:"{list_name}"}}
        set targetList to list "{list_name}"
    end try

    set newReminder to make new reminder at end of targetList with properties {{name:"{title}", body:"{notes}"}}
"#
    );

    if let Some(due) = input.due_date {
        let date_str = format_applescript_date(&due.with_timezone(&Local));
        script.push_str(&format!(
            "    set due date of newReminder to date \"{date_str}\"\n"
        ));
    }

    script.push_str("    return id of newReminder\nend tell\n");
    script
}

/// Escapes a string for inclusion in an AppleScript double-quoted literal.
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Formats a date the way AppleScript's `date` constructor expects,
/// e.g. `December 25, 2025 at 9:00:00 AM`.
fn format_applescript_date<Tz: chrono::TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y at %-I:%M:%S %p").to_string()
}
