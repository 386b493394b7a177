//! Claude-backed idea extraction.
//!
//! Sends the raw brain dump to the Anthropic Messages API with a system
//! prompt that asks for a strict JSON `{"ideas": [...]}` payload, then
//! sanitizes whatever comes back. Model output is untrusted: every field is
//! coerced to its expected shape and a missing `ideas` array is the one
//! unrecoverable response.

use crate::entities::intake_session::ParsedIdea;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const MAX_TITLE_CHARS: usize = 80;
const MAX_LABEL_CHARS: usize = 20;

/// Result of a successful extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Sanitized ideas, in model output order
    pub ideas: Vec<ParsedIdea>,
    /// Model identifier that produced the ideas
    pub model: String,
    /// Wall-clock extraction time
    pub processing_time_ms: i64,
}

/// Turns free-form text into discrete ideas.
///
/// A trait seam so the intake pipeline and its tests do not depend on the
/// network.
#[async_trait]
pub trait IdeaExtractor: Send + Sync {
    /// Extracts ideas from `content`, steering bucket suggestions toward
    /// `bucket_names`.
    async fn extract(&self, content: &str, bucket_names: &[String]) -> Result<ExtractionOutcome>;
}

/// Extractor backed by the Anthropic Messages API.
pub struct ClaudeExtractor {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ClaudeExtractor {
    /// Creates an extractor against the production Anthropic endpoint.
    ///
    /// A missing key is tolerated here and reported per extraction call, so
    /// the rest of the application keeps working without one.
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_base_url(api_key, model, ANTHROPIC_API_URL.to_string())
    }

    /// Creates an extractor against an alternate endpoint (tests).
    pub fn with_base_url(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn system_prompt(bucket_names: &[String]) -> String {
        let bucket_list = if bucket_names.is_empty() {
            "Work, Music, Social, Motorcycles, Health, Ideas, Unsorted".to_string()
        } else {
            bucket_names.join(", ")
        };

        format!(
            r#"You are an AI assistant specialized in parsing brain dumps - stream-of-consciousness notes from voice recordings or rapid note-taking sessions. Your job is to:

1. IDENTIFY discrete ideas, tasks, and thoughts within a jumbled, context-switching text
2. SEPARATE them into individual, actionable items
3. CATEGORIZE each into one of the user's buckets: {bucket_list}
4. EXTRACT any time-bound elements (deadlines, reminders, scheduled items)
5. DETERMINE if each item is actionable (a todo) or just a note/thought

Rules:
- Preserve the original meaning and context
- Create concise titles (max 80 characters)
- Keep the full original text segment in the content field
- If uncertain about bucket, suggest "Unsorted"
- For dates/times, interpret relative terms like "tomorrow", "next week" based on current date
- Return ONLY valid JSON, no markdown code blocks or explanations
- Suggest 0-3 relevant labels per idea (short, lowercase, hyphenated)

Output format (JSON only):
{{
  "ideas": [
    {{
      "title": "Brief summary of the idea",
      "content": "Full original text segment from the brain dump",
      "suggestedBucket": "Work",
      "isActionable": true,
      "suggestedLabels": ["urgent", "project-x"],
      "suggestedReminder": "2025-12-26T09:00:00Z"
    }}
  ]
}}

If suggestedReminder is not applicable, omit it or set to null."#
        )
    }

    fn user_message(content: &str) -> String {
        let current_date = chrono::Utc::now().format("%Y-%m-%d");
        format!(
            "Current date: {current_date}\n\nBrain dump content:\n---\n{content}\n---\n\nParse this into discrete ideas and return JSON only."
        )
    }
}

#[async_trait]
impl IdeaExtractor for ClaudeExtractor {
    async fn extract(&self, content: &str, bucket_names: &[String]) -> Result<ExtractionOutcome> {
        let api_key = self.api_key.as_deref().ok_or_else(|| Error::Extraction {
            message: "ANTHROPIC_API_KEY is not configured".to_string(),
        })?;

        let started = std::time::Instant::now();
        let system = Self::system_prompt(bucket_names);
        let user = Self::user_message(content);

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                system: &system,
                messages: vec![Message {
                    role: "user",
                    content: &user,
                }],
            })
            .send()
            .await
            .map_err(|e| Error::Extraction {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction {
                message: format!("API request failed with status {status}: {body}"),
            });
        }

        let message: MessagesResponse =
            response.json().await.map_err(|e| Error::Extraction {
                message: e.to_string(),
            })?;

        let text = message
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .ok_or_else(|| Error::Extraction {
                message: "No text response from model".to_string(),
            })?;

        let ideas = parse_ideas_response(text)?;

        Ok(ExtractionOutcome {
            ideas,
            model: self.model.clone(),
            processing_time_ms: started.elapsed().as_millis() as i64,
        })
    }
}

/// Parses and sanitizes the model's JSON reply.
pub(crate) fn parse_ideas_response(text: &str) -> Result<Vec<ParsedIdea>> {
    let json_text = strip_code_fences(text);

    let parsed: Value = serde_json::from_str(json_text).map_err(|e| Error::Extraction {
        message: format!("Failed to parse model response: {e}"),
    })?;

    let ideas = parsed
        .get("ideas")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Extraction {
            message: "Invalid response format: missing ideas array".to_string(),
        })?;

    Ok(ideas.iter().map(sanitize_idea).collect())
}

/// Coerces one raw idea object into the persisted shape. Every field has a
/// safe default, so a partially malformed idea never fails the batch.
fn sanitize_idea(raw: &Value) -> ParsedIdea {
    let title: String = raw
        .get("title")
        .and_then(coerce_scalar)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let suggested_labels = raw
        .get("suggestedLabels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(coerce_scalar)
                .map(|l| l.to_lowercase().chars().take(MAX_LABEL_CHARS).collect())
                .collect()
        })
        .unwrap_or_default();

    ParsedIdea {
        title: title.chars().take(MAX_TITLE_CHARS).collect(),
        content: raw
            .get("content")
            .and_then(coerce_scalar)
            .unwrap_or_default(),
        suggested_bucket: raw
            .get("suggestedBucket")
            .and_then(coerce_scalar)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unsorted".to_string()),
        is_actionable: raw
            .get("isActionable")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        suggested_labels,
        suggested_reminder: raw
            .get("suggestedReminder")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// Renders a scalar JSON value as text, the way a loosely typed client
/// stringifies whatever the model emitted. Objects, arrays, and null are not
/// coerced.
fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strips a leading/trailing markdown code fence the model sometimes adds
/// despite the JSON-only instruction.
fn strip_code_fences(text: &str) -> &str {
    let mut trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix("```") {
        trimmed = rest;
    }
    trimmed.trim()
}
