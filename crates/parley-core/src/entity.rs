//! Typed views over the documents in each [`Collection`](crate::Collection).
//!
//! `intent_tag` is a denormalized copy of [`Intent::tag`], not an enforced
//! reference; see the cascade in `parley-proxy` for how orphans are avoided.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A named conversational category grouping patterns and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
  #[serde(rename = "$id")]
  pub id:          String,
  pub tag:         String,
  #[serde(default)]
  pub description: Option<String>,
}

/// An input phrasing belonging to an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
  #[serde(rename = "$id")]
  pub id:         String,
  pub text:       String,
  pub intent_tag: String,
}

/// An answer the bot may give for an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  #[serde(rename = "$id")]
  pub id:         String,
  pub text:       String,
  pub intent_tag: String,
}

/// A stored sentence embedding for one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embedding {
  #[serde(rename = "$id")]
  pub id:           String,
  pub intent_tag:   String,
  #[serde(default)]
  pub pattern_text: Option<String>,
  /// JSON-encoded vector.
  #[serde(default)]
  pub embedding:    Option<String>,
  #[serde(default)]
  pub model:        Option<String>,
}

/// One chat exchange, appended by the chat function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  #[serde(rename = "$id", default)]
  pub id:         String,
  #[serde(default)]
  pub query:      String,
  #[serde(default)]
  pub response:   String,
  #[serde(default)]
  pub intent_tag: Option<String>,
  #[serde(default)]
  pub matched:    bool,
  /// `None` when the store's timestamp is missing or unreadable.
  #[serde(rename = "$createdAt", default, deserialize_with = "lenient_timestamp")]
  pub created_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Value::deserialize(deserializer)?;
  Ok(
    raw
      .as_str()
      .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
      .map(|t| t.with_timezone(&Utc)),
  )
}

/// A key/value configuration row, one per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
  #[serde(rename = "$id")]
  pub id:    String,
  pub key:   String,
  pub value: String,
}

impl SettingEntry {
  /// Key of the chat confidence threshold setting.
  pub const THRESHOLD: &'static str = "threshold";
}
