//! Admin workflows over the proxy: one method per dashboard view or action.

use anyhow::{Context, Result, bail};
use parley_core::{
  Collection, Document,
  entity::{Intent, LogEntry, Pattern, Response, SettingEntry},
};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
  client::ApiClient,
  overview::Overview,
  session::{Session, SessionContext},
};

/// An intent with the sizes of its pattern and response sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRow {
  pub intent:    Intent,
  pub patterns:  u64,
  pub responses: u64,
}

/// Everything the bot knows about one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDetail {
  pub intent:    Intent,
  pub patterns:  Vec<Pattern>,
  pub responses: Vec<Response>,
}

/// Split multi-line input into entries, dropping blank lines.
pub fn parse_lines(text: &str) -> Vec<String> {
  text
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(str::to_owned)
    .collect()
}

/// Patterns for a new intent taught from unanswered queries: each non-blank
/// query, trimmed, ahead of the patterns read from a file.
pub fn taught_patterns(queries: &[String], patterns: Vec<String>) -> Vec<String> {
  queries
    .iter()
    .map(|q| q.trim())
    .filter(|q| !q.is_empty())
    .map(str::to_owned)
    .chain(patterns)
    .collect()
}

/// Fraction string stored for a threshold percentage (`75` → `"0.75"`).
pub fn threshold_value(percent: u8) -> String {
  (f64::from(percent) / 100.0).to_string()
}

pub struct Dashboard {
  client:  ApiClient,
  session: SessionContext,
}

impl Dashboard {
  pub fn new(client: ApiClient, session: SessionContext) -> Self {
    Self { client, session }
  }

  pub fn session(&self) -> &SessionContext {
    &self.session
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Log in and keep the session if the backend issued one.
  pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session> {
    let payload = self.client.login(email, password).await?;
    self.session.establish(payload)
  }

  pub fn logout(&mut self) -> Result<()> {
    self.session.clear()
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub async fn overview(&self) -> Result<Overview> {
    self.session.require()?;
    let stats = self.client.stats().await?;
    let logs: Vec<LogEntry> = stats.logs.decode_all().context("decoding logs")?;
    Ok(Overview::compute(stats.logs.total, &logs, stats.intents.total))
  }

  /// Intents whose tag contains `filter`, ignoring case, with their counts.
  pub async fn intents(&self, filter: Option<&str>) -> Result<Vec<IntentRow>> {
    self.session.require()?;
    let needle = filter.map(str::to_lowercase).unwrap_or_default();

    let intents = self
      .client
      .list_all(Collection::Intents, None)
      .await?
      .iter()
      .map(Document::decode::<Intent>)
      .collect::<parley_core::Result<Vec<_>>>()
      .context("decoding intents")?;

    let mut rows = Vec::new();
    for intent in intents {
      if !intent.tag.to_lowercase().contains(&needle) {
        continue;
      }
      let (patterns, responses) = tokio::try_join!(
        self.client.list(Collection::Patterns, Some(&intent.tag)),
        self.client.list(Collection::Responses, Some(&intent.tag)),
      )?;
      rows.push(IntentRow {
        intent,
        patterns: patterns.total,
        responses: responses.total,
      });
    }
    Ok(rows)
  }

  pub async fn intent(&self, tag: &str) -> Result<IntentDetail> {
    self.session.require()?;
    let intent = self.find_intent(tag).await?;
    let (patterns, responses) = tokio::try_join!(
      self.client.list(Collection::Patterns, Some(tag)),
      self.client.list(Collection::Responses, Some(tag)),
    )?;
    Ok(IntentDetail {
      intent,
      patterns: patterns.decode_all().context("decoding patterns")?,
      responses: responses.decode_all().context("decoding responses")?,
    })
  }

  /// Logged exchanges the bot could not match.
  pub async fn unanswered(&self) -> Result<Vec<LogEntry>> {
    Ok(self.logs().await?.into_iter().filter(|l| !l.matched).collect())
  }

  pub async fn logs(&self) -> Result<Vec<LogEntry>> {
    self.session.require()?;
    let logs = self.client.list(Collection::Logs, None).await?;
    logs.decode_all().context("decoding logs")
  }

  /// The stored threshold setting, if one exists.
  pub async fn threshold(&self) -> Result<Option<SettingEntry>> {
    self.session.require()?;
    self
      .threshold_document()
      .await?
      .map(|doc| doc.decode().context("decoding threshold setting"))
      .transpose()
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  /// Create intent `tag` with one pattern per entry of `patterns` and one
  /// response per entry of `responses`.
  pub async fn add_intent(&self, tag: &str, patterns: &[String], responses: &[String]) -> Result<()> {
    self.session.require()?;
    let tag = tag.trim();
    if tag.is_empty() {
      bail!("intent tag must not be empty");
    }

    self
      .client
      .create(
        Collection::Intents,
        object(json!({ "tag": tag, "description": format!("Queries about {tag}") })),
      )
      .await?;
    self.write_texts(Collection::Patterns, tag, patterns).await?;
    self.write_texts(Collection::Responses, tag, responses).await
  }

  /// Replace every pattern and response of intent `tag`.
  ///
  /// Destructive: the old sets are deleted before the new ones are written,
  /// so a failure part-way leaves the intent partially filled.
  pub async fn edit_intent(&self, tag: &str, patterns: &[String], responses: &[String]) -> Result<()> {
    self.session.require()?;
    self.find_intent(tag).await?;

    self.drain(Collection::Patterns, tag).await?;
    self.drain(Collection::Responses, tag).await?;
    self.write_texts(Collection::Patterns, tag, patterns).await?;
    self.write_texts(Collection::Responses, tag, responses).await
  }

  /// Delete an intent; the proxy removes its dependants.
  pub async fn delete_intent(&self, id: &str) -> Result<()> {
    self.session.require()?;
    self.client.delete(Collection::Intents, id).await
  }

  /// Store `percent` as the threshold, returning the stored value.
  pub async fn set_threshold(&self, percent: u8) -> Result<String> {
    self.session.require()?;
    if percent > 100 {
      bail!("threshold must be between 0 and 100, got {percent}");
    }
    let value = threshold_value(percent);

    match self.threshold_document().await? {
      Some(doc) => {
        self
          .client
          .update(Collection::Settings, &doc.id, object(json!({ "value": value })))
          .await?;
      }
      None => {
        self
          .client
          .create(
            Collection::Settings,
            object(json!({ "key": SettingEntry::THRESHOLD, "value": value })),
          )
          .await?;
      }
    }
    Ok(value)
  }

  /// Send `message` through the chat route. Needs no session.
  pub async fn chat(&self, message: &str) -> Result<Value> {
    self.client.chat(message).await
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn find_intent(&self, tag: &str) -> Result<Intent> {
    let intents = self.client.list_all(Collection::Intents, None).await?;
    match intents.iter().find(|d| d.get_str("tag") == Some(tag)) {
      Some(doc) => doc.decode().context("decoding intent"),
      None => bail!("no intent tagged {tag:?}"),
    }
  }

  async fn threshold_document(&self) -> Result<Option<Document>> {
    let settings = self.client.list_all(Collection::Settings, None).await?;
    Ok(
      settings
        .into_iter()
        .find(|d| d.get_str("key") == Some(SettingEntry::THRESHOLD)),
    )
  }

  /// Delete every document of `collection` tagged `tag`, one page at a
  /// time, until a list comes back empty.
  async fn drain(&self, collection: Collection, tag: &str) -> Result<()> {
    let mut previous = None;
    loop {
      let page = self.client.list(collection, Some(tag)).await?;
      if page.documents.is_empty() {
        return Ok(());
      }
      if previous.is_some_and(|total| page.total >= total) {
        bail!("{collection} for {tag:?} are not being removed");
      }
      previous = Some(page.total);

      debug!(%collection, %tag, count = page.documents.len(), "clearing");
      for doc in &page.documents {
        self.client.delete(collection, &doc.id).await?;
      }
    }
  }

  async fn write_texts(&self, collection: Collection, tag: &str, texts: &[String]) -> Result<()> {
    for text in texts {
      self
        .client
        .create(collection, object(json!({ "text": text, "intent_tag": tag })))
        .await?;
    }
    Ok(())
  }
}

fn object(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_lines_are_dropped() {
    assert_eq!(parse_lines("hi\n\n  \nhello there\r\n"), vec![
      "hi".to_string(),
      "hello there".to_string(),
    ]);
    assert!(parse_lines("").is_empty());
  }

  #[test]
  fn taught_queries_lead_the_patterns() {
    let queries = vec!["  what is rust ".to_string(), " ".to_string()];
    assert_eq!(taught_patterns(&queries, vec!["rust?".to_string()]), vec![
      "what is rust".to_string(),
      "rust?".to_string(),
    ]);
    assert!(taught_patterns(&[], Vec::new()).is_empty());
  }

  #[test]
  fn threshold_is_stored_as_a_fraction() {
    assert_eq!(threshold_value(75), "0.75");
    assert_eq!(threshold_value(80), "0.8");
    assert_eq!(threshold_value(100), "1");
    assert_eq!(threshold_value(0), "0");
  }
}
