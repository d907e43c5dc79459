//! Documents as the remote store returns them.
//!
//! A document is an open attribute map plus the store's `$id`. Every other
//! metadata attribute, `$createdAt` included, stays in the map verbatim so
//! the proxy relays it exactly as the store wrote it. Typed views live in
//! [`crate::entity`].

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::Result;

/// A single stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  #[serde(rename = "$id")]
  pub id:     String,
  /// Every other attribute, including store metadata such as
  /// `$createdAt` and `$collectionId` that the proxy passes through
  /// untouched.
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Document {
  /// String value of attribute `key`, if present and a string.
  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.fields.get(key).and_then(Value::as_str)
  }

  /// Decode the document into a typed entity.
  pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
    Ok(serde_json::from_value(serde_json::to_value(self)?)?)
  }
}

/// One page of a list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
  /// Number of documents matching the filters, ignoring limit and offset.
  pub total:     u64,
  pub documents: Vec<Document>,
}

impl DocumentList {
  /// Decode every document, failing on the first that does not fit `T`.
  pub fn decode_all<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
    self.documents.iter().map(Document::decode).collect()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::entity::Pattern;

  #[test]
  fn metadata_and_fields_are_split() {
    let doc: Document = serde_json::from_value(json!({
      "$id": "abc",
      "$createdAt": "2025-01-02T03:04:05.000+00:00",
      "$collectionId": "patterns",
      "text": "hello",
      "intent_tag": "greeting",
    }))
    .unwrap();

    assert_eq!(doc.id, "abc");
    assert_eq!(doc.get_str("$createdAt"), Some("2025-01-02T03:04:05.000+00:00"));
    assert_eq!(doc.get_str("text"), Some("hello"));
    assert_eq!(doc.get_str("$collectionId"), Some("patterns"));
    assert_eq!(doc.get_str("missing"), None);

    let back = serde_json::to_value(&doc).unwrap();
    assert_eq!(back["$id"], "abc");
    assert_eq!(back["intent_tag"], "greeting");
    assert_eq!(back["$createdAt"], "2025-01-02T03:04:05.000+00:00");
  }

  #[test]
  fn odd_timestamps_are_kept_verbatim() {
    let raw = json!({ "$id": "a", "$createdAt": "yesterday", "query": "hi" });
    let doc: Document = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
  }

  #[test]
  fn decode_into_entity() {
    let doc: Document = serde_json::from_value(json!({
      "$id": "p1",
      "text": "hi there",
      "intent_tag": "greeting",
    }))
    .unwrap();

    let pattern: Pattern = doc.decode().unwrap();
    assert_eq!(pattern.id, "p1");
    assert_eq!(pattern.text, "hi there");
    assert_eq!(pattern.intent_tag, "greeting");
  }
}
