//! Encoding of [`ListQuery`] into Appwrite `queries[]` parameters.
//!
//! Each query is a JSON object such as
//! `{"method":"equal","attribute":"intent_tag","values":["greeting"]}`.

use parley_core::{Filter, ListQuery};
use serde_json::json;

/// Encode `query` as the ordered list of `queries[]` values:
/// limit, offset, filters, then ordering.
pub fn encode_queries(query: &ListQuery) -> Vec<String> {
  let mut out = Vec::new();

  if let Some(limit) = query.limit {
    out.push(json!({ "method": "limit", "values": [limit] }).to_string());
  }
  if let Some(offset) = query.offset {
    out.push(json!({ "method": "offset", "values": [offset] }).to_string());
  }
  for filter in &query.filters {
    match filter {
      Filter::Equal { attribute, value } => out.push(
        json!({ "method": "equal", "attribute": attribute, "values": [value] })
          .to_string(),
      ),
    }
  }
  if let Some(attribute) = &query.order_desc {
    out.push(json!({ "method": "orderDesc", "attribute": attribute }).to_string());
  }

  out
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;

  fn parsed(query: &ListQuery) -> Vec<Value> {
    encode_queries(query)
      .iter()
      .map(|s| serde_json::from_str(s).unwrap())
      .collect()
  }

  #[test]
  fn empty_query_encodes_nothing() {
    assert!(encode_queries(&ListQuery::new()).is_empty());
  }

  #[test]
  fn tag_filter_follows_limit() {
    let q = ListQuery::new().limit(100).equal("intent_tag", "greeting");
    assert_eq!(parsed(&q), vec![
      json!({ "method": "limit", "values": [100] }),
      json!({ "method": "equal", "attribute": "intent_tag", "values": ["greeting"] }),
    ]);
  }

  #[test]
  fn stats_logs_query() {
    let q = ListQuery::new().limit(100).order_desc("$createdAt");
    assert_eq!(parsed(&q), vec![
      json!({ "method": "limit", "values": [100] }),
      json!({ "method": "orderDesc", "attribute": "$createdAt" }),
    ]);
  }

  #[test]
  fn offset_is_encoded_after_limit() {
    let q = ListQuery::new().limit(100).offset(200);
    assert_eq!(parsed(&q)[1], json!({ "method": "offset", "values": [200] }));
  }
}
