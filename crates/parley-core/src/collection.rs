//! The fixed set of document collections the proxy administers.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A named collection in the remote document store.
///
/// The string form (`"intents"`, `"patterns"`, …) is the collection id used
/// both in proxy routes (`data/<collection>`) and in backend URLs.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  Intents,
  Patterns,
  Responses,
  Embeddings,
  Logs,
  Settings,
}

impl Collection {
  /// Collections whose documents reference an intent by `intent_tag`, in the
  /// order a cascading delete drains them.
  pub const CASCADE_CHILDREN: [Collection; 3] =
    [Collection::Patterns, Collection::Responses, Collection::Embeddings];
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn string_form_round_trips() {
    for c in Collection::iter() {
      assert_eq!(Collection::from_str(c.as_ref()).unwrap(), c);
    }
    assert_eq!(Collection::Embeddings.to_string(), "embeddings");
  }

  #[test]
  fn unknown_name_is_rejected() {
    assert!(Collection::from_str("users").is_err());
    assert!(Collection::from_str("Intents").is_err());
  }
}
