//! List-query model shared by every [`Backend`](crate::Backend).
//!
//! Backends translate a [`ListQuery`] into their own wire format; the
//! in-memory backend evaluates it directly with [`ListQuery::matches`].

use crate::Document;

/// Page size the proxy uses for every list route.
pub const LIST_LIMIT: u32 = 100;

/// An attribute predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  /// `attribute == value`
  Equal { attribute: String, value: String },
}

impl Filter {
  pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
    Filter::Equal {
      attribute: attribute.into(),
      value:     value.into(),
    }
  }

  pub fn matches(&self, doc: &Document) -> bool {
    match self {
      Filter::Equal { attribute, value } => {
        if attribute == "$id" {
          return doc.id == *value;
        }
        doc.get_str(attribute) == Some(value.as_str())
      }
    }
  }
}

/// Parameters for [`Backend::list_documents`](crate::Backend::list_documents).
///
/// A `None` limit leaves the page size to the backend's default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
  pub limit:      Option<u32>,
  pub offset:     Option<u32>,
  pub filters:    Vec<Filter>,
  /// Attribute to sort on, newest/largest first.
  pub order_desc: Option<String>,
}

impl ListQuery {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn limit(mut self, limit: u32) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: u32) -> Self {
    self.offset = Some(offset);
    self
  }

  pub fn equal(
    mut self,
    attribute: impl Into<String>,
    value: impl Into<String>,
  ) -> Self {
    self.filters.push(Filter::equal(attribute, value));
    self
  }

  pub fn order_desc(mut self, attribute: impl Into<String>) -> Self {
    self.order_desc = Some(attribute.into());
    self
  }

  /// Shorthand for the `intent_tag = tag` filter used throughout.
  pub fn by_intent_tag(tag: impl Into<String>) -> Self {
    Self::new().equal("intent_tag", tag)
  }

  /// Whether `doc` satisfies every filter. Paging and ordering are ignored.
  pub fn matches(&self, doc: &Document) -> bool {
    self.filters.iter().all(|f| f.matches(doc))
  }
}
