//! The `Backend` trait: everything the proxy needs from the remote
//! backend-as-a-service.
//!
//! Implemented by `parley-appwrite` (HTTP) and [`crate::memory`] (in-process).
//! The proxy depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde_json::{Map, Value};

use crate::{Collection, Document, DocumentList, ListQuery, query::LIST_LIMIT};

/// Raw outcome of a session-creation call.
///
/// The status is kept alongside the payload because the login route decides
/// for itself whether a non-success status is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReply {
  pub status: u16,
  pub body:   Value,
}

impl SessionReply {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Abstraction over the document store, function runner and account service.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Documents ─────────────────────────────────────────────────────────

  /// List one page of documents matching `query`.
  fn list_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<DocumentList, Self::Error>> + Send + 'a;

  fn get_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  /// Create a document; the backend generates its id.
  fn create_document(
    &self,
    collection: Collection,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Merge `data` into an existing document.
  fn update_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  fn delete_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Functions ─────────────────────────────────────────────────────────

  /// Run `function_id` synchronously with `body` as its request body and
  /// return the raw execution record.
  ///
  /// When the backend refuses to run the function, its error payload is
  /// returned instead; only transport failures are errors.
  fn execute_function<'a>(
    &'a self,
    function_id: &'a str,
    body: String,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create an email/password session as the end user, not the service.
  ///
  /// A rejected credential is a successful call with a non-2xx
  /// [`SessionReply::status`]; only transport failures are errors.
  fn create_email_session<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<SessionReply, Self::Error>> + Send + 'a;
}

/// Fetch every document matching `query`, paging by [`LIST_LIMIT`].
///
/// Any limit or offset already on `query` is replaced.
pub async fn list_all<B: Backend>(
  backend: &B,
  collection: Collection,
  query: ListQuery,
) -> Result<Vec<Document>, B::Error> {
  let mut documents = Vec::new();
  let mut offset = 0u32;

  loop {
    let page_query = query.clone().limit(LIST_LIMIT).offset(offset);
    let page = backend.list_documents(collection, &page_query).await?;
    let fetched = page.documents.len();
    documents.extend(page.documents);

    if fetched < LIST_LIMIT as usize || documents.len() as u64 >= page.total {
      break;
    }
    offset += LIST_LIMIT;
  }

  Ok(documents)
}
