//! [`MemoryBackend`]: an in-process [`Backend`] for tests and local runs.
//!
//! Mirrors the remote store closely enough to exercise the proxy: server
//! generated ids, a default page size of 25, newest-first ordering on
//! `$createdAt`, and user sessions that fail with a 401 payload. Every call is
//! recorded so tests can assert on the exact sequence the proxy issued.

use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
  Backend, Collection, Document, DocumentList, Error, ListQuery, Result,
  SessionReply,
};

/// Page size applied when a [`ListQuery`] carries no limit.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// `$createdAt` as the remote store writes it.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f+00:00";

/// A backend call, as observed by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  List { collection: Collection, query: ListQuery },
  Get { collection: Collection, id: String },
  Create { collection: Collection },
  Update { collection: Collection, id: String },
  Delete { collection: Collection, id: String },
  Execute { function_id: String, body: String },
  Session { email: String },
}

type FunctionHandler = Arc<dyn Fn(&str) -> Value + Send + Sync>;

#[derive(Default)]
struct Inner {
  collections: HashMap<Collection, Vec<Document>>,
  calls:       Vec<Call>,
  failing:     HashSet<Collection>,
  accounts:    HashMap<String, String>,
  functions:   HashMap<String, FunctionHandler>,
}

/// An in-memory document store, function runner and account service.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  // ── Setup ─────────────────────────────────────────────────────────────

  /// Insert a document without recording a call. Returns the stored copy.
  pub fn seed(&self, collection: Collection, fields: Value) -> Document {
    let fields = match fields {
      Value::Object(map) => map,
      _ => Map::new(),
    };
    self.lock().insert(collection, fields)
  }

  /// Register an account that [`Backend::create_email_session`] accepts.
  pub fn add_account(&self, email: &str, password: &str) {
    self
      .lock()
      .accounts
      .insert(email.to_owned(), password.to_owned());
  }

  /// Register a function. `handler` receives the raw execution body and
  /// returns the value placed in the execution's `responseBody`.
  pub fn add_function<F>(&self, function_id: &str, handler: F)
  where
    F: Fn(&str) -> Value + Send + Sync + 'static,
  {
    self
      .lock()
      .functions
      .insert(function_id.to_owned(), Arc::new(handler));
  }

  /// Make every subsequent list call on `collection` fail.
  pub fn fail_collection(&self, collection: Collection) {
    self.lock().failing.insert(collection);
  }

  // ── Inspection ────────────────────────────────────────────────────────

  pub fn documents(&self, collection: Collection) -> Vec<Document> {
    self
      .lock()
      .collections
      .get(&collection)
      .cloned()
      .unwrap_or_default()
  }

  pub fn calls(&self) -> Vec<Call> {
    self.lock().calls.clone()
  }

  pub fn clear_calls(&self) {
    self.lock().calls.clear();
  }
}

impl Inner {
  fn insert(&mut self, collection: Collection, fields: Map<String, Value>) -> Document {
    let mut fields = fields;
    fields.insert("$collectionId".into(), Value::String(collection.to_string()));
    fields
      .entry("$createdAt")
      .or_insert_with(|| Value::String(Utc::now().format(TIMESTAMP_FORMAT).to_string()));
    let doc = Document {
      id: Uuid::new_v4().simple().to_string(),
      fields,
    };
    self
      .collections
      .entry(collection)
      .or_default()
      .push(doc.clone());
    doc
  }

  fn find_mut(&mut self, collection: Collection, id: &str) -> Result<&mut Document> {
    self
      .collections
      .get_mut(&collection)
      .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
      .ok_or_else(|| Error::DocumentNotFound {
        collection,
        id: id.to_owned(),
      })
  }

  fn list(&self, collection: Collection, query: &ListQuery) -> DocumentList {
    let mut matching: Vec<Document> = self
      .collections
      .get(&collection)
      .map(|docs| docs.iter().filter(|d| query.matches(d)).cloned().collect())
      .unwrap_or_default();

    match query.order_desc.as_deref() {
      // Documents are stored in creation order.
      Some("$createdAt") => matching.reverse(),
      Some(attribute) => {
        matching.sort_by(|a, b| b.get_str(attribute).cmp(&a.get_str(attribute)))
      }
      None => {}
    }

    let total = matching.len() as u64;
    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as usize;
    let documents = matching.into_iter().skip(offset).take(limit).collect();

    DocumentList { total, documents }
  }
}

impl Backend for MemoryBackend {
  type Error = Error;

  async fn list_documents(
    &self,
    collection: Collection,
    query: &ListQuery,
  ) -> Result<DocumentList> {
    let mut inner = self.lock();
    inner.calls.push(Call::List {
      collection,
      query: query.clone(),
    });
    if inner.failing.contains(&collection) {
      return Err(Error::Unavailable(collection));
    }
    Ok(inner.list(collection, query))
  }

  async fn get_document(&self, collection: Collection, id: &str) -> Result<Document> {
    let mut inner = self.lock();
    inner.calls.push(Call::Get {
      collection,
      id: id.to_owned(),
    });
    inner.find_mut(collection, id).map(|d| d.clone())
  }

  async fn create_document(
    &self,
    collection: Collection,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let mut inner = self.lock();
    inner.calls.push(Call::Create { collection });
    Ok(inner.insert(collection, data))
  }

  async fn update_document(
    &self,
    collection: Collection,
    id: &str,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let mut inner = self.lock();
    inner.calls.push(Call::Update {
      collection,
      id: id.to_owned(),
    });
    let doc = inner.find_mut(collection, id)?;
    doc.fields.extend(data);
    Ok(doc.clone())
  }

  async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
    let mut inner = self.lock();
    inner.calls.push(Call::Delete {
      collection,
      id: id.to_owned(),
    });
    let docs = inner.collections.entry(collection).or_default();
    let before = docs.len();
    docs.retain(|d| d.id != id);
    if docs.len() == before {
      return Err(Error::DocumentNotFound {
        collection,
        id: id.to_owned(),
      });
    }
    Ok(())
  }

  async fn execute_function(&self, function_id: &str, body: String) -> Result<Value> {
    let handler = {
      let mut inner = self.lock();
      inner.calls.push(Call::Execute {
        function_id: function_id.to_owned(),
        body: body.clone(),
      });
      inner.functions.get(function_id).cloned()
    };

    let execution = match handler {
      Some(handler) => {
        let reply = handler(&body);
        let response_body = match reply {
          Value::String(s) => s,
          other => serde_json::to_string(&other)?,
        };
        json!({
          "$id": Uuid::new_v4().simple().to_string(),
          "functionId": function_id,
          "status": "completed",
          "responseStatusCode": 200,
          "responseBody": response_body,
          "errors": "",
        })
      }
      None => json!({
        "$id": Uuid::new_v4().simple().to_string(),
        "functionId": function_id,
        "status": "failed",
        "responseStatusCode": 500,
        "responseBody": "",
        "errors": format!("function {function_id} is not deployed"),
      }),
    };
    Ok(execution)
  }

  async fn create_email_session(&self, email: &str, password: &str) -> Result<SessionReply> {
    let mut inner = self.lock();
    inner.calls.push(Call::Session {
      email: email.to_owned(),
    });

    let accepted = inner
      .accounts
      .get(email)
      .is_some_and(|expected| expected == password);

    if accepted {
      Ok(SessionReply {
        status: 201,
        body:   json!({
          "$id": Uuid::new_v4().simple().to_string(),
          "$createdAt": Utc::now(),
          "userId": Uuid::new_v4().simple().to_string(),
          "provider": "email",
          "providerUid": email,
          "providerEmail": email,
          "current": true,
        }),
      })
    } else {
      Ok(SessionReply {
        status: 401,
        body:   json!({
          "message": "Invalid credentials. Please check the email and password.",
          "code": 401,
          "type": "user_invalid_credentials",
        }),
      })
    }
  }
}
