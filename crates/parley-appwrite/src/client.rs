//! [`AppwriteBackend`], the Appwrite REST implementation of [`Backend`].

use std::{sync::Arc, time::Duration};

use parley_core::{
  Backend, Collection, Document, DocumentList, ListQuery, SessionReply,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{BackendConfig, Error, Result, query::encode_queries};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Async HTTP client for one Appwrite project.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct AppwriteBackend {
  client: Client,
  config: Arc<BackendConfig>,
}

impl AppwriteBackend {
  pub fn new(config: BackendConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      config: Arc::new(config),
    })
  }

  pub fn config(&self) -> &BackendConfig {
    &self.config
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
  }

  fn documents_url(&self, collection: Collection) -> String {
    self.url(&format!(
      "/databases/{}/collections/{}/documents",
      self.config.database_id, collection
    ))
  }

  fn document_url(&self, collection: Collection, id: &str) -> String {
    format!("{}/{}", self.documents_url(collection), id)
  }

  /// Attach the headers every service call carries.
  fn service(&self, req: RequestBuilder) -> RequestBuilder {
    let req = req.header(PROJECT_HEADER, &self.config.project_id);
    match &self.config.api_key {
      Some(key) => req.header(KEY_HEADER, key),
      None => req,
    }
  }

  async fn send(&self, req: RequestBuilder) -> Result<Response> {
    let resp = self.service(req).send().await?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    Err(Error::from_status(status.as_u16(), body))
  }

  async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = self.send(req).await?;
    Ok(resp.json().await?)
  }
}

impl Backend for AppwriteBackend {
  type Error = Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn list_documents(
    &self,
    collection: Collection,
    query: &ListQuery,
  ) -> Result<DocumentList> {
    let params: Vec<(&str, String)> = encode_queries(query)
      .into_iter()
      .map(|q| ("queries[]", q))
      .collect();
    debug!(%collection, ?params, "list documents");
    self
      .send_json(self.client.get(self.documents_url(collection)).query(&params))
      .await
  }

  async fn get_document(&self, collection: Collection, id: &str) -> Result<Document> {
    self
      .send_json(self.client.get(self.document_url(collection, id)))
      .await
  }

  async fn create_document(
    &self,
    collection: Collection,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let body = json!({ "documentId": "unique()", "data": data });
    self
      .send_json(self.client.post(self.documents_url(collection)).json(&body))
      .await
  }

  async fn update_document(
    &self,
    collection: Collection,
    id: &str,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let body = json!({ "data": data });
    self
      .send_json(self.client.patch(self.document_url(collection, id)).json(&body))
      .await
  }

  async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
    debug!(%collection, id, "delete document");
    self
      .send(self.client.delete(self.document_url(collection, id)))
      .await?;
    Ok(())
  }

  // ── Functions ─────────────────────────────────────────────────────────────

  /// A rejected execution is not an error: its error payload is returned in
  /// place of the execution record, so callers can report it as the
  /// function's diagnostic.
  async fn execute_function(&self, function_id: &str, body: String) -> Result<Value> {
    let url = self.url(&format!("/functions/{function_id}/executions"));
    let resp = self
      .service(self.client.post(url).json(&json!({ "body": body })))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      debug!(%status, function_id, "function execution rejected");
    }
    Ok(resp.json::<Value>().await.unwrap_or(Value::Null))
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_email_session(&self, email: &str, password: &str) -> Result<SessionReply> {
    let resp = self
      .client
      .post(self.url("/account/sessions/email"))
      .header(PROJECT_HEADER, &self.config.project_id)
      .json(&json!({ "email": email, "password": password }))
      .send()
      .await?;

    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    Ok(SessionReply { status, body })
  }
}
