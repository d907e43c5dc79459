//! Async HTTP client wrapping the parley proxy.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use parley_core::{Collection, Document, DocumentList};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Connection settings for the proxy.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Everything before the route, front-door prefix included
  /// (`https://site.example/api`).
  pub base_url: String,
}

/// Both reads behind the overview screen.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsPayload {
  pub logs:    DocumentList,
  pub intents: DocumentList,
}

#[derive(Deserialize)]
struct LoginEnvelope {
  status:  String,
  #[serde(default)]
  session: Value,
}

/// Async HTTP client for the proxy's JSON routes.
///
/// Cheap to clone, the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, route: &str) -> String {
    format!("{}/{}", self.config.base_url.trim_end_matches('/'), route)
  }

  fn request(&self, method: Method, route: &str) -> RequestBuilder {
    self.client.request(method, self.url(route))
  }

  /// Send `req` and turn any non-2xx answer into an error carrying the
  /// proxy's `error` message.
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    let body: Value = resp.json().await.unwrap_or(Value::Null);
    match body.get("error").and_then(Value::as_str) {
      Some(message) => Err(anyhow!("{what} → {status}: {message}")),
      None => Err(anyhow!("{what} → {status}")),
    }
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET stats`
  pub async fn stats(&self) -> Result<StatsPayload> {
    let resp = self.send(self.request(Method::GET, "stats"), "GET stats").await?;
    resp.json().await.context("deserialising stats")
  }

  /// `POST chat`, returning whatever the chat function answered.
  pub async fn chat(&self, message: &str) -> Result<Value> {
    let req = self
      .request(Method::POST, "chat")
      .json(&json!({ "message": message }));
    let resp = self.send(req, "POST chat").await?;
    resp.json().await.context("deserialising chat reply")
  }

  /// `POST login`, returning the session payload inside the envelope.
  ///
  /// The payload may be an upstream error object; callers decide whether
  /// it is a usable session.
  pub async fn login(&self, email: &str, password: &str) -> Result<Value> {
    let req = self
      .request(Method::POST, "login")
      .json(&json!({ "email": email, "password": password }));
    let resp = self.send(req, "POST login").await?;
    let envelope: LoginEnvelope = resp.json().await.context("deserialising login reply")?;
    if envelope.status != "success" {
      return Err(anyhow!("login answered with status {:?}", envelope.status));
    }
    Ok(envelope.session)
  }

  // ── Data ──────────────────────────────────────────────────────────────────

  /// `GET data/<collection>[?tag=<tag>]`, the first page only.
  pub async fn list(&self, collection: Collection, tag: Option<&str>) -> Result<DocumentList> {
    self.list_from(collection, tag, 0).await
  }

  /// `GET data/<collection>[?tag=<tag>]&offset=<offset>`
  pub async fn list_from(
    &self,
    collection: Collection,
    tag: Option<&str>,
    offset: u64,
  ) -> Result<DocumentList> {
    let route = format!("data/{collection}");
    let mut req = self.request(Method::GET, &route);
    if let Some(tag) = tag {
      req = req.query(&[("tag", tag)]);
    }
    if offset > 0 {
      req = req.query(&[("offset", offset)]);
    }
    let resp = self.send(req, &format!("GET {route}")).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {collection}"))
  }

  /// Every document of `collection`, walking pages by offset until the
  /// reported total is reached or a page comes back empty.
  pub async fn list_all(&self, collection: Collection, tag: Option<&str>) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    loop {
      let page = self.list_from(collection, tag, documents.len() as u64).await?;
      let done = page.documents.is_empty();
      documents.extend(page.documents);
      if done || documents.len() as u64 >= page.total {
        return Ok(documents);
      }
    }
  }

  /// `POST data/<collection>`
  pub async fn create(&self, collection: Collection, data: Map<String, Value>) -> Result<Document> {
    let route = format!("data/{collection}");
    let req = self.request(Method::POST, &route).json(&data);
    let resp = self.send(req, &format!("POST {route}")).await?;
    resp.json().await.context("deserialising created document")
  }

  /// `PUT data/<collection>?id=<id>`
  pub async fn update(
    &self,
    collection: Collection,
    id: &str,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let route = format!("data/{collection}");
    let req = self
      .request(Method::PUT, &route)
      .query(&[("id", id)])
      .json(&data);
    let resp = self.send(req, &format!("PUT {route}")).await?;
    resp.json().await.context("deserialising updated document")
  }

  /// `DELETE data/<collection>?id=<id>`
  pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
    let route = format!("data/{collection}");
    let req = self.request(Method::DELETE, &route).query(&[("id", id)]);
    self.send(req, &format!("DELETE {route}")).await?;
    Ok(())
  }
}
