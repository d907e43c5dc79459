pub mod chat;
pub mod data;
pub mod login;
pub mod stats;

use axum::{
  body::Body,
  extract::{Query, Request},
  http::{Uri, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Query parameters understood by the `data/<collection>` routes.
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
  pub tag:    Option<String>,
  pub id:     Option<String>,
  /// Rows to skip before the page, for walking past the list cap.
  pub offset: Option<u32>,
}

impl DataParams {
  pub fn from_uri(uri: &Uri) -> Result<Self, Error> {
    let Query(params) = Query::<DataParams>::try_from_uri(uri)
      .map_err(|e| Error::BadRequest(e.body_text()))?;
    Ok(params)
  }

  /// The `id` parameter, which `PUT` and `DELETE` require.
  pub fn require_id(self) -> Result<String, Error> {
    self
      .id
      .filter(|id| !id.is_empty())
      .ok_or_else(|| Error::BadRequest("missing id query parameter".into()))
  }
}

async fn collect_body(req: Request<Body>) -> Result<Bytes, Error> {
  axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
    .await
    .map_err(|_| Error::PayloadTooLarge)
}

/// Read the request body as a JSON object. An empty body reads as `{}`.
pub async fn read_json_object(req: Request<Body>) -> Result<Map<String, Value>, Error> {
  let bytes = collect_body(req).await?;
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(Map::new());
  }
  match serde_json::from_slice(&bytes)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::BadRequest("request body must be a JSON object".into())),
  }
}

/// A 200 response whose body is already-encoded JSON text.
pub(crate) fn json_text(body: String) -> Response {
  ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// The literal health-check answer.
pub fn ping() -> Response {
  ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "pong-netlify-js").into_response()
}
