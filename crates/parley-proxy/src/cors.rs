//! Permissive cross-origin headers, applied to every response.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Pre-flight answer. Headers are added by [`apply_headers`].
pub fn preflight() -> Response {
  StatusCode::OK.into_response()
}

/// Response middleware: add the CORS headers, and default the content type
/// to JSON when a handler did not set one.
pub async fn apply_headers(mut res: Response) -> Response {
  let headers = res.headers_mut();
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static(ALLOW_ORIGIN),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    HeaderValue::from_static(ALLOW_HEADERS),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_METHODS,
    HeaderValue::from_static(ALLOW_METHODS),
  );
  if !headers.contains_key(header::CONTENT_TYPE) {
    headers.insert(
      header::CONTENT_TYPE,
      HeaderValue::from_static("application/json"),
    );
  }
  res
}
