//! Error types and axum `IntoResponse` implementation.
//!
//! Every error becomes a JSON body with an `error` message. Only not-found
//! and upstream failures carry extra fields.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The chat function produced no usable `responseBody`.
  #[error("No response from function")]
  Upstream { details: Value },

  /// Session creation was rejected and strict login checking is on.
  #[error("login rejected")]
  LoginRejected { details: Value },

  #[error("Not Found")]
  NotFound { path: String },

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("request body too large")]
  PayloadTooLarge,

  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{0}")]
  Core(#[from] parley_core::Error),

  #[error("{0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn backend<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Backend(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      Error::Upstream { details } => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "details": details })),
      )
        .into_response(),
      Error::LoginRejected { details } => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message, "details": details })),
      )
        .into_response(),
      Error::NotFound { path } => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message, "path": path })),
      )
        .into_response(),
      Error::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
      }
      Error::PayloadTooLarge => (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(json!({ "error": message })),
      )
        .into_response(),
      Error::Json(_) | Error::Core(_) | Error::Backend(_) => {
        tracing::error!(error = %message, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": message })),
        )
          .into_response()
      }
    }
  }
}
