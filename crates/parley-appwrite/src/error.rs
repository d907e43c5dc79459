//! Error type for `parley-appwrite`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The backend answered with a non-success status.
  #[error("backend returned {status}: {message}")]
  Status {
    status:  u16,
    message: String,
    body:    Value,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// Build a [`Error::Status`] from an Appwrite error payload
  /// (`{"message": ..., "code": ..., "type": ...}`).
  pub(crate) fn from_status(status: u16, body: Value) -> Self {
    let message = body
      .get("message")
      .and_then(Value::as_str)
      .map(str::to_owned)
      .unwrap_or_else(|| format!("unexpected response {body}"));
    Error::Status {
      status,
      message,
      body,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
