//! `POST login`: create an end-user session.
//!
//! By default the upstream status is not inspected: a rejected credential
//! still yields `{"status": "success", "session": <backend error>}`. Setting
//! `strict_login_status` turns a rejection into a 401.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use parley_core::Backend;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
struct LoginBody {
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

pub async fn handler<B>(
  state: &AppState<B>,
  body:  Map<String, Value>,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let LoginBody { email, password } = serde_json::from_value(Value::Object(body))?;

  let reply = state
    .backend
    .create_email_session(&email, &password)
    .await
    .map_err(Error::backend)?;

  if !reply.is_success() {
    if state.config.strict_login_status {
      return Err(Error::LoginRejected {
        details: reply.body,
      });
    }
    warn!(status = reply.status, "session creation rejected upstream");
  }

  Ok(Json(json!({ "status": "success", "session": reply.body })).into_response())
}
