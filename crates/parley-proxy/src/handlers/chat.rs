//! `POST chat`: run the chat function and unwrap its reply.
//!
//! The execution endpoint takes the function's request body as a string, so
//! `{message}` is JSON-encoded once here and once more by the backend call.

use axum::response::Response;
use parley_core::Backend;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{AppState, error::Error, handlers::json_text};

pub async fn handler<B>(
  state: &AppState<B>,
  body:  Map<String, Value>,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let mut payload = Map::new();
  if let Some(message) = body.get("message") {
    payload.insert("message".into(), message.clone());
  }
  let payload = serde_json::to_string(&payload)?;

  let execution = state
    .backend
    .execute_function(&state.config.chat_function, payload)
    .await
    .map_err(Error::backend)?;

  match execution.get("responseBody").and_then(Value::as_str) {
    Some(reply) if !reply.is_empty() => Ok(json_text(reply.to_owned())),
    _ => {
      debug!(?execution, "chat function returned no response body");
      Err(Error::Upstream { details: execution })
    }
  }
}
