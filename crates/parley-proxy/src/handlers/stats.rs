//! `GET stats`: recent logs and intents in one response.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use parley_core::{Backend, Collection, ListQuery, query::LIST_LIMIT};
use serde_json::json;

use crate::{AppState, error::Error};

pub async fn handler<B>(state: &AppState<B>) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let logs_query = ListQuery::new().limit(LIST_LIMIT).order_desc("$createdAt");
  let intents_query = ListQuery::new().limit(LIST_LIMIT);

  let (logs, intents) = tokio::try_join!(
    state.backend.list_documents(Collection::Logs, &logs_query),
    state.backend.list_documents(Collection::Intents, &intents_query),
  )
  .map_err(Error::backend)?;

  Ok(Json(json!({ "logs": logs, "intents": intents })).into_response())
}
