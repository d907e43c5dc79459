//! Handlers for `data/<collection>`.
//!
//! | Method   | Query              | Notes |
//! |----------|--------------------|-------|
//! | `GET`    | `tag?`, `offset?`  | Up to 100 documents, filtered on `intent_tag` when `tag` is set |
//! | `POST`   |                    | Body: attribute map; id generated by the backend |
//! | `PUT`    | `id`               | Body: partial attribute map, merged |
//! | `DELETE` | `id`               | Intents cascade, see [`crate::cascade`] |

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use parley_core::{Backend, Collection, ListQuery, query::LIST_LIMIT};
use serde_json::{Map, Value, json};

use super::DataParams;
use crate::{AppState, cascade, error::Error};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET data/<collection>[?tag=<tag>][&offset=<n>]`
pub async fn list<B>(
  state:      &AppState<B>,
  collection: Collection,
  params:     DataParams,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let mut query = ListQuery::new().limit(LIST_LIMIT);
  if let Some(offset) = params.offset.filter(|o| *o > 0) {
    query = query.offset(offset);
  }
  if let Some(tag) = params.tag.filter(|t| !t.is_empty()) {
    query = query.equal("intent_tag", tag);
  }

  let list = state
    .backend
    .list_documents(collection, &query)
    .await
    .map_err(Error::backend)?;
  Ok(Json(list).into_response())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST data/<collection>`
pub async fn create<B>(
  state:      &AppState<B>,
  collection: Collection,
  body:       Map<String, Value>,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let doc = state
    .backend
    .create_document(collection, body)
    .await
    .map_err(Error::backend)?;
  Ok(Json(doc).into_response())
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT data/<collection>?id=<id>`
pub async fn update<B>(
  state:      &AppState<B>,
  collection: Collection,
  id:         &str,
  body:       Map<String, Value>,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let doc = state
    .backend
    .update_document(collection, id, body)
    .await
    .map_err(Error::backend)?;
  Ok(Json(doc).into_response())
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE data/<collection>?id=<id>`
pub async fn delete<B>(
  state:      &AppState<B>,
  collection: Collection,
  id:         &str,
) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  let backend = state.backend.as_ref();
  match collection {
    Collection::Intents => {
      cascade::delete_intent(backend, id).await?;
    }
    other => {
      backend
        .delete_document(other, id)
        .await
        .map_err(Error::backend)?;
    }
  }
  Ok(Json(json!({ "status": "deleted" })).into_response())
}
