//! Cascading delete of an intent across the collections that reference it.
//!
//! `intent_tag` is a copied string, not an enforced reference, and the store
//! has no transactions. Dependants are therefore removed one call at a time
//! before their owner: patterns, then responses, then embeddings, then the
//! intent. A failure part-way leaves the rows not yet deleted in place.

use parley_core::{
  Backend, Collection, Document, ListQuery,
  backend::list_all,
  entity::Intent,
};
use tracing::info;

use crate::error::Error;

/// Number of dependants removed with an intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
  pub patterns:   usize,
  pub responses:  usize,
  pub embeddings: usize,
}

/// Delete intent `id` and every pattern, response and embedding tagged with
/// its `tag`.
///
/// The three dependant collections are read concurrently; deletes are
/// issued sequentially.
pub async fn delete_intent<B: Backend>(backend: &B, id: &str) -> Result<CascadeReport, Error> {
  let intent: Intent = backend
    .get_document(Collection::Intents, id)
    .await
    .map_err(Error::backend)?
    .decode()?;

  let [patterns, responses, embeddings] = Collection::CASCADE_CHILDREN;
  let (pattern_docs, response_docs, embedding_docs) = tokio::try_join!(
    list_all(backend, patterns, ListQuery::by_intent_tag(&intent.tag)),
    list_all(backend, responses, ListQuery::by_intent_tag(&intent.tag)),
    list_all(backend, embeddings, ListQuery::by_intent_tag(&intent.tag)),
  )
  .map_err(Error::backend)?;

  let report = CascadeReport {
    patterns:   pattern_docs.len(),
    responses:  response_docs.len(),
    embeddings: embedding_docs.len(),
  };

  delete_each(backend, patterns, &pattern_docs).await?;
  delete_each(backend, responses, &response_docs).await?;
  delete_each(backend, embeddings, &embedding_docs).await?;

  backend
    .delete_document(Collection::Intents, id)
    .await
    .map_err(Error::backend)?;

  info!(
    intent = %id,
    tag = %intent.tag,
    patterns = report.patterns,
    responses = report.responses,
    embeddings = report.embeddings,
    "deleted intent"
  );
  Ok(report)
}

async fn delete_each<B: Backend>(
  backend:    &B,
  collection: Collection,
  docs:       &[Document],
) -> Result<(), Error> {
  for doc in docs {
    backend
      .delete_document(collection, &doc.id)
      .await
      .map_err(Error::backend)?;
  }
  Ok(())
}
