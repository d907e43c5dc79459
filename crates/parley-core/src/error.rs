//! Error types for `parley-core`.

use thiserror::Error;

use crate::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document {id} not found in {collection}")]
  DocumentNotFound { collection: Collection, id: String },

  #[error("collection {0} is unavailable")]
  Unavailable(Collection),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
