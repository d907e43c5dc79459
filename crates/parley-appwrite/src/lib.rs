//! Appwrite backend for Parley.
//!
//! [`AppwriteBackend`] implements [`parley_core::Backend`] over Appwrite's
//! REST API with [`reqwest`]. Service calls carry the project id and, when
//! configured, the API key; session creation carries only the project id.

mod client;
mod config;
mod query;

pub mod error;

pub use client::AppwriteBackend;
pub use config::BackendConfig;
pub use error::{Error, Result};
pub use query::encode_queries;
