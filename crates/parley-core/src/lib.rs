//! Core types and trait definitions for Parley.
//!
//! This crate has no HTTP dependencies. The proxy, the backend client and
//! the dashboard all build on it.

pub mod backend;
pub mod collection;
pub mod document;
pub mod entity;
pub mod error;
pub mod memory;
pub mod query;

pub use backend::{Backend, SessionReply};
pub use collection::Collection;
pub use document::{Document, DocumentList};
pub use error::{Error, Result};
pub use query::{Filter, ListQuery};
