//! The fixed routing table, keyed by method and normalized path.

use axum::http::Method;
use parley_core::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  /// `ping`, any method.
  Ping,
  /// `POST chat`
  Chat,
  /// `POST login`
  Login,
  /// `GET stats`
  Stats,
  /// `GET data/<collection>[?tag=]`
  List(Collection),
  /// `POST data/<collection>`
  Create(Collection),
  /// `PUT data/<collection>?id=`
  Update(Collection),
  /// `DELETE data/<collection>?id=`
  Delete(Collection),
}

impl Route {
  /// Match a normalized path. `None` means not found.
  pub fn parse(method: &Method, path: &str) -> Option<Self> {
    if path == "ping" {
      return Some(Route::Ping);
    }
    match (method.as_str(), path) {
      ("POST", "chat") => Some(Route::Chat),
      ("POST", "login") => Some(Route::Login),
      ("GET", "stats") => Some(Route::Stats),
      _ => {
        let collection: Collection = path.strip_prefix("data/")?.parse().ok()?;
        match *method {
          Method::GET => Some(Route::List(collection)),
          Method::POST => Some(Route::Create(collection)),
          Method::PUT => Some(Route::Update(collection)),
          Method::DELETE => Some(Route::Delete(collection)),
          _ => None,
        }
      }
    }
  }
}
