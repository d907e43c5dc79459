//! Routing proxy in front of the chat backend.
//!
//! Exposes an axum [`Router`] that normalizes inbound paths from every
//! hosting front-door, dispatches them over a fixed routing table, and
//! forwards the work to any [`Backend`].

pub mod cascade;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod path;
pub mod route;

pub use error::Error;

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  extract::{Request, State},
  http::Method,
  middleware,
  response::{IntoResponse, Response},
};
use parley_appwrite::BackendConfig;
use parley_core::Backend;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use handlers::{DataParams, chat, data, login, read_json_object, stats};
use path::{DEFAULT_PREFIXES, normalize_path};
use route::Route;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  /// Front-door prefixes stripped from every inbound path.
  #[serde(default = "default_route_prefixes")]
  pub route_prefixes:      Vec<String>,
  /// Function executed by `POST chat`.
  #[serde(default = "default_chat_function")]
  pub chat_function:       String,
  /// Answer rejected logins with 401 instead of a success envelope.
  #[serde(default)]
  pub strict_login_status: bool,
  pub backend:             BackendConfig,
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  5000
}

fn default_route_prefixes() -> Vec<String> {
  DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn default_chat_function() -> String {
  "chatbot_brain".to_string()
}

impl ServerConfig {
  /// Defaults for every field, talking to `backend`.
  pub fn new(backend: BackendConfig) -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      route_prefixes: default_route_prefixes(),
      chat_function: default_chat_function(),
      strict_login_status: false,
      backend,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<B> {
  pub backend: Arc<B>,
  pub config:  Arc<ServerConfig>,
}

impl<B> Clone for AppState<B> {
  fn clone(&self) -> Self {
    Self {
      backend: self.backend.clone(),
      config:  self.config.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the proxy [`Router`].
///
/// Every path reaches one dispatcher, since routes are only known after the
/// front-door prefix is stripped.
pub fn router<B>(state: AppState<B>) -> Router
where
  B: Backend + 'static,
{
  Router::new()
    .fallback(dispatch::<B>)
    .layer(middleware::map_response(cors::apply_headers))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn dispatch<B>(State(state): State<AppState<B>>, req: Request<Body>) -> Response
where
  B: Backend + 'static,
{
  let method = req.method().clone();
  let original = req.uri().path().to_owned();
  let path = normalize_path(&original, &state.config.route_prefixes);
  debug!(%original, normalized = %path, %method, "dispatch");

  if method == Method::OPTIONS {
    return cors::preflight();
  }

  match Route::parse(&method, &path) {
    Some(route) => handle(&state, route, req).await.into_response_or_err(),
    None => Error::NotFound { path }.into_response(),
  }
}

async fn handle<B>(state: &AppState<B>, route: Route, req: Request<Body>) -> Result<Response, Error>
where
  B: Backend + 'static,
{
  match route {
    Route::Ping => Ok(handlers::ping()),
    Route::Chat => {
      let body = read_json_object(req).await?;
      chat::handler(state, body).await
    }
    Route::Login => {
      let body = read_json_object(req).await?;
      login::handler(state, body).await
    }
    Route::Stats => stats::handler(state).await,
    Route::List(collection) => {
      let params = DataParams::from_uri(req.uri())?;
      data::list(state, collection, params).await
    }
    Route::Create(collection) => {
      let body = read_json_object(req).await?;
      data::create(state, collection, body).await
    }
    Route::Update(collection) => {
      let id = DataParams::from_uri(req.uri())?.require_id()?;
      let body = read_json_object(req).await?;
      data::update(state, collection, &id, body).await
    }
    Route::Delete(collection) => {
      let id = DataParams::from_uri(req.uri())?.require_id()?;
      data::delete(state, collection, &id).await
    }
  }
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, Error> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.into_response(),
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
