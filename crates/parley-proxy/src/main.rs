//! parley-proxy server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers the
//! environment on top, and serves the proxy over HTTP in front of Appwrite.
//!
//! # Environment
//!
//! `APPWRITE_ENDPOINT`, `APPWRITE_PROJECT_ID` and `APPWRITE_API_KEY` fill the
//! `backend` table. Any other key can be set as `PARLEY_<KEY>`, with `__`
//! separating nested tables (`PARLEY_BACKEND__DATABASE_ID`).

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use parley_appwrite::AppwriteBackend;
use parley_proxy::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Parley routing proxy")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("PARLEY")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("route_prefixes"),
    )
    .set_override_option("backend.endpoint", std::env::var("APPWRITE_ENDPOINT").ok())?
    .set_override_option("backend.project_id", std::env::var("APPWRITE_PROJECT_ID").ok())?
    .set_override_option("backend.api_key", std::env::var("APPWRITE_API_KEY").ok())?
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.backend.api_key.is_none() {
    tracing::warn!("no backend API key configured; service calls will be rejected upstream");
  }

  let backend = AppwriteBackend::new(server_cfg.backend.clone())
    .context("failed to build backend client")?;

  let state = AppState {
    backend: Arc::new(backend),
    config:  Arc::new(server_cfg.clone()),
  };

  let app = parley_proxy::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
