//! `parley`: terminal dashboard for the chatbot admin proxy.
//!
//! # Usage
//!
//! ```
//! parley --url http://localhost:5000 login --email admin@example.com
//! parley overview
//! parley intent edit --tag greeting --patterns greeting.txt --responses replies.txt
//! parley intent add --tag rust --from-query "what is rust" --responses rust.txt
//! parley --config ~/.config/parley/config.toml threshold 75
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parley_cli::{
  ApiClient, ApiConfig, Dashboard, SessionContext,
  dashboard::{parse_lines, taught_patterns},
  render,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_FILE: &str = "~/.config/parley/session.json";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "parley", about = "Admin dashboard for the parley chatbot proxy")]
struct Args {
  /// Path to a TOML config file (url, session_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the proxy, front-door prefix included
  /// (default: http://localhost:5000).
  #[arg(long, env = "PARLEY_URL")]
  url: Option<String>,

  /// Where the login session is kept
  /// (default: ~/.config/parley/session.json).
  #[arg(long, env = "PARLEY_SESSION")]
  session_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Log in with an admin account.
  Login {
    #[arg(long)]
    email:    String,
    #[arg(long, env = "PARLEY_PASSWORD")]
    password: String,
  },
  /// Forget the stored session.
  Logout,
  /// Query totals, success rate and intent distribution.
  Overview,
  /// List intents with their pattern and response counts.
  Intents {
    /// Only show tags containing this text (case-insensitive).
    #[arg(long)]
    filter: Option<String>,
  },
  /// Inspect or change one intent.
  Intent {
    #[command(subcommand)]
    action: IntentAction,
  },
  /// Queries the bot could not match.
  Unanswered,
  /// Recent chat exchanges.
  Logs,
  /// Show or set the confidence threshold, as a percentage.
  Threshold {
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    percent: Option<u8>,
  },
  /// Send a message to the bot.
  Chat { message: String },
}

#[derive(Subcommand, Debug)]
enum IntentAction {
  /// Show the patterns and responses of an intent.
  Show {
    #[arg(long)]
    tag: String,
  },
  /// Create an intent from files holding one pattern or response per line.
  Add {
    #[arg(long)]
    tag:        String,
    /// An unanswered query to teach as a pattern; repeatable.
    #[arg(long = "from-query", value_name = "TEXT")]
    from_query: Vec<String>,
    #[arg(long, value_name = "FILE")]
    patterns:   Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    responses:  Option<PathBuf>,
  },
  /// Replace all patterns and responses of an intent.
  Edit {
    #[arg(long)]
    tag:       String,
    #[arg(long, value_name = "FILE")]
    patterns:  Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    responses: Option<PathBuf>,
  },
  /// Delete an intent together with its patterns, responses and embeddings.
  Delete {
    #[arg(long)]
    id: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  session_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(expand_tilde(path))
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  let session_file = args
    .session_file
    .or(file_cfg.session_file)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

  let client = ApiClient::new(api_config)?;
  let session = SessionContext::load(expand_tilde(&session_file))?;
  let mut dashboard = Dashboard::new(client, session);

  run(&mut dashboard, args.command).await
}

async fn run(dashboard: &mut Dashboard, command: Command) -> Result<()> {
  match command {
    Command::Login { email, password } => {
      let session = dashboard.login(&email, &password).await?;
      println!("Logged in as {}", session.display_name());
    }
    Command::Logout => {
      dashboard.logout()?;
      println!("Logged out");
    }
    Command::Overview => {
      let overview = dashboard.overview().await?;
      print!("{}", render::overview(&overview));
    }
    Command::Intents { filter } => {
      let rows = dashboard.intents(filter.as_deref()).await?;
      print!("{}", render::intents(&rows));
    }
    Command::Intent { action } => run_intent(dashboard, action).await?,
    Command::Unanswered => {
      let logs = dashboard.unanswered().await?;
      print!("{}", render::unanswered(&logs));
    }
    Command::Logs => {
      let logs = dashboard.logs().await?;
      print!("{}", render::logs(&logs));
    }
    Command::Threshold { percent: None } => match dashboard.threshold().await? {
      Some(setting) => println!("Confidence threshold: {}", setting.value),
      None => println!("Confidence threshold not set"),
    },
    Command::Threshold { percent: Some(percent) } => {
      let value = dashboard.set_threshold(percent).await?;
      println!("Confidence threshold updated to {value}");
    }
    Command::Chat { message } => {
      let reply = dashboard.chat(&message).await?;
      println!("{}", serde_json::to_string_pretty(&reply)?);
    }
  }
  Ok(())
}

async fn run_intent(dashboard: &Dashboard, action: IntentAction) -> Result<()> {
  match action {
    IntentAction::Show { tag } => {
      let detail = dashboard.intent(&tag).await?;
      print!("{}", render::intent_detail(&detail));
      return Ok(());
    }
    IntentAction::Add { tag, from_query, patterns, responses } => {
      let patterns = taught_patterns(&from_query, read_lines(patterns.as_deref())?);
      let responses = read_lines(responses.as_deref())?;
      dashboard.add_intent(&tag, &patterns, &responses).await?;
    }
    IntentAction::Edit { tag, patterns, responses } => {
      let patterns = read_lines(patterns.as_deref())?;
      let responses = read_lines(responses.as_deref())?;
      dashboard.edit_intent(&tag, &patterns, &responses).await?;
    }
    IntentAction::Delete { id } => dashboard.delete_intent(&id).await?,
  }

  // Show the refreshed knowledge base after every write.
  let rows = dashboard.intents(None).await?;
  print!("{}", render::intents(&rows));
  Ok(())
}

fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
  match path {
    Some(path) => {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
      Ok(parse_lines(&raw))
    }
    None => Ok(Vec::new()),
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
