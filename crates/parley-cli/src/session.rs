//! The logged-in admin session, kept in a small JSON file between runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session object returned by the backend's email login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  #[serde(rename = "$id")]
  pub id:             String,
  #[serde(rename = "userId", default)]
  pub user_id:        String,
  #[serde(rename = "providerEmail", default)]
  pub provider_email: Option<String>,
  #[serde(default)]
  pub expire:         Option<String>,
  #[serde(flatten)]
  pub extra:          Map<String, Value>,
}

impl Session {
  /// Name shown in the dashboard header.
  pub fn display_name(&self) -> &str {
    self.provider_email.as_deref().unwrap_or("Admin")
  }
}

/// Process-wide holder of the current [`Session`].
///
/// Every dashboard command other than login goes through [`require`]
/// first.
///
/// [`require`]: SessionContext::require
#[derive(Debug, Default)]
pub struct SessionContext {
  path:    Option<PathBuf>,
  current: Option<Session>,
}

impl SessionContext {
  /// A context that is never written to disk.
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Load the session stored at `path`, if any.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let current = match std::fs::read_to_string(&path) {
      Ok(raw) => Some(
        serde_json::from_str(&raw)
          .with_context(|| format!("parsing session file {}", path.display()))?,
      ),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(e) => {
        return Err(e).with_context(|| format!("reading session file {}", path.display()));
      }
    };
    Ok(Self { path: Some(path), current })
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn current(&self) -> Option<&Session> {
    self.current.as_ref()
  }

  /// The current session, or an error telling the user to log in.
  pub fn require(&self) -> Result<&Session> {
    self
      .current
      .as_ref()
      .ok_or_else(|| anyhow!("not logged in; run `parley login` first"))
  }

  /// Store the payload of a login call.
  ///
  /// Only a payload carrying a session `$id` is accepted. Anything else is
  /// the backend's error object passed through by the proxy, and the
  /// message it holds becomes the error.
  pub fn establish(&mut self, payload: Value) -> Result<&Session> {
    if payload.get("$id").and_then(Value::as_str).is_none() {
      let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no session returned");
      bail!("login rejected: {message}");
    }

    let session: Session = serde_json::from_value(payload).context("decoding session")?;
    if let Some(path) = &self.path {
      if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
          .with_context(|| format!("creating {}", dir.display()))?;
      }
      let raw = serde_json::to_string_pretty(&session)?;
      std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(self.current.insert(session))
  }

  /// Forget the session, removing the stored file.
  pub fn clear(&mut self) -> Result<()> {
    self.current = None;
    if let Some(path) = &self.path {
      match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("removing {}", path.display())),
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn payload() -> Value {
    json!({
      "$id": "sess-1",
      "userId": "user-1",
      "providerEmail": "admin@example.com",
      "expire": "2030-01-01T00:00:00.000+00:00",
      "ip": "127.0.0.1",
    })
  }

  #[test]
  fn require_fails_before_login() {
    let ctx = SessionContext::in_memory();
    let err = ctx.require().unwrap_err();
    assert!(err.to_string().contains("not logged in"));
  }

  #[test]
  fn error_payload_is_not_a_session() {
    let mut ctx = SessionContext::in_memory();
    let err = ctx
      .establish(json!({ "message": "Invalid credentials", "code": 401 }))
      .unwrap_err();
    assert!(err.to_string().contains("Invalid credentials"));
    assert!(ctx.current().is_none());
  }

  #[test]
  fn session_survives_a_reload_until_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let mut ctx = SessionContext::load(&path).unwrap();
    assert!(ctx.current().is_none());
    let session = ctx.establish(payload()).unwrap();
    assert_eq!(session.display_name(), "admin@example.com");
    assert_eq!(session.extra.get("ip"), Some(&json!("127.0.0.1")));

    let reloaded = SessionContext::load(&path).unwrap();
    assert_eq!(reloaded.require().unwrap().id, "sess-1");

    let mut ctx = reloaded;
    ctx.clear().unwrap();
    assert!(!path.exists());
    assert!(SessionContext::load(&path).unwrap().current().is_none());
  }

  #[test]
  fn display_name_falls_back() {
    let mut ctx = SessionContext::in_memory();
    let session = ctx.establish(json!({ "$id": "s" })).unwrap();
    assert_eq!(session.display_name(), "Admin");
  }
}
