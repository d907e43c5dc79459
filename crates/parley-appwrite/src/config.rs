use serde::Deserialize;

/// Connection settings for an Appwrite project.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// API root, e.g. `https://fra.cloud.appwrite.io/v1`.
  #[serde(default = "default_endpoint")]
  pub endpoint:     String,
  pub project_id:   String,
  /// Server API key. Without it every service call is rejected upstream.
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default = "default_database_id")]
  pub database_id:  String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_endpoint() -> String {
  "https://fra.cloud.appwrite.io/v1".to_string()
}

fn default_database_id() -> String {
  "nwu_chatbot_db".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

impl BackendConfig {
  /// Settings for `project_id` at the default endpoint, without an API key.
  pub fn new(project_id: impl Into<String>) -> Self {
    Self {
      endpoint:     default_endpoint(),
      project_id:   project_id.into(),
      api_key:      None,
      database_id:  default_database_id(),
      timeout_secs: default_timeout_secs(),
    }
  }
}
