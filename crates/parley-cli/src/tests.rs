//! Dashboard workflows against the real proxy served over an in-memory
//! backend.

use std::sync::Arc;

use parley_appwrite::BackendConfig;
use parley_core::{
  Collection,
  memory::{Call, MemoryBackend},
};
use parley_proxy::{AppState, ServerConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{ApiClient, ApiConfig, Dashboard, SessionContext};

const EMAIL: &str = "admin@example.com";
const PASSWORD: &str = "hunter22";

/// Serve the proxy on an ephemeral port and return its `/api` base URL.
async fn serve(backend: &MemoryBackend) -> String {
  let state = AppState {
    backend: Arc::new(backend.clone()),
    config:  Arc::new(ServerConfig::new(BackendConfig::new("test-project"))),
  };
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, parley_proxy::router(state)).await.unwrap();
  });
  format!("http://{addr}/api")
}

async fn dashboard(backend: &MemoryBackend) -> Dashboard {
  let base_url = serve(backend).await;
  let client = ApiClient::new(ApiConfig { base_url }).unwrap();
  Dashboard::new(client, SessionContext::in_memory())
}

async fn logged_in(backend: &MemoryBackend) -> Dashboard {
  backend.add_account(EMAIL, PASSWORD);
  let mut dash = dashboard(backend).await;
  dash.login(EMAIL, PASSWORD).await.unwrap();
  dash
}

fn texts(backend: &MemoryBackend, collection: Collection, tag: &str) -> Vec<String> {
  let mut texts: Vec<String> = backend
    .documents(collection)
    .iter()
    .filter(|d| d.get_str("intent_tag") == Some(tag))
    .filter_map(|d| d.get_str("text").map(str::to_owned))
    .collect();
  texts.sort();
  texts
}

fn lines(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

// ─── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commands_need_a_session() {
  let backend = MemoryBackend::new();
  let dash = dashboard(&backend).await;

  let err = dash.overview().await.unwrap_err();
  assert!(err.to_string().contains("not logged in"));
  assert!(dash.intents(None).await.is_err());
  assert!(dash.set_threshold(50).await.is_err());
  assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn rejected_login_stores_nothing() {
  let backend = MemoryBackend::new();
  backend.add_account(EMAIL, PASSWORD);
  let mut dash = dashboard(&backend).await;

  // The proxy answers success; the payload has no session id.
  let err = dash.login(EMAIL, "wrong").await.unwrap_err();
  assert!(err.to_string().contains("Invalid credentials"));
  assert!(dash.session().current().is_none());

  let session = dash.login(EMAIL, PASSWORD).await.unwrap();
  assert_eq!(session.display_name(), EMAIL);

  dash.logout().unwrap();
  assert!(dash.overview().await.is_err());
}

// ─── Knowledge base ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_intent_writes_one_document_per_line() {
  let backend = MemoryBackend::new();
  let dash = logged_in(&backend).await;

  dash
    .add_intent("hours", &lines(&["when are you open", "opening hours"]), &lines(&["9 to 5"]))
    .await
    .unwrap();

  let intents = backend.documents(Collection::Intents);
  assert_eq!(intents.len(), 1);
  assert_eq!(intents[0].get_str("tag"), Some("hours"));
  assert_eq!(intents[0].get_str("description"), Some("Queries about hours"));
  assert_eq!(texts(&backend, Collection::Patterns, "hours"), vec![
    "opening hours".to_string(),
    "when are you open".to_string(),
  ]);
  assert_eq!(texts(&backend, Collection::Responses, "hours"), vec!["9 to 5".to_string()]);
}

#[tokio::test]
async fn edit_replaces_the_full_set() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Intents, json!({ "tag": "hours", "description": "d" }));
  for i in 0..120 {
    backend.seed(Collection::Patterns, json!({ "text": format!("old {i}"), "intent_tag": "hours" }));
  }
  backend.seed(Collection::Responses, json!({ "text": "old answer", "intent_tag": "hours" }));
  backend.seed(Collection::Patterns, json!({ "text": "hello", "intent_tag": "greeting" }));
  let dash = logged_in(&backend).await;

  dash
    .edit_intent("hours", &lines(&["new a", "new b"]), &lines(&["new answer"]))
    .await
    .unwrap();

  assert_eq!(texts(&backend, Collection::Patterns, "hours"), vec![
    "new a".to_string(),
    "new b".to_string(),
  ]);
  assert_eq!(texts(&backend, Collection::Responses, "hours"), vec!["new answer".to_string()]);
  assert_eq!(texts(&backend, Collection::Patterns, "greeting"), vec!["hello".to_string()]);
  assert_eq!(backend.documents(Collection::Intents).len(), 1);
}

#[tokio::test]
async fn edit_keeps_stored_embeddings() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Intents, json!({ "tag": "hours" }));
  backend.seed(Collection::Patterns, json!({ "text": "open?", "intent_tag": "hours" }));
  backend.seed(Collection::Embeddings, json!({
    "intent_tag": "hours",
    "pattern_text": "open?",
    "embedding": "[0.1,0.2]",
  }));
  let dash = logged_in(&backend).await;

  dash.edit_intent("hours", &lines(&["open?"]), &[]).await.unwrap();
  assert_eq!(texts(&backend, Collection::Patterns, "hours"), vec!["open?".to_string()]);
  assert_eq!(backend.documents(Collection::Embeddings).len(), 1);
}

#[tokio::test]
async fn edit_of_an_unknown_intent_touches_nothing() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Patterns, json!({ "text": "stray", "intent_tag": "ghost" }));
  let dash = logged_in(&backend).await;
  backend.clear_calls();

  assert!(dash.edit_intent("ghost", &[], &[]).await.is_err());
  assert!(!backend.calls().iter().any(|c| matches!(c, Call::Delete { .. })));
}

#[tokio::test]
async fn edit_finds_an_intent_past_the_first_page() {
  let backend = MemoryBackend::new();
  for i in 0..130 {
    backend.seed(Collection::Intents, json!({ "tag": format!("topic{i}") }));
  }
  let dash = logged_in(&backend).await;

  dash.edit_intent("topic120", &lines(&["late one"]), &[]).await.unwrap();
  assert_eq!(texts(&backend, Collection::Patterns, "topic120"), vec!["late one".to_string()]);
  assert_eq!(dash.intents(Some("topic12")).await.unwrap().len(), 11);
}

#[tokio::test]
async fn threshold_found_past_the_first_page() {
  let backend = MemoryBackend::new();
  for i in 0..105 {
    backend.seed(Collection::Settings, json!({ "key": format!("k{i}"), "value": "x" }));
  }
  backend.seed(Collection::Settings, json!({ "key": "threshold", "value": "0.5" }));
  let dash = logged_in(&backend).await;

  assert_eq!(dash.threshold().await.unwrap().unwrap().value, "0.5");
  dash.set_threshold(90).await.unwrap();
  assert_eq!(backend.documents(Collection::Settings).len(), 106);
}

#[tokio::test]
async fn intents_are_filtered_and_counted() {
  let backend = MemoryBackend::new();
  for tag in ["Greeting", "farewell", "greeting_formal"] {
    backend.seed(Collection::Intents, json!({ "tag": tag }));
  }
  for text in ["hi", "hello", "hey"] {
    backend.seed(Collection::Patterns, json!({ "text": text, "intent_tag": "Greeting" }));
  }
  backend.seed(Collection::Responses, json!({ "text": "Hello!", "intent_tag": "Greeting" }));
  let dash = logged_in(&backend).await;

  let rows = dash.intents(Some("GREET")).await.unwrap();
  let tags: Vec<&str> = rows.iter().map(|r| r.intent.tag.as_str()).collect();
  assert_eq!(tags, vec!["Greeting", "greeting_formal"]);
  assert_eq!((rows[0].patterns, rows[0].responses), (3, 1));
  assert_eq!((rows[1].patterns, rows[1].responses), (0, 0));
}

#[tokio::test]
async fn delete_intent_cascades_through_the_proxy() {
  let backend = MemoryBackend::new();
  let intent = backend.seed(Collection::Intents, json!({ "tag": "hours" }));
  backend.seed(Collection::Patterns, json!({ "text": "open?", "intent_tag": "hours" }));
  backend.seed(Collection::Responses, json!({ "text": "9 to 5", "intent_tag": "hours" }));
  let dash = logged_in(&backend).await;

  dash.delete_intent(&intent.id).await.unwrap();
  assert!(backend.documents(Collection::Intents).is_empty());
  assert!(backend.documents(Collection::Patterns).is_empty());
  assert!(backend.documents(Collection::Responses).is_empty());
}

// ─── Analytics ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn overview_is_computed_from_stats() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Intents, json!({ "tag": "greeting" }));
  for (tag, matched) in [("greeting", true), ("greeting", true), ("unknown", false), ("hours", true)] {
    backend.seed(Collection::Logs, json!({
      "query": "q",
      "response": "r",
      "intent_tag": tag,
      "matched": matched,
    }));
  }
  let dash = logged_in(&backend).await;

  let overview = dash.overview().await.unwrap();
  assert_eq!(overview.total_queries, 4);
  assert_eq!(overview.matched, 3);
  assert_eq!(overview.success_rate, 75);
  assert_eq!(overview.top_intent_label(), "greeting");
  assert_eq!(overview.intent_count, 1);
}

#[tokio::test]
async fn unanswered_keeps_only_fallbacks() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Logs, json!({ "query": "hi", "matched": true }));
  backend.seed(Collection::Logs, json!({ "query": "what is rust", "matched": false }));
  let dash = logged_in(&backend).await;

  let logs = dash.unanswered().await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].query, "what is rust");
  assert_eq!(dash.logs().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unanswered_query_is_taught_as_a_pattern() {
  let backend = MemoryBackend::new();
  backend.seed(Collection::Logs, json!({ "query": "what is rust", "matched": false }));
  let dash = logged_in(&backend).await;

  let queries: Vec<String> = dash.unanswered().await.unwrap().into_iter().map(|l| l.query).collect();
  let patterns = crate::dashboard::taught_patterns(&queries, lines(&["rust?"]));
  dash
    .add_intent("rust", &patterns, &lines(&["A systems language."]))
    .await
    .unwrap();

  assert_eq!(texts(&backend, Collection::Patterns, "rust"), vec![
    "rust?".to_string(),
    "what is rust".to_string(),
  ]);
  assert_eq!(texts(&backend, Collection::Responses, "rust"), vec!["A systems language.".to_string()]);
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn threshold_is_created_then_updated() {
  let backend = MemoryBackend::new();
  let dash = logged_in(&backend).await;
  assert!(dash.threshold().await.unwrap().is_none());

  assert_eq!(dash.set_threshold(80).await.unwrap(), "0.8");
  let first = dash.threshold().await.unwrap().unwrap();
  assert_eq!(first.value, "0.8");

  assert_eq!(dash.set_threshold(65).await.unwrap(), "0.65");
  let settings = backend.documents(Collection::Settings);
  assert_eq!(settings.len(), 1);
  assert_eq!(settings[0].id, first.id);
  assert_eq!(settings[0].get_str("value"), Some("0.65"));
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_works_without_a_session() {
  let backend = MemoryBackend::new();
  backend.add_function("chatbot_brain", |body| {
    let payload: Value = serde_json::from_str(body).unwrap();
    json!({ "response": format!("echo: {}", payload["message"].as_str().unwrap()) })
  });
  let dash = dashboard(&backend).await;

  let reply = dash.chat("hello").await.unwrap();
  assert_eq!(reply, json!({ "response": "echo: hello" }));
}
