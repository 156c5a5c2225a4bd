//! End-to-end journal tests:
//! - persistence round trips through the SQLite store
//! - lesson switching keeps entries apart
//! - Get Objective through the proxy route to a mocked provider
//! - blank replies and missing provider keys still leave Objective text

use nextmind::completion::prompt::EMPTY_OUTPUT_MESSAGE;
use nextmind::completion::{CompletionClient, ObjectiveSource, ProviderConfig, ProxyClient, UnconfiguredSource};
use nextmind::config::{CompletionConfig, Config};
use nextmind::journal::{load_entry, FALLBACK_WARNING, PROMPT_FOR_INPUT};
use nextmind::server::{router, ServerState};
use nextmind::{Catalog, JournalField, ObjectiveOutcome, Session, SqliteKvStore};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project(id: &str) -> nextmind::Project {
    Catalog::bundled().unwrap().project(id).unwrap().clone()
}

fn sqlite_store(dir: &tempfile::TempDir) -> Arc<SqliteKvStore> {
    Arc::new(SqliteKvStore::open(dir.path().join("journal.db")).unwrap())
}

/// Start the proxy on a random port, backed by the given provider URL
async fn start_proxy(provider_url: String) -> String {
    let provider = ProviderConfig::new(provider_url, "server-side-key");
    let client = CompletionClient::new(provider, CompletionConfig::default()).unwrap();
    let objective: Arc<dyn ObjectiveSource> = Arc::new(client);
    let state = ServerState {
        config: Arc::new(Config::default()),
        catalog: Arc::new(Catalog::bundled().unwrap()),
        objective: Some(objective),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}/api/core-objective", addr)
}

#[test]
fn test_field_round_trip_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();
        session.journal_mut().set_field(JournalField::Context, "Clip of a candidate").unwrap();
        session.journal_mut().set_field(JournalField::Evaluation, "Checklist worked").unwrap();
    }

    let session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();
    let entry = session.journal().entry();
    assert_eq!(entry.context, "Clip of a candidate");
    assert_eq!(entry.evaluation, "Checklist worked");
    assert!(entry.last_saved_at.is_some());
}

#[test]
fn test_lessons_do_not_share_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("algorithm-audit"), sqlite_store(&dir)).unwrap();

    for (index, text) in ["feeds", "experiment", "results"].iter().enumerate() {
        session.select(index).unwrap();
        session.journal_mut().set_field(JournalField::Reflection, *text).unwrap();
    }

    session.select(0).unwrap();
    assert_eq!(session.journal().entry().reflection, "feeds");
    session.next().unwrap();
    assert_eq!(session.journal().entry().reflection, "experiment");
    session.next().unwrap();
    assert_eq!(session.journal().entry().reflection, "results");
    assert!(!session.next().unwrap());
}

#[test]
fn test_reset_then_reload_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir);
    let mut session = Session::open(project("fact-check-sprint"), store.clone()).unwrap();
    session.journal_mut().set_field(JournalField::Context, "viral claim").unwrap();
    session.journal_mut().reset().unwrap();

    let key = session.journal().key().clone();
    assert!(load_entry(&store, &key).unwrap().is_blank());
    let reopened = Session::open(project("fact-check-sprint"), store).unwrap();
    assert!(reopened.journal().entry().is_blank());
}

#[tokio::test]
async fn test_objective_through_proxy() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "- Synthetic media has appeared in election campaigns.\n- Detection relies on provenance and artefact checks."}}]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let proxy_url = start_proxy(provider.uri()).await;
    let proxy = ProxyClient::new(proxy_url, Duration::from_secs(10)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();
    session.journal_mut().set_field(JournalField::Context, "AI deepfakes in elections").unwrap();
    let before = session.journal().entry().last_saved_at;

    let outcome = session.fetch_objective(&proxy).await.unwrap();
    assert_eq!(outcome, ObjectiveOutcome::Remote);

    let entry = session.journal().entry();
    assert!(entry.objective.starts_with("- Synthetic media"));
    assert!(!entry.objective.contains(" I "));
    assert!(entry.last_saved_at > before);
    assert!(!session.journal().has_error());
}

#[tokio::test]
async fn test_provider_failure_falls_back() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&provider)
        .await;

    let proxy_url = start_proxy(provider.uri()).await;
    let proxy = ProxyClient::new(proxy_url, Duration::from_secs(10)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("policy-lab"), sqlite_store(&dir)).unwrap();
    session.journal_mut().set_field(JournalField::Context, "Campaign rules for AI ads").unwrap();

    let outcome = session.fetch_objective(&proxy).await.unwrap();
    assert!(matches!(outcome, ObjectiveOutcome::Fallback { .. }));

    let journal = session.journal();
    assert!(journal.has_error());
    assert_eq!(journal.notice(), Some(FALLBACK_WARNING));
    assert!(journal.entry().objective.contains("- Lesson: The Current Rulebook"));
    assert!(journal.entry().objective.contains("- Category: Ethics & Advocacy"));
    assert!(journal.entry().objective.contains("Campaign rules for AI ads"));
}

#[tokio::test]
async fn test_blank_context_never_reaches_proxy() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let proxy_url = start_proxy(provider.uri()).await;
    let proxy = ProxyClient::new(proxy_url, Duration::from_secs(10)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();

    let outcome = session.fetch_objective(&proxy).await.unwrap();
    assert_eq!(outcome, ObjectiveOutcome::NeedsContext);
    assert_eq!(session.journal().entry().objective, PROMPT_FOR_INPUT);
}

#[tokio::test]
async fn test_blank_proxy_output_keeps_objective_filled() {
    let proxy_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/core-objective"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "output": "" })))
        .expect(1)
        .mount(&proxy_server)
        .await;

    let proxy = ProxyClient::new(format!("{}/api/core-objective", proxy_server.uri()), Duration::from_secs(10)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();
    session.journal_mut().set_field(JournalField::Context, "AI deepfakes in elections").unwrap();

    let outcome = session.fetch_objective(&proxy).await.unwrap();
    assert_eq!(outcome, ObjectiveOutcome::Remote);
    assert_eq!(session.journal().entry().objective, EMPTY_OUTPUT_MESSAGE);
}

#[tokio::test]
async fn test_blank_provider_output_through_proxy() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "   "}}]
        })))
        .mount(&provider)
        .await;

    let proxy_url = start_proxy(provider.uri()).await;
    let proxy = ProxyClient::new(proxy_url, Duration::from_secs(10)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("algorithm-audit"), sqlite_store(&dir)).unwrap();
    session.journal_mut().set_field(JournalField::Context, "Feed ranking study").unwrap();

    session.fetch_objective(&proxy).await.unwrap();
    assert_eq!(session.journal().entry().objective, EMPTY_OUTPUT_MESSAGE);
}

#[tokio::test]
async fn test_missing_provider_key_falls_back() {
    let source = UnconfiguredSource::new("Failed to read API key");
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir);

    let mut session = Session::open(project("policy-lab"), store.clone()).unwrap();
    session.journal_mut().set_field(JournalField::Context, "Campaign rules for AI ads").unwrap();

    let outcome = session.fetch_objective(&source).await.unwrap();
    match outcome {
        ObjectiveOutcome::Fallback { reason } => assert!(reason.contains("not configured")),
        other => panic!("expected fallback, got {other:?}"),
    }
    assert_eq!(session.journal().notice(), Some(FALLBACK_WARNING));

    let key = session.journal().key().clone();
    let stored = load_entry(&store, &key).unwrap();
    assert!(stored.objective.contains("- Lesson: The Current Rulebook"));
}

#[tokio::test]
async fn test_missing_provider_key_with_blank_context() {
    let source = UnconfiguredSource::new("Failed to read API key");
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(project("deepfake-detective"), sqlite_store(&dir)).unwrap();

    let outcome = session.fetch_objective(&source).await.unwrap();
    assert_eq!(outcome, ObjectiveOutcome::NeedsContext);
    assert_eq!(session.journal().entry().objective, PROMPT_FOR_INPUT);
}
