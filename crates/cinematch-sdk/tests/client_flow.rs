//! End-to-end flows through the high-level client against a scripted wire

use async_trait::async_trait;
use chrono::Utc;
use cinematch_core::error::{ClientError, ClientResult};
use cinematch_core::session::MemoryTokenStorage;
use cinematch_core::transport::{ApiRequest, ApiResponse, AuthFailureHandler, HttpSend};
use cinematch_core::types::User;
use cinematch_sdk::{CineMatchClient, SearchState, SessionPhase};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted wire: hands out queued responses in order and records every
/// request that reached it.
struct RecordingSender {
    responses: Mutex<VecDeque<ClientResult<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingSender {
    fn new(responses: Vec<ClientResult<ApiResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpSend for RecordingSender {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let path = request.path.clone();
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {path}"))
    }
}

struct CountingHandler {
    calls: AtomicUsize,
}

impl CountingHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthFailureHandler for CountingHandler {
    fn on_auth_failure(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn ok(status: u16, body: serde_json::Value) -> ClientResult<ApiResponse> {
    Ok(ApiResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
    })
}

fn user_json(id: i64) -> serde_json::Value {
    json!({"id": id, "email": format!("user{id}@example.com"), "created_at": "2024-01-01T00:00:00Z"})
}

fn movie_json(id: i64) -> serde_json::Value {
    json!({"id": id, "title": format!("Movie {id}")})
}

fn client_with(sender: Arc<RecordingSender>) -> CineMatchClient {
    init_tracing();
    CineMatchClient::builder()
        .with_token_storage(Arc::new(MemoryTokenStorage::new()))
        .with_sender(sender)
        .with_auth_failure_handler(CountingHandler::new())
        .build()
        .unwrap()
}

fn sign_in(client: &CineMatchClient, user_id: i64) {
    client.session().set_token("test-token").unwrap();
    client.session().set_user(User {
        id: user_id,
        email: format!("user{user_id}@example.com"),
        created_at: Utc::now(),
    });
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("cinematch_core=debug,cinematch_sdk=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

#[tokio::test]
async fn test_login_adopts_token_then_profile() {
    let sender = RecordingSender::new(vec![
        ok(200, json!({"access_token": "jwt-1"})),
        ok(200, user_json(1)),
    ]);
    let client = client_with(sender.clone());

    let user = client.login("user1@example.com", "secret1").await.unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(client.session().phase(), SessionPhase::Authenticated);
    assert_eq!(client.session().token().as_deref(), Some("jwt-1"));

    let requests = sender.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/auth/login");
    assert!(requests[0].bearer.is_none());
    // The profile fetch already carries the freshly adopted token
    assert_eq!(requests[1].path, "/auth/me");
    assert_eq!(requests[1].bearer.as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_whitespace_search_issues_no_request() {
    let sender = RecordingSender::new(vec![]);
    let client = client_with(sender.clone());

    let state = client.search_similar("   ", None).await.unwrap();
    assert_eq!(state, SearchState::Idle);
    assert_eq!(client.search_state(), SearchState::Idle);
    assert!(sender.requests().is_empty());
}

#[tokio::test]
async fn test_failed_search_clears_results_but_is_not_idle() {
    let sender = RecordingSender::new(vec![
        ok(200, json!([movie_json(3)])),
        Err(ClientError::network("connection reset")),
    ]);
    let client = client_with(sender.clone());

    let state = client.search_similar("Inception", None).await.unwrap();
    assert_eq!(state.results().map(<[_]>::len), Some(1));

    let err = client.search_similar("Inception", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));

    // Cleared to empty, which is distinct from "never searched"
    let state = client.search_state();
    assert_eq!(state, SearchState::Completed(Vec::new()));
    assert_ne!(state, SearchState::Idle);

    let requests = sender.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/movies/recommend/similar/Inception");
}

#[tokio::test]
async fn test_recommendations_wait_for_user_id_then_fetch_once() {
    let sender = RecordingSender::new(vec![ok(200, json!([movie_json(1), movie_json(2)]))]);
    let client = client_with(sender.clone());

    // No authenticated user id yet: disabled, nothing issued
    assert!(client.recommendations(None).await.unwrap().is_none());
    client.session().set_token("test-token").unwrap();
    assert_eq!(client.session().phase(), SessionPhase::Pending);
    assert!(client.recommendations(None).await.unwrap().is_none());
    assert!(sender.requests().is_empty());

    sign_in(&client, 7);

    let movies = client.recommendations(None).await.unwrap().unwrap();
    assert_eq!(movies.len(), 2);

    // Stable key: a second read is served from cache
    let movies = client.recommendations(None).await.unwrap().unwrap();
    assert_eq!(movies.len(), 2);

    let requests = sender.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/movies/recommend/7");
    assert_eq!(
        requests[0].query,
        vec![("top_n".to_string(), "10".to_string())]
    );
    assert_eq!(requests[0].bearer.as_deref(), Some("test-token"));
}

#[tokio::test]
async fn test_rate_posts_once_and_invalidates_ratings() {
    let rating_body = json!({
        "id": 9,
        "user_id": 1,
        "movie_id": 42,
        "rating": 5,
        "created_at": "2024-03-01T12:00:00Z",
        "movie": movie_json(42)
    });
    let sender = RecordingSender::new(vec![
        ok(200, json!([])),
        ok(200, rating_body.clone()),
        ok(200, json!([rating_body])),
    ]);
    let client = client_with(sender.clone());
    sign_in(&client, 1);

    assert!(client.ratings().await.unwrap().unwrap().is_empty());

    let created = client.rate(42, 5).await.unwrap().unwrap();
    assert_eq!(created.movie.id, 42);

    // Invalidation forces the next read back to the wire
    let ratings = client.ratings().await.unwrap().unwrap();
    assert_eq!(ratings.len(), 1);

    let requests = sender.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].path, "/users/1/ratings");
    assert_eq!(requests[1].body, Some(json!({"movie_id": 42, "rating": 5})));
    assert_eq!(requests[2].path, "/users/1/ratings");
}

#[tokio::test]
async fn test_rate_without_session_is_a_no_op() {
    let sender = RecordingSender::new(vec![]);
    let client = client_with(sender.clone());

    assert!(client.rate(42, 5).await.unwrap().is_none());
    assert!(sender.requests().is_empty());
}

#[tokio::test]
async fn test_401_forces_logout_and_requests_redirect_once() {
    let sender = RecordingSender::new(vec![ok(
        401,
        json!({"detail": "Could not validate credentials"}),
    )]);
    let handler = CountingHandler::new();
    let client = CineMatchClient::builder()
        .with_token_storage(Arc::new(MemoryTokenStorage::with_token("stale")))
        .with_sender(sender)
        .with_auth_failure_handler(handler.clone())
        .build()
        .unwrap();

    assert_eq!(client.session().phase(), SessionPhase::Pending);

    let err = client.movies(None, None).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(handler.calls(), 1);
    assert_eq!(client.session().phase(), SessionPhase::Anonymous);
    assert!(client.session().token().is_none());
}
