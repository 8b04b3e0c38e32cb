//! Authenticated transport over the CineMatch HTTP API
//!
//! Every outgoing request passes through [`ApiTransport`], which attaches the
//! bearer credential when the session holds one and uniformly reacts to
//! credential rejection: a 401-equivalent response clears the whole session,
//! asks the injected boundary handler for a redirect to the login view, and
//! still surfaces the failure to the caller. Any authenticated resource
//! returning 401 invalidates the whole session, not just that call.
//!
//! The wire itself sits behind the [`HttpSend`] trait so tests can substitute
//! it; [`ReqwestSender`] is the production implementation.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// A request as built by the domain API modules.
///
/// `path` is relative to the configured base origin and already
/// percent-encoded; `bearer` is filled in by the transport, not by builders.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Build a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    /// Build a POST request with a JSON body
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            bearer: None,
        }
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// A raw response: status plus undecoded body bytes
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The wire seam: dispatch one request, return status and body.
///
/// Implementations do not interpret statuses; classification is the
/// transport's job. A transport-level failure (no response at all) is the
/// only error an implementation should produce.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

/// Production wire implementation backed by `reqwest`
pub struct ReqwestSender {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl ReqwestSender {
    /// Create a sender for the configured base origin
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::network(format!("request to {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::network(format!("failed to read response body: {e}")))?
            .to_vec();

        Ok(ApiResponse { status, body })
    }
}

/// Boundary handler invoked when the server rejects the session credential.
///
/// Invoked exactly once per failing response, after the session has been
/// cleared. Injectable so tests can assert "logout + navigate" was requested
/// without a real navigation occurring.
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self);
}

/// Default boundary handler: hands the login route to a navigation callback
pub struct LoginRedirect {
    navigate: Box<dyn Fn(&str) + Send + Sync>,
}

impl LoginRedirect {
    /// Route requested on credential rejection
    pub const LOGIN_ROUTE: &'static str = "/login";

    /// Wrap the host application's navigation callback
    pub fn new(navigate: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            navigate: Box::new(navigate),
        }
    }
}

impl AuthFailureHandler for LoginRedirect {
    fn on_auth_failure(&self) {
        warn!(route = Self::LOGIN_ROUTE, "session rejected, requesting redirect");
        (self.navigate)(Self::LOGIN_ROUTE);
    }
}

/// Authenticated transport: credential attachment on the way out, uniform
/// 401 handling on the way in.
pub struct ApiTransport {
    sender: Arc<dyn HttpSend>,
    session: Arc<SessionStore>,
    on_auth_failure: Arc<dyn AuthFailureHandler>,
}

impl ApiTransport {
    /// Assemble the transport from its collaborators
    pub fn new(
        sender: Arc<dyn HttpSend>,
        session: Arc<SessionStore>,
        on_auth_failure: Arc<dyn AuthFailureHandler>,
    ) -> Self {
        Self {
            sender,
            session,
            on_auth_failure,
        }
    }

    /// Execute a request and decode the 2xx body into `T`
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.dispatch(request).await?;
        serde_json::from_slice(&response.body).map_err(|e| ClientError::decode(e.to_string()))
    }

    /// Execute a request, discarding the 2xx body
    pub async fn execute_unit(&self, request: ApiRequest) -> ClientResult<()> {
        self.dispatch(request).await.map(|_| ())
    }

    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    async fn dispatch(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        // Requests proceed without a credential when none is held; protected
        // endpoints are the server's to reject.
        if let Some(token) = self.session.token() {
            request.bearer = Some(token);
        }

        let response = self.sender.send(request).await?;

        if response.status == 401 {
            let detail = error_detail(&response.body);
            warn!("credential rejected, forcing logout");
            self.session.force_clear();
            self.on_auth_failure.on_auth_failure();
            return Err(ClientError::unauthorized(detail));
        }

        if !response.is_success() {
            debug!(status = response.status, "request failed");
            return Err(ClientError::api(response.status, error_detail(&response.body)));
        }

        Ok(response)
    }
}

/// Pull the server's `{"detail": ...}` payload out of an error body, if any
fn error_detail(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<serde_json::Value>,
    }

    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    let detail = parsed.detail?;
    match detail.as_str() {
        Some(text) => Some(text.to_string()),
        None => Some(detail.to_string()),
    }
}
