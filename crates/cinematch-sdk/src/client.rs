//! High-level CineMatch client

use cinematch_core::api::movies::DEFAULT_PAGE_SIZE;
use cinematch_core::api::{AuthApi, MoviesApi, UsersApi};
use cinematch_core::cache::{QueryCache, QueryKey};
use cinematch_core::config::ClientConfig;
use cinematch_core::error::ClientResult;
use cinematch_core::session::{FileTokenStorage, SessionStore, TokenStorage};
use cinematch_core::transport::{
    ApiTransport, AuthFailureHandler, HttpSend, LoginRedirect, ReqwestSender,
};
use cinematch_core::types::{Movie, Rating, User};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result-list state for the ad-hoc similarity search.
///
/// The search is a one-shot, user-triggered fetch that bypasses the query
/// cache: success replaces the list outright, failure clears it. An empty
/// `Completed` list after a failed or fruitless search is distinct from
/// `Idle` ("never searched"), so the UI can render "no results" rather than
/// the initial state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// No search has been run yet
    Idle,
    /// The most recent search completed with these results
    Completed(Vec<Movie>),
}

impl SearchState {
    /// Results of the last completed search, if any
    pub fn results(&self) -> Option<&[Movie]> {
        match self {
            Self::Idle => None,
            Self::Completed(movies) => Some(movies),
        }
    }
}

/// Builder for [`CineMatchClient`], allowing tests and host platforms to
/// inject token storage, the wire, and the auth-failure boundary handler
pub struct CineMatchClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn TokenStorage>>,
    sender: Option<Arc<dyn HttpSend>>,
    on_auth_failure: Option<Arc<dyn AuthFailureHandler>>,
}

impl CineMatchClientBuilder {
    fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            storage: None,
            sender: None,
            on_auth_failure: None,
        }
    }

    /// Use this configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this token storage instead of the default file-backed one
    pub fn with_token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use this wire implementation instead of the reqwest-backed one
    pub fn with_sender(mut self, sender: Arc<dyn HttpSend>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Use this boundary handler for credential rejections
    pub fn with_auth_failure_handler(mut self, handler: Arc<dyn AuthFailureHandler>) -> Self {
        self.on_auth_failure = Some(handler);
        self
    }

    /// Wire everything together, hydrating the session from persisted storage
    pub fn build(self) -> ClientResult<CineMatchClient> {
        let storage: Arc<dyn TokenStorage> = match self.storage {
            Some(storage) => storage,
            None => match &self.config.token_path {
                Some(path) => Arc::new(FileTokenStorage::new(path)),
                None => Arc::new(FileTokenStorage::default_location()?),
            },
        };

        let session = Arc::new(SessionStore::new(storage)?);

        let sender: Arc<dyn HttpSend> = match self.sender {
            Some(sender) => sender,
            None => Arc::new(ReqwestSender::new(&self.config)?),
        };

        // Without a host navigation callback the redirect request is only
        // logged; embedding applications supply their own handler.
        let on_auth_failure: Arc<dyn AuthFailureHandler> =
            self.on_auth_failure.unwrap_or_else(|| {
                Arc::new(LoginRedirect::new(|route| {
                    info!(route, "navigation requested");
                }))
            });

        let transport = Arc::new(ApiTransport::new(sender, session.clone(), on_auth_failure));

        Ok(CineMatchClient {
            auth: AuthApi::new(transport.clone()),
            movies: MoviesApi::new(transport.clone()),
            users: UsersApi::new(transport),
            session,
            cache: QueryCache::new(),
            search: RwLock::new(SearchState::Idle),
        })
    }
}

/// Facade over the CineMatch data layer
pub struct CineMatchClient {
    session: Arc<SessionStore>,
    cache: QueryCache,
    auth: AuthApi,
    movies: MoviesApi,
    users: UsersApi,
    search: RwLock<SearchState>,
}

impl CineMatchClient {
    /// Create a client with the default file storage and reqwest wire
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::builder().with_config(config).build()
    }

    /// Start building a client with injected collaborators
    pub fn builder() -> CineMatchClientBuilder {
        CineMatchClientBuilder::new()
    }

    /// The session store, for subscriptions and direct state reads
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Create an account
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<()> {
        self.auth.register(email, password).await
    }

    /// Log in and populate the session: the token is adopted first, then the
    /// profile fetch completes authentication
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let token = self.auth.login(email, password).await?;
        self.session.set_token(token.access_token)?;

        let user = self.auth.me().await?;
        self.session.set_user(user.clone());
        debug!(user_id = user.id, "login complete");
        Ok(user)
    }

    /// Clear the session and the persisted token
    pub fn logout(&self) -> ClientResult<()> {
        self.session.logout()
    }

    /// Cached personalized recommendations.
    ///
    /// Disabled (returns `Ok(None)`, no request) until the authenticated
    /// user's id is known; during the pending phase right after token
    /// adoption nothing is issued.
    pub async fn recommendations(&self, top_n: Option<u32>) -> ClientResult<Option<Vec<Movie>>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };
        let key = QueryKey::new("recommendations").with_param(user_id);
        self.cache
            .query(key, true, || self.movies.recommendations(user_id, top_n))
            .await
    }

    /// Cached movie details
    pub async fn movie_details(&self, movie_id: i64) -> ClientResult<Option<Movie>> {
        let key = QueryKey::new("movie-details").with_param(movie_id);
        self.cache
            .query(key, true, || self.movies.details(movie_id))
            .await
    }

    /// Cached paginated listing. Defaults are normalized into the key, so an
    /// explicit `(0, 20)` and the defaults share one entry.
    pub async fn movies(
        &self,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> ClientResult<Option<Vec<Movie>>> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let key = QueryKey::new("movies").with_param(skip).with_param(limit);
        self.cache
            .query(key, true, || self.movies.list(Some(skip), Some(limit)))
            .await
    }

    /// Cached watch history for the signed-in user
    pub async fn history(&self) -> ClientResult<Option<Vec<Rating>>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };
        let key = QueryKey::new("history").with_param(user_id);
        self.cache
            .query(key, true, || self.users.history(user_id))
            .await
    }

    /// Cached ratings for the signed-in user
    pub async fn ratings(&self) -> ClientResult<Option<Vec<Rating>>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };
        let key = QueryKey::new("ratings").with_param(user_id);
        self.cache
            .query(key, true, || self.users.ratings(user_id))
            .await
    }

    /// Submit a rating for the signed-in user.
    ///
    /// Returns `Ok(None)` when no user is signed in. On success the user's
    /// ratings and history queries are invalidated; recommendations are
    /// deliberately left as they are.
    pub async fn rate(&self, movie_id: i64, rating: u8) -> ClientResult<Option<Rating>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };

        let created = self.users.create_rating(user_id, movie_id, rating).await?;
        self.cache
            .invalidate(&QueryKey::new("ratings").with_param(user_id));
        self.cache
            .invalidate(&QueryKey::new("history").with_param(user_id));
        debug!(movie_id, rating, "rating recorded");
        Ok(Some(created))
    }

    /// One-shot similarity search by free-text movie name.
    ///
    /// Whitespace-only input is a no-op: no request is issued and the current
    /// result list is left unchanged. A failed fetch clears the list to an
    /// empty completed state and still surfaces the error.
    pub async fn search_similar(
        &self,
        query: &str,
        top_n: Option<u32>,
    ) -> ClientResult<SearchState> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(self.search_state());
        }

        match self.movies.similar(trimmed, top_n).await {
            Ok(results) => {
                let state = SearchState::Completed(results);
                *self.search.write() = state.clone();
                Ok(state)
            }
            Err(err) => {
                warn!(error = %err, "similarity search failed");
                *self.search.write() = SearchState::Completed(Vec::new());
                Err(err)
            }
        }
    }

    /// Current similarity-search result state
    pub fn search_state(&self) -> SearchState {
        self.search.read().clone()
    }
}
