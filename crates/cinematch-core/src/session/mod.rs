//! Session state: the single source of truth for "who is logged in"
//!
//! The store owns the token and the lazily fetched user profile. Consumers
//! never poll; they subscribe to change notifications through a watch
//! channel. `is_authenticated` is derived from token presence, so the
//! invariant `is_authenticated == token.is_some()` holds by construction.

pub mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use crate::error::ClientResult;
use crate::types::User;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token held
    Anonymous,
    /// Token held, profile fetch not yet resolved. A valid transient state:
    /// consumers must tolerate `user == None` while authenticated.
    Pending,
    /// Token held and profile populated
    Authenticated,
}

/// Immutable snapshot of session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if held
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The cached profile, if fetched
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::Pending,
            (Some(_), Some(_)) => SessionPhase::Authenticated,
        }
    }
}

/// Owner of session state and its persistence.
///
/// All mutation goes through the defined transitions (`set_token`,
/// `set_user`, `logout`, `force_clear`); each one publishes a complete
/// snapshot, so observers never see a half-applied transition.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: RwLock<Session>,
    notify: watch::Sender<Session>,
}

impl SessionStore {
    /// Create the store, hydrating once from persisted storage.
    ///
    /// A persisted token yields an authenticated session whose profile has
    /// not been fetched yet ([`SessionPhase::Pending`]).
    pub fn new(storage: Arc<dyn TokenStorage>) -> ClientResult<Self> {
        let token = storage.load()?;
        if token.is_some() {
            debug!("restored persisted session token");
        }
        let initial = Session { token, user: None };
        let (notify, _) = watch::channel(initial.clone());

        Ok(Self {
            storage,
            state: RwLock::new(initial),
            notify,
        })
    }

    /// Persist and adopt a freshly issued token.
    ///
    /// The token is trusted as issued; no shape validation is performed.
    /// Persistence happens first, so a crash between the two steps leaves a
    /// token that the next start will hydrate.
    pub fn set_token(&self, token: impl Into<String>) -> ClientResult<()> {
        let token = token.into();
        self.storage.store(&token)?;
        self.mutate(|session| session.token = Some(token));
        Ok(())
    }

    /// Replace the cached profile wholesale; does not affect authentication
    pub fn set_user(&self, user: User) {
        self.mutate(|session| session.user = Some(user));
    }

    /// Clear the token, the profile, and the persisted copy
    pub fn logout(&self) -> ClientResult<()> {
        self.storage.clear()?;
        self.mutate(|session| {
            session.token = None;
            session.user = None;
        });
        Ok(())
    }

    /// Forced logout on credential rejection.
    ///
    /// Storage failures are logged rather than propagated: the in-memory
    /// session must end regardless of whether the persisted copy could be
    /// removed.
    pub fn force_clear(&self) {
        if let Err(err) = self.storage.clear() {
            warn!(error = %err, "failed to clear persisted token during forced logout");
        }
        self.mutate(|session| {
            session.token = None;
            session.user = None;
        });
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    /// The bearer token, if held
    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// The cached profile, if fetched
    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    /// Id of the authenticated user, once the profile fetch has resolved
    pub fn user_id(&self) -> Option<i64> {
        self.state.read().user.as_ref().map(|user| user.id)
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase()
    }

    /// Subscribe to state transitions; the receiver starts at the current
    /// snapshot and sees every subsequent complete state.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.notify.subscribe()
    }

    fn mutate(&self, apply: impl FnOnce(&mut Session)) {
        let snapshot = {
            let mut state = self.state.write();
            apply(&mut state);
            state.clone()
        };
        self.notify.send_replace(snapshot);
    }
}
