//! CineMatch SDK
//!
//! High-level client over the CineMatch data layer. It wires the session
//! store, authenticated transport, domain API modules, and query cache into
//! one facade: login/logout flows, cached reads gated on the authenticated
//! user, rating submission with cache invalidation, and the one-shot
//! similarity search.

pub mod client;

pub use client::{CineMatchClient, CineMatchClientBuilder, SearchState};

// Re-export commonly used types from core
pub use cinematch_core::{
    cache::{QueryKey, QueryStatus},
    config::ClientConfig,
    error::{ClientError, ClientResult},
    session::{Session, SessionPhase, SessionStore},
    types::{Movie, Rating, User},
};
