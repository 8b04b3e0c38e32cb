//! CineMatch Core Library
//!
//! Client-side data layer for the CineMatch movie recommendation service:
//! session/authentication state, the authenticated HTTP transport, typed
//! request builders for the three API resource groups, and the query cache
//! that keys, deduplicates, and invalidates read results.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use cache::{ParamValue, QueryCache, QueryEntry, QueryKey, QueryStatus};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionPhase, SessionStore};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, AuthFailureHandler, HttpSend, LoginRedirect};
pub use types::{Movie, Rating, TokenResponse, User};
