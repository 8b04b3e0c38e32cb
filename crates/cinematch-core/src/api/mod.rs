//! Typed request builders for the three CineMatch resource groups
//!
//! These modules shape requests and default parameters; they carry no
//! business logic and perform no retries. Any non-2xx response propagates as
//! a rejected outcome carrying the server's error payload when present.

pub mod auth;
pub mod movies;
pub mod users;

pub use auth::AuthApi;
pub use movies::MoviesApi;
pub use users::UsersApi;
