//! Wire models for the CineMatch API
//!
//! These mirror the server contract exactly. All values are replaced
//! wholesale when refetched, never partially mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account profile, fetched once after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A movie as served by listings, details, and recommendation responses.
///
/// `similarity_score` and `reason` are annotations present only in
/// recommendation/similarity responses; they are not part of the movie's
/// identity and are absent in plain listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A rating event joined with the movie snapshot taken at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    /// 1..=5, enforced by the server
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub movie: Movie,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
