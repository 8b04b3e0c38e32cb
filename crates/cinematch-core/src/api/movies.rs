//! Movies resource group: recommendations, similarity, details, listing

use crate::error::ClientResult;
use crate::transport::{ApiRequest, ApiTransport};
use crate::types::Movie;
use std::sync::Arc;

/// Default number of personalized recommendations
pub const DEFAULT_RECOMMENDATIONS: u32 = 10;
/// Default number of similar-movie results
pub const DEFAULT_SIMILAR: u32 = 5;
/// Default page size for plain listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Request builders for `/movies/*`
pub struct MoviesApi {
    transport: Arc<ApiTransport>,
}

impl MoviesApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Personalized recommendations for a user
    pub async fn recommendations(
        &self,
        user_id: i64,
        top_n: Option<u32>,
    ) -> ClientResult<Vec<Movie>> {
        let top_n = top_n.unwrap_or(DEFAULT_RECOMMENDATIONS);
        self.transport
            .execute(
                ApiRequest::get(format!("/movies/recommend/{user_id}")).with_query("top_n", top_n),
            )
            .await
    }

    /// Movies similar to a free-text title. The name is percent-encoded into
    /// the path segment.
    pub async fn similar(&self, movie_name: &str, top_n: Option<u32>) -> ClientResult<Vec<Movie>> {
        let top_n = top_n.unwrap_or(DEFAULT_SIMILAR);
        let encoded = urlencoding::encode(movie_name);
        self.transport
            .execute(
                ApiRequest::get(format!("/movies/recommend/similar/{encoded}"))
                    .with_query("top_n", top_n),
            )
            .await
    }

    /// Details for one movie
    pub async fn details(&self, movie_id: i64) -> ClientResult<Movie> {
        self.transport
            .execute(ApiRequest::get(format!("/movies/{movie_id}")))
            .await
    }

    /// Paginated listing
    pub async fn list(&self, skip: Option<u32>, limit: Option<u32>) -> ClientResult<Vec<Movie>> {
        self.transport
            .execute(
                ApiRequest::get("/movies")
                    .with_query("skip", skip.unwrap_or(0))
                    .with_query("limit", limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            )
            .await
    }
}
