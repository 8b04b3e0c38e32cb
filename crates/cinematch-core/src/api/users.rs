//! Users resource group: history, ratings

use crate::error::ClientResult;
use crate::transport::{ApiRequest, ApiTransport};
use crate::types::Rating;
use serde_json::json;
use std::sync::Arc;

/// Request builders for `/users/*`
pub struct UsersApi {
    transport: Arc<ApiTransport>,
}

impl UsersApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// The user's watch history (served as rating events)
    pub async fn history(&self, user_id: i64) -> ClientResult<Vec<Rating>> {
        self.transport
            .execute(ApiRequest::get(format!("/users/{user_id}/history")))
            .await
    }

    /// The user's ratings
    pub async fn ratings(&self, user_id: i64) -> ClientResult<Vec<Rating>> {
        self.transport
            .execute(ApiRequest::get(format!("/users/{user_id}/ratings")))
            .await
    }

    /// Submit a rating. The 1..=5 range is validated by the server; the UI
    /// constrains input, so the client does not re-check it here.
    pub async fn create_rating(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: u8,
    ) -> ClientResult<Rating> {
        self.transport
            .execute(ApiRequest::post(
                format!("/users/{user_id}/ratings"),
                json!({"movie_id": movie_id, "rating": rating}),
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryTokenStorage, SessionStore};
    use crate::transport::{ApiResponse, AuthFailureHandler, MockHttpSend};

    struct NoopHandler;

    impl AuthFailureHandler for NoopHandler {
        fn on_auth_failure(&self) {}
    }

    fn api_with(sender: MockHttpSend) -> UsersApi {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())).unwrap());
        UsersApi::new(Arc::new(ApiTransport::new(
            Arc::new(sender),
            session,
            Arc::new(NoopHandler),
        )))
    }

    fn rating_json(id: i64, user_id: i64, movie_id: i64, rating: u8) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "movie_id": movie_id,
            "rating": rating,
            "created_at": "2024-03-01T12:00:00Z",
            "movie": {"id": movie_id, "title": format!("Movie {movie_id}")}
        })
    }

    #[tokio::test]
    async fn test_create_rating_posts_exact_body() {
        let mut sender = MockHttpSend::new();
        sender
            .expect_send()
            .withf(|req| {
                req.method == reqwest::Method::POST
                    && req.path == "/users/1/ratings"
                    && req.body == Some(json!({"movie_id": 42, "rating": 5}))
            })
            .times(1)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 200,
                    body: serde_json::to_vec(&rating_json(9, 1, 42, 5)).unwrap(),
                })
            });

        let rating = api_with(sender).create_rating(1, 42, 5).await.unwrap();
        assert_eq!(rating.movie_id, 42);
        assert_eq!(rating.movie.id, 42);
        assert_eq!(rating.rating, 5);
    }

    #[tokio::test]
    async fn test_ratings_path_and_decode() {
        let mut sender = MockHttpSend::new();
        sender
            .expect_send()
            .withf(|req| req.path == "/users/3/ratings")
            .times(1)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 200,
                    body: serde_json::to_vec(&json!([rating_json(1, 3, 10, 4)])).unwrap(),
                })
            });

        let ratings = api_with(sender).ratings(3).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 4);
    }

    #[tokio::test]
    async fn test_history_empty_is_success() {
        let mut sender = MockHttpSend::new();
        sender
            .expect_send()
            .withf(|req| req.path == "/users/3/history")
            .times(1)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 200,
                    body: b"[]".to_vec(),
                })
            });

        let history = api_with(sender).history(3).await.unwrap();
        assert!(history.is_empty());
    }
}
