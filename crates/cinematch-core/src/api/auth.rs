//! Auth resource group: register, login, current-user

use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, ApiTransport};
use crate::types::{TokenResponse, User};
use serde_json::json;
use std::sync::Arc;

/// Minimum password length accepted before dispatch
const MIN_PASSWORD_LEN: usize = 6;

/// Request builders for `/auth/*`
pub struct AuthApi {
    transport: Arc<ApiTransport>,
}

impl AuthApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Create an account. Credentials are validated before dispatch; a
    /// malformed email or short password never reaches the wire.
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<()> {
        validate_credentials(email, password)?;
        self.transport
            .execute_unit(ApiRequest::post(
                "/auth/register",
                json!({"email": email, "password": password}),
            ))
            .await
    }

    /// Exchange credentials for an access token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        validate_credentials(email, password)?;
        self.transport
            .execute(ApiRequest::post(
                "/auth/login",
                json!({"email": email, "password": password}),
            ))
            .await
    }

    /// Fetch the authenticated user's profile. Used after login to populate
    /// the session store.
    pub async fn me(&self) -> ClientResult<User> {
        self.transport.execute(ApiRequest::get("/auth/me")).await
    }
}

/// Field-level validation applied before any network call is made
fn validate_credentials(email: &str, password: &str) -> ClientResult<()> {
    if !is_well_formed_email(email) {
        return Err(ClientError::validation("email", "invalid email address"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
