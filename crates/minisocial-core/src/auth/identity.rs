use async_trait::async_trait;

use crate::api::ApiError;
use crate::models::{LoginCredentials, LoginResponse, User};

/// Remote identity service the session manager reconciles against.
///
/// `ApiClient` is the production implementation; tests substitute a
/// scripted fake.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange credentials for a token and the account it belongs to.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError>;

    /// Resolve the account owning `token`. Rejected or expired tokens fail.
    async fn fetch_current_user(&self, token: &str) -> Result<User, ApiError>;
}
