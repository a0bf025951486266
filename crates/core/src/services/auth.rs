//! Authentication capability.

use agora_common::AppResult;
use agora_db::entities::user;
use async_trait::async_trait;

/// Resolves an access token to the user it belongs to.
///
/// The HTTP layer only depends on this trait, so the way tokens are issued
/// and stored can change without touching request handling.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The user owning `token`; `AppError::Unauthorized` when unknown.
    async fn current_user(&self, token: &str) -> AppResult<user::Model>;
}
