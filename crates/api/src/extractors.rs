//! Request extractors.

use agora_common::AppError;
use agora_common::config::SocialConfig;
use agora_db::entities::user;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// `?skip=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Number of items to skip.
    #[serde(default)]
    pub skip: u64,
    /// Page size, clamped by [`SocialConfig::clamp_limit`].
    pub limit: Option<u64>,
}

impl PageQuery {
    /// `(skip, limit)` after clamping.
    #[must_use]
    pub fn resolve(self, social: &SocialConfig) -> (u64, u64) {
        (self.skip, social.clamp_limit(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_resolve() {
        let social = SocialConfig::default();
        assert_eq!(PageQuery::default().resolve(&social), (0, 20));

        let page = PageQuery {
            skip: 40,
            limit: Some(1_000),
        };
        assert_eq!(page.resolve(&social), (40, 100));
    }
}
