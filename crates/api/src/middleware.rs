//! API middleware.

use std::sync::Arc;

use agora_common::config::SocialConfig;
use agora_core::{
    AuthService, FriendshipService, NotificationService, PostService, SocialActionService,
    UserService,
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Identity and profiles.
    pub user_service: UserService,
    /// Friend requests and the friendship graph.
    pub friendship_service: FriendshipService,
    /// Post creation, reads and author edits.
    pub post_service: PostService,
    /// Likes, comments and shares.
    pub social_action_service: SocialActionService,
    /// Per-user inbox.
    pub notification_service: NotificationService,
    /// Token resolution for the auth middleware.
    pub auth: Arc<dyn AuthService>,
    /// Paging and suggestion limits.
    pub social: SocialConfig,
}

impl AppState {
    /// Wire the state from services; the user service doubles as the token resolver.
    #[must_use]
    pub fn new(
        user_service: UserService,
        friendship_service: FriendshipService,
        post_service: PostService,
        social_action_service: SocialActionService,
        notification_service: NotificationService,
        social: SocialConfig,
    ) -> Self {
        Self {
            auth: Arc::new(user_service.clone()),
            user_service,
            friendship_service,
            post_service,
            social_action_service,
            notification_service,
            social,
        }
    }
}

/// Read the bearer token from an `Authorization` header value.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Resolves the bearer token into a user and stores it in the request
/// extensions. Requests without a valid token pass through unauthenticated;
/// handlers that need a user reject them through [`AuthUser`](crate::extractors::AuthUser).
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user = match bearer_token(&req) {
        Some(token) => match state.auth.current_user(token).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                None
            }
        },
        None => None,
    };

    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
