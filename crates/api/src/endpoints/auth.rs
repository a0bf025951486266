//! Authentication endpoints.

use agora_common::AppResult;
use agora_core::{LoginInput, RegisterInput, Session};
use agora_db::entities::user;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create a new account and return its access token.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.register(req).await?;
    Ok(ApiResponse::ok(session))
}

/// Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.login(req).await?;
    Ok(ApiResponse::ok(session))
}

/// The authenticated user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<user::Model>> {
    Ok(ApiResponse::ok(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
