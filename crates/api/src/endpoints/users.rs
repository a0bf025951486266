//! User endpoints.

use std::collections::HashMap;

use agora_common::AppResult;
use agora_core::{
    AchievementInput, FriendSummary, LifeEventInput, ProfileView, SearchResult,
    UpdateProfileInput,
};
use agora_db::entities::{
    PrivacySettings,
    user::{self, Achievement, LifeEvent},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Search users by name or email.
async fn search(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<SearchResult>>> {
    let results = state.user_service.search(&query.query, &user.id).await?;
    Ok(ApiResponse::ok(results))
}

/// Show a profile, partial when the viewer may not see it.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProfileView>> {
    let profile = state.user_service.get_profile(&user.id, &id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Update the caller's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated))
}

/// Update the caller's privacy levels.
async fn update_privacy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<HashMap<String, String>>,
) -> AppResult<ApiResponse<PrivacySettings>> {
    let settings = state.user_service.update_privacy(&user.id, &req).await?;
    Ok(ApiResponse::ok(settings))
}

async fn add_life_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LifeEventInput>,
) -> AppResult<ApiResponse<LifeEvent>> {
    let event = state.user_service.add_life_event(&user.id, req).await?;
    Ok(ApiResponse::created(event))
}

async fn delete_life_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.user_service.delete_life_event(&user.id, &id).await?;
    Ok(MessageResponse::ok("Event deleted successfully"))
}

async fn add_achievement(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AchievementInput>,
) -> AppResult<ApiResponse<Achievement>> {
    let achievement = state.user_service.add_achievement(&user.id, req).await?;
    Ok(ApiResponse::created(achievement))
}

/// Another user's friends, subject to their friends-list privacy.
async fn friends(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<FriendSummary>>> {
    let friends = state.friendship_service.list_friends_of(&user.id, &id).await?;
    Ok(ApiResponse::ok(friends))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/me", put(update_me))
        .route("/me/privacy", put(update_privacy))
        .route("/me/life-events", post(add_life_event))
        .route("/me/life-events/{id}", delete(delete_life_event))
        .route("/me/achievements", post(add_achievement))
        .route("/{id}", get(show))
        .route("/{id}/friends", get(friends))
}
