//! Friendship endpoints.

use agora_common::{AppError, AppResult};
use agora_core::{FriendSummary, PendingRequest, Suggestion, UserSummary};
use agora_db::entities::friend_request::{self, FriendshipStatus};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Friend request body.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient_id: String,
}

/// Response to a pending request.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// `accepted` or `declined`
    pub status: String,
}

/// Send a friend request.
async fn send_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> AppResult<ApiResponse<friend_request::Model>> {
    let request = state
        .friendship_service
        .send_request(&user.id, &req.recipient_id)
        .await?;
    Ok(ApiResponse::created(request))
}

/// Pending requests addressed to the caller.
async fn list_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PendingRequest>>> {
    let pending = state
        .friendship_service
        .list_incoming_pending(&user.id)
        .await?;
    Ok(ApiResponse::ok(pending))
}

/// Accept or decline a request.
async fn respond(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> AppResult<ApiResponse<friend_request::Model>> {
    let status = FriendshipStatus::parse(&req.status)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid status: {}", req.status)))?;

    let request = state
        .friendship_service
        .respond(&id, &user.id, status)
        .await?;
    Ok(ApiResponse::ok(request))
}

/// The caller's friends.
async fn list_friends(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FriendSummary>>> {
    let friends = state.friendship_service.list_friends(&user.id).await?;
    Ok(ApiResponse::ok(friends))
}

/// Delete a friendship edge.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.friendship_service.remove(&id, &user.id).await?;
    Ok(MessageResponse::ok("Friend removed"))
}

/// People the caller may know.
async fn suggestions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Suggestion>>> {
    let suggestions = state.friendship_service.suggestions(&user.id).await?;
    Ok(ApiResponse::ok(suggestions))
}

/// Friends shared with another user.
async fn mutual(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let mutual = state.friendship_service.mutual_friends(&user.id, &id).await?;
    Ok(ApiResponse::ok(mutual))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_friends))
        .route("/requests", post(send_request).get(list_requests))
        .route("/requests/{id}", put(respond))
        .route("/suggestions", get(suggestions))
        .route("/{id}", delete(remove))
        .route("/{id}/mutual", get(mutual))
}
