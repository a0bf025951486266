//! Notification endpoints.

use agora_common::AppResult;
use agora_core::NotificationView;
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, CountResponse, MessageResponse},
};

/// Unread counter.
#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// The caller's notifications, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<NotificationView>>> {
    let (skip, limit) = page.resolve(&state.social);
    let notifications = state
        .notification_service
        .list(&user.id, skip, limit)
        .await?;
    Ok(ApiResponse::ok(notifications))
}

async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let unread_count = state.notification_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { unread_count }))
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.notification_service.mark_read(&id, &user.id).await?;
    Ok(MessageResponse::ok("Notification marked as read"))
}

async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.notification_service.delete(&id, &user.id).await?;
    Ok(MessageResponse::ok("Notification deleted"))
}

async fn remove_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.delete_all(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).delete(remove_all))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/{id}", delete(remove))
        .route("/{id}/read", put(mark_read))
}
