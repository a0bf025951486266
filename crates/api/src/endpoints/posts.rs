//! Post endpoints.

use agora_common::AppResult;
use agora_core::{
    AddCommentInput, CommentView, CreatePostInput, LikeResult, PostDetail, PostView, ShareResult,
    SharePostInput, UpdatePostInput,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};

use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.create_post(&user.id, req).await?;
    Ok(ApiResponse::created(post))
}

/// News feed.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let (skip, limit) = page.resolve(&state.social);
    let posts = state.post_service.feed(&user.id, skip, limit).await?;
    Ok(ApiResponse::ok(posts))
}

/// Timeline of one author.
async fn user_posts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let (skip, limit) = page.resolve(&state.social);
    let posts = state
        .post_service
        .user_posts(&user.id, &author_id, skip, limit)
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// A post with its comments.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state.post_service.get_post(&user.id, &id).await?;
    Ok(ApiResponse::ok(post))
}

/// Edit a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.update_post(&user.id, &id, req).await?;
    Ok(ApiResponse::ok(post))
}

/// Delete a post.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.post_service.delete_post(&user.id, &id).await?;
    Ok(MessageResponse::ok("Post deleted"))
}

/// Like or unlike a post.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeResult>> {
    let result = state
        .social_action_service
        .toggle_post_like(&user.id, &id)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// Comment on a post.
async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddCommentInput>,
) -> AppResult<ApiResponse<CommentView>> {
    let comment = state
        .social_action_service
        .add_comment(&user.id, &id, req)
        .await?;
    Ok(ApiResponse::ok(comment))
}

/// Delete a comment.
async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state
        .social_action_service
        .delete_comment(&user.id, &id, &comment_id)
        .await?;
    Ok(MessageResponse::ok("Comment deleted"))
}

/// Like or unlike a comment.
async fn like_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<LikeResult>> {
    let result = state
        .social_action_service
        .toggle_comment_like(&user.id, &id, &comment_id)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// Share a post to the caller's timeline. The body is optional.
async fn share(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<SharePostInput>>,
) -> AppResult<ApiResponse<ShareResult>> {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    let result = state
        .social_action_service
        .share_post(&user.id, &id, input)
        .await?;
    Ok(ApiResponse::ok(result))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(feed))
        .route("/user/{id}", get(user_posts))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/like", post(like))
        .route("/{id}/comments", post(comment))
        .route("/{id}/comments/{comment_id}", delete(delete_comment))
        .route("/{id}/comments/{comment_id}/like", post(like_comment))
        .route("/{id}/share", post(share))
}
