//! Post service.
//!
//! Posts are aggregates: likes and comments live inside the post row. This
//! service owns creation, reads and author edits; interactions go through
//! [`SocialActionService`](crate::services::social_action::SocialActionService).

use std::collections::HashMap;

use crate::services::{
    friendship::FriendshipService,
    user::UserSummary,
    visibility::{self, Relationship, needs_friendship},
};
use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{
        PrivacyLevel,
        post::{self, Comment},
        user,
    },
    repositories::{PostRepository, UserRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    friendship: FriendshipService,
    id_gen: IdGenerator,
}

/// A post as returned in feeds and timelines.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub author: UserSummary,
    pub content: String,
    pub media_urls: Vec<String>,
    pub privacy: PrivacyLevel,
    pub likes: Vec<String>,
    pub like_count: usize,
    pub is_liked: bool,
    pub comment_count: usize,
    pub share_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_post_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author: UserSummary,
    pub content: String,
    pub likes: Vec<String>,
    pub like_count: usize,
    pub is_liked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single post with its comments, oldest comment first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 10))]
    pub media_urls: Vec<String>,

    /// Defaults to `friends`.
    pub privacy: Option<PrivacyLevel>,
}

/// Input for editing a post. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(max = 10000))]
    pub content: Option<String>,

    #[validate(length(max = 10))]
    pub media_urls: Option<Vec<String>>,

    pub privacy: Option<PrivacyLevel>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        friendship: FriendshipService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            friendship,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    pub async fn create_post(&self, author_id: &str, input: CreatePostInput) -> AppResult<PostView> {
        input.validate()?;

        if input.content.trim().is_empty() && input.media_urls.is_empty() {
            return Err(AppError::BadRequest(
                "Post must have content or media".to_string(),
            ));
        }

        let author = self.user_repo.get_by_id(author_id).await?;
        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            content: Set(input.content),
            media_urls: Set(serde_json::json!(input.media_urls)),
            privacy: Set(input.privacy.unwrap_or(PrivacyLevel::Friends)),
            likes: Set(serde_json::json!([])),
            comments: Set(serde_json::json!([])),
            shares: Set(0),
            shared_post_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let post = self.post_repo.create(model).await?;
        info!(post_id = %post.id, author_id = %author_id, "Post created");

        build_view(post, UserSummary::from(&author), author_id)
    }

    /// Fetch a post `viewer_id` may see, failing with `Forbidden` otherwise.
    pub async fn get_visible(&self, viewer_id: &str, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        self.ensure_visible(viewer_id, &post).await?;
        Ok(post)
    }

    /// Check the post's own privacy level against the viewer.
    pub async fn ensure_visible(&self, viewer_id: &str, post: &post::Model) -> AppResult<()> {
        let are_friends = if needs_friendship(viewer_id, &post.author_id, post.privacy) {
            self.friendship
                .are_friends(viewer_id, &post.author_id)
                .await?
        } else {
            false
        };

        if visibility::can_view(viewer_id, &post.author_id, post.privacy, are_friends) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Not authorized to view this post".to_string(),
            ))
        }
    }

    /// A post with its comments.
    pub async fn get_post(&self, viewer_id: &str, post_id: &str) -> AppResult<PostDetail> {
        let post = self.get_visible(viewer_id, post_id).await?;
        let comments = post.comment_list()?;

        let mut user_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        user_ids.push(post.author_id.clone());
        let users = self.summaries(&user_ids).await?;

        let author = users
            .get(&post.author_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {}", post.author_id)))?;

        Ok(PostDetail {
            post: build_view(post, author, viewer_id)?,
            comments: comment_views(comments, &users, viewer_id),
        })
    }

    /// The viewer's feed: own posts, public posts and friends' posts shared
    /// with friends, newest first.
    pub async fn feed(&self, viewer_id: &str, skip: u64, limit: u64) -> AppResult<Vec<PostView>> {
        let friend_ids: Vec<String> = self
            .friendship
            .friend_ids(viewer_id)
            .await?
            .into_iter()
            .collect();

        let posts = self
            .post_repo
            .find_feed(viewer_id, &friend_ids, skip, limit)
            .await?;

        self.views(posts, viewer_id).await
    }

    /// Posts written by `user_id` that `viewer_id` may see, newest first.
    pub async fn user_posts(
        &self,
        viewer_id: &str,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<PostView>> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let are_friends = viewer_id != user_id
            && self.friendship.are_friends(viewer_id, user_id).await?;
        let relationship = Relationship::resolve(viewer_id, user_id, are_friends);

        let posts = self
            .post_repo
            .find_by_author(user_id, relationship.visible_levels(), skip, limit)
            .await?;

        self.views(posts, viewer_id).await
    }

    /// Edit a post. Only the author may do this.
    pub async fn update_post(
        &self,
        actor_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<PostView> {
        input.validate()?;

        let post = self.owned(actor_id, post_id, "update").await?;
        let mut active: post::ActiveModel = post.into();

        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(media_urls) = input.media_urls {
            active.media_urls = Set(serde_json::json!(media_urls));
        }
        if let Some(privacy) = input.privacy {
            active.privacy = Set(privacy);
        }
        active.updated_at = Set(Utc::now().into());

        let post = self.post_repo.update(active).await?;
        let author = self.user_repo.get_by_id(actor_id).await?;

        build_view(post, UserSummary::from(&author), actor_id)
    }

    /// Delete a post. Only the author may do this.
    pub async fn delete_post(&self, actor_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.owned(actor_id, post_id, "delete").await?;
        self.post_repo.delete(&post.id).await?;

        info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    async fn owned(&self, actor_id: &str, post_id: &str, action: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor_id {
            return Err(AppError::Forbidden(format!(
                "Not authorized to {action} this post"
            )));
        }
        Ok(post)
    }

    async fn views(&self, posts: Vec<post::Model>, viewer_id: &str) -> AppResult<Vec<PostView>> {
        let author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        let authors = self.summaries(&author_ids).await?;

        posts
            .into_iter()
            .filter_map(|post| {
                let author = authors.get(&post.author_id)?.clone();
                Some(build_view(post, author, viewer_id))
            })
            .collect()
    }

    async fn summaries(&self, ids: &[String]) -> AppResult<HashMap<String, UserSummary>> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();

        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u: &user::Model| (u.id.clone(), UserSummary::from(u)))
            .collect())
    }
}

fn build_view(post: post::Model, author: UserSummary, viewer_id: &str) -> AppResult<PostView> {
    let likes = post.like_ids()?;
    let comment_count = post.comment_list()?.len();
    let media_urls = post.media_url_list()?;

    Ok(PostView {
        id: post.id,
        author,
        content: post.content,
        media_urls,
        privacy: post.privacy,
        like_count: likes.len(),
        is_liked: likes.iter().any(|id| id == viewer_id),
        likes,
        comment_count,
        share_count: post.shares,
        shared_post_id: post.shared_post_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}

/// Resolve comment authors and order comments by creation time.
///
/// Comments whose author no longer exists are dropped.
pub(crate) fn comment_views(
    mut comments: Vec<Comment>,
    users: &HashMap<String, UserSummary>,
    viewer_id: &str,
) -> Vec<CommentView> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    comments
        .into_iter()
        .filter_map(|comment| {
            let author = users.get(&comment.author_id)?.clone();
            Some(comment_view(comment, author, viewer_id))
        })
        .collect()
}

pub(crate) fn comment_view(comment: Comment, author: UserSummary, viewer_id: &str) -> CommentView {
    CommentView {
        like_count: comment.likes.len(),
        is_liked: comment.likes.iter().any(|id| id == viewer_id),
        id: comment.id,
        author,
        content: comment.content,
        likes: comment.likes,
        reply_to: comment.reply_to,
        created_at: comment.created_at,
    }
}
