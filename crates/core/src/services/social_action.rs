//! Social actions on posts: likes, comments and shares.
//!
//! Every action re-reads the post aggregate, mutates its embedded likes or
//! comments, and writes both collections back. The read-modify-write runs
//! under a per-post lock so concurrent toggles in this process never lose an
//! update. Notifications are sent after the write, outside the lock, and
//! never on actions users take on their own content.

use crate::{
    locks::KeyedLocks,
    services::{
        notification::NotificationService,
        post::{CommentView, PostService, comment_view},
        user::UserSummary,
    },
};
use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{
        PrivacyLevel,
        notification::NotificationType,
        post::{self, Comment},
    },
    repositories::{PostRepository, UserRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Social action service for business logic.
#[derive(Clone)]
pub struct SocialActionService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    posts: PostService,
    notifications: NotificationService,
    locks: KeyedLocks,
    id_gen: IdGenerator,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeResult {
    pub liked: bool,
    pub like_count: usize,
}

/// Result of sharing a post.
#[derive(Debug, Clone, Serialize)]
pub struct ShareResult {
    pub message: String,
    pub post_id: String,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    /// Comment on the same post being answered.
    pub reply_to: Option<String>,
}

/// Input for sharing a post.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SharePostInput {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
}

/// Remove the comment at `index` and detach replies that pointed at it.
fn remove_comment(comments: &mut Vec<Comment>, index: usize) -> Comment {
    let removed = comments.remove(index);
    for reply in comments
        .iter_mut()
        .filter(|c| c.reply_to.as_deref() == Some(removed.id.as_str()))
    {
        reply.reply_to = None;
    }
    removed
}

/// Add `user_id` to `likes`, or remove it if present. Returns the new state.
fn toggle(likes: &mut Vec<String>, user_id: &str) -> bool {
    if let Some(index) = likes.iter().position(|id| id == user_id) {
        likes.remove(index);
        false
    } else {
        likes.push(user_id.to_string());
        true
    }
}

impl SocialActionService {
    /// Create a new social action service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        posts: PostService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            posts,
            notifications,
            locks: KeyedLocks::new(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Like or unlike a post.
    pub async fn toggle_post_like(&self, actor_id: &str, post_id: &str) -> AppResult<LikeResult> {
        let (post, result) = {
            let _guard = self.locks.lock(post_id).await;

            let post = self.posts.get_visible(actor_id, post_id).await?;
            let mut likes = post.like_ids()?;
            let liked = toggle(&mut likes, actor_id);
            let like_count = likes.len();

            let comments = post.comments.clone();
            let post = self
                .post_repo
                .save_interactions(post, serde_json::json!(likes), comments)
                .await?;

            (post, LikeResult { liked, like_count })
        };

        if result.liked {
            self.fan_out(
                &post.author_id,
                actor_id,
                NotificationType::PostLike,
                &post.id,
            )
            .await;
        }

        Ok(result)
    }

    /// Like or unlike a comment.
    pub async fn toggle_comment_like(
        &self,
        actor_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<LikeResult> {
        let (comment_author, result) = {
            let _guard = self.locks.lock(post_id).await;

            let post = self.posts.get_visible(actor_id, post_id).await?;
            let mut comments = post.comment_list()?;
            let comment = comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

            let liked = toggle(&mut comment.likes, actor_id);
            let result = LikeResult {
                liked,
                like_count: comment.likes.len(),
            };
            let comment_author = comment.author_id.clone();

            let likes = post.likes.clone();
            self.post_repo
                .save_interactions(post, likes, serde_json::to_value(&comments)?)
                .await?;

            (comment_author, result)
        };

        if result.liked {
            self.fan_out(
                &comment_author,
                actor_id,
                NotificationType::CommentLike,
                comment_id,
            )
            .await;
        }

        Ok(result)
    }

    /// Append a comment to a post.
    ///
    /// Not idempotent: retrying creates another comment.
    pub async fn add_comment(
        &self,
        actor_id: &str,
        post_id: &str,
        input: AddCommentInput,
    ) -> AppResult<CommentView> {
        input.validate()?;

        let actor = self.user_repo.get_by_id(actor_id).await?;

        let (post_author, parent_author, comment) = {
            let _guard = self.locks.lock(post_id).await;

            let post = self.posts.get_visible(actor_id, post_id).await?;
            let mut comments = post.comment_list()?;

            let parent_author = match input.reply_to.as_deref() {
                Some(parent_id) => Some(
                    comments
                        .iter()
                        .find(|c| c.id == parent_id)
                        .map(|c| c.author_id.clone())
                        .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?,
                ),
                None => None,
            };

            let comment = Comment {
                id: self.id_gen.generate(),
                author_id: actor_id.to_string(),
                content: input.content,
                likes: vec![],
                reply_to: input.reply_to,
                created_at: Utc::now(),
            };
            comments.push(comment.clone());

            let post_author = post.author_id.clone();
            let likes = post.likes.clone();
            self.post_repo
                .save_interactions(post, likes, serde_json::to_value(&comments)?)
                .await?;

            (post_author, parent_author, comment)
        };

        info!(post_id = %post_id, comment_id = %comment.id, "Comment added");

        if let Some(parent_author) = parent_author.as_deref() {
            self.fan_out(
                parent_author,
                actor_id,
                NotificationType::CommentReply,
                &comment.id,
            )
            .await;
        }
        if parent_author.as_deref() != Some(post_author.as_str()) {
            self.fan_out(&post_author, actor_id, NotificationType::PostComment, post_id)
                .await;
        }

        Ok(comment_view(comment, UserSummary::from(&actor), actor_id))
    }

    /// Remove a comment. The comment's author and the post's author may do this.
    ///
    /// Replies to the removed comment stay on the post as top-level comments.
    pub async fn delete_comment(
        &self,
        actor_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<()> {
        let _guard = self.locks.lock(post_id).await;

        let post = self.post_repo.get_by_id(post_id).await?;
        let mut comments = post.comment_list()?;
        let index = comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comments[index].author_id != actor_id && post.author_id != actor_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        remove_comment(&mut comments, index);
        let likes = post.likes.clone();
        self.post_repo
            .save_interactions(post, likes, serde_json::to_value(&comments)?)
            .await?;

        info!(post_id = %post_id, comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    /// Share a post to the actor's timeline.
    ///
    /// Not idempotent: retrying creates another shared post.
    pub async fn share_post(
        &self,
        actor_id: &str,
        post_id: &str,
        input: SharePostInput,
    ) -> AppResult<ShareResult> {
        input.validate()?;

        let original = self.posts.get_visible(actor_id, post_id).await?;

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(actor_id.to_string()),
            content: Set(input.content),
            media_urls: Set(serde_json::json!([])),
            privacy: Set(PrivacyLevel::Friends),
            likes: Set(serde_json::json!([])),
            comments: Set(serde_json::json!([])),
            shares: Set(0),
            shared_post_id: Set(Some(original.id.clone())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let shared = self.post_repo.create(model).await?;
        self.post_repo.increment_shares(&original.id).await?;

        info!(post_id = %original.id, shared_post_id = %shared.id, "Post shared");

        self.fan_out(
            &original.author_id,
            actor_id,
            NotificationType::PostShare,
            &original.id,
        )
        .await;

        Ok(ShareResult {
            message: "Post shared successfully".to_string(),
            post_id: shared.id,
        })
    }

    /// Notify `recipient_id` unless the actor is acting on their own content.
    async fn fan_out(
        &self,
        recipient_id: &str,
        actor_id: &str,
        kind: NotificationType,
        reference_id: &str,
    ) {
        if recipient_id == actor_id {
            return;
        }
        self.notifications
            .notify_best_effort(recipient_id, actor_id, kind, Some(reference_id))
            .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_an_involution() {
        let mut likes = vec!["alice".to_string()];

        assert!(toggle(&mut likes, "bob"));
        assert_eq!(likes, vec!["alice".to_string(), "bob".to_string()]);

        assert!(!toggle(&mut likes, "bob"));
        assert_eq!(likes, vec!["alice".to_string()]);
    }

    #[test]
    fn test_toggle_removes_existing() {
        let mut likes = vec!["alice".to_string(), "bob".to_string()];

        assert!(!toggle(&mut likes, "alice"));
        assert_eq!(likes, vec!["bob".to_string()]);
    }

    fn comment(id: &str, reply_to: Option<&str>) -> Comment {
        Comment {
            id: id.to_string(),
            author_id: "alice".to_string(),
            content: id.to_string(),
            likes: vec![],
            reply_to: reply_to.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_remove_comment_detaches_replies() {
        let mut comments = vec![
            comment("c1", None),
            comment("c2", Some("c1")),
            comment("c3", Some("c2")),
            comment("c4", Some("c1")),
        ];

        let removed = remove_comment(&mut comments, 0);

        assert_eq!(removed.id, "c1");
        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c4"]);
        assert_eq!(comments[0].reply_to, None);
        assert_eq!(comments[1].reply_to.as_deref(), Some("c2"));
        assert_eq!(comments[2].reply_to, None);
    }

    #[test]
    fn test_add_comment_input_rejects_empty() {
        let input = AddCommentInput {
            content: String::new(),
            reply_to: None,
        };
        assert!(input.validate().is_err());
    }
}
