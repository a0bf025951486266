//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, PrivacyLevel, post};
use agora_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id}")))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write back the embedded like and comment collections of a post.
    pub async fn save_interactions(
        &self,
        model: post::Model,
        likes: serde_json::Value,
        comments: serde_json::Value,
    ) -> AppResult<post::Model> {
        let mut active: post::ActiveModel = model.into();
        active.likes = Set(likes);
        active.comments = Set(comments);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the share counter atomically (single UPDATE query, no fetch).
    pub async fn increment_shares(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::Shares, Expr::col(post::Column::Shares).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Posts visible in the feed of `viewer_id` (newest first).
    ///
    /// The feed holds the viewer's own posts, every public post, and
    /// friends-only posts written by one of `friend_ids`.
    pub async fn find_feed(
        &self,
        viewer_id: &str,
        friend_ids: &[String],
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        let mut visible = Condition::any()
            .add(post::Column::AuthorId.eq(viewer_id))
            .add(post::Column::Privacy.eq(PrivacyLevel::Public));

        if !friend_ids.is_empty() {
            visible = visible.add(
                Condition::all()
                    .add(post::Column::AuthorId.is_in(friend_ids.to_vec()))
                    .add(post::Column::Privacy.eq(PrivacyLevel::Friends)),
            );
        }

        Post::find()
            .filter(visible)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts by `author_id` restricted to `levels` (newest first).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        levels: &[PrivacyLevel],
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        if levels.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Privacy.is_in(levels.iter().copied()))
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
