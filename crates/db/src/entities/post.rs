//! Post entity.
//!
//! A post is an aggregate: its likes and comments live inside the row as JSON
//! and are rewritten together with the row.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::privacy::PrivacyLevel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub author_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Attached media URLs
    #[sea_orm(column_type = "JsonBinary")]
    pub media_urls: Json,

    pub privacy: PrivacyLevel,

    /// User IDs that liked this post, in like order
    #[sea_orm(column_type = "JsonBinary")]
    pub likes: Json,

    /// Embedded [`Comment`] list, in creation order
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,

    /// Share counter
    #[sea_orm(default_value = 0)]
    pub shares: i32,

    /// Original post when this post is a share
    #[sea_orm(nullable)]
    pub shared_post_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// A comment embedded in a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub likes: Vec<String>,
    /// Parent comment on the same post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Decoded like list.
    pub fn like_ids(&self) -> Result<Vec<String>, serde_json::Error> {
        if self.likes.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.likes.clone())
    }

    /// Decoded comment list, in stored order.
    pub fn comment_list(&self) -> Result<Vec<Comment>, serde_json::Error> {
        if self.comments.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.comments.clone())
    }

    /// Decoded media URL list.
    pub fn media_url_list(&self) -> Result<Vec<String>, serde_json::Error> {
        if self.media_urls.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.media_urls.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
