//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "friend_request")]
    FriendRequest,
    #[sea_orm(string_value = "friend_accept")]
    FriendAccept,
    #[sea_orm(string_value = "post_like")]
    PostLike,
    #[sea_orm(string_value = "post_comment")]
    PostComment,
    #[sea_orm(string_value = "post_share")]
    PostShare,
    #[sea_orm(string_value = "comment_like")]
    CommentLike,
    #[sea_orm(string_value = "comment_reply")]
    CommentReply,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub recipient_id: String,

    /// The user who triggered the notification
    pub sender_id: String,

    /// Notification type
    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    /// Post, comment or friend request that caused it
    #[sea_orm(nullable)]
    pub reference_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
}

impl ActiveModelBehavior for ActiveModel {}
