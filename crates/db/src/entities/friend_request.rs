//! Friend request entity.
//!
//! One row per friendship edge. The row stays after acceptance; friendship is
//! an edge in status `accepted`, regardless of which side asked.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

impl FriendshipStatus {
    /// Pending and accepted edges block a new request between the same pair.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Parse a wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who sent the request
    pub requester_id: String,

    /// The user who received the request
    pub recipient_id: String,

    pub status: FriendshipStatus,

    pub created_at: DateTimeWithTimeZone,

    /// Last status change; "friends since" once accepted
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// The other endpoint of this edge, if `user_id` is one of them.
    #[must_use]
    pub fn other_party(&self, user_id: &str) -> Option<&str> {
        if self.requester_id == user_id {
            Some(&self.recipient_id)
        } else if self.recipient_id == user_id {
            Some(&self.requester_id)
        } else {
            None
        }
    }

    /// Whether `user_id` is one of the two endpoints.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.recipient_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn edge(requester: &str, recipient: &str) -> Model {
        Model {
            id: "e1".to_string(),
            requester_id: requester.to_string(),
            recipient_id: recipient.to_string(),
            status: FriendshipStatus::Pending,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_other_party() {
        let e = edge("alice", "bob");
        assert_eq!(e.other_party("alice"), Some("bob"));
        assert_eq!(e.other_party("bob"), Some("alice"));
        assert_eq!(e.other_party("carol"), None);
    }

    #[test]
    fn test_active_statuses() {
        assert!(FriendshipStatus::Pending.is_active());
        assert!(FriendshipStatus::Accepted.is_active());
        assert!(!FriendshipStatus::Declined.is_active());
        assert!(!FriendshipStatus::Blocked.is_active());
    }
}
