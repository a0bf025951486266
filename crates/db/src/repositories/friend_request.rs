//! Friend request repository.
//!
//! One row per unordered pair of users. Accepted rows are the friendship
//! edges; pending rows are outstanding requests.

use std::sync::Arc;

use crate::entities::{
    FriendRequest,
    friend_request::{self, FriendshipStatus},
};
use agora_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Friend request repository for database operations.
#[derive(Clone)]
pub struct FriendRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendRequestRepository {
    /// Create a new friend request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a friend request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the edge between two users in either direction.
    ///
    /// Only pending and accepted rows count; declined rows are history.
    pub async fn find_active_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(pair_condition(a, b))
            .filter(friend_request::Column::Status.is_in([
                FriendshipStatus::Pending,
                FriendshipStatus::Accepted,
            ]))
            .order_by_desc(friend_request::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the accepted edge between two users, if any.
    pub async fn find_accepted_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(pair_condition(a, b))
            .filter(friend_request::Column::Status.eq(FriendshipStatus::Accepted))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new friend request.
    pub async fn create(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Change the status of an existing request.
    pub async fn update_status(
        &self,
        model: friend_request::Model,
        status: FriendshipStatus,
    ) -> AppResult<friend_request::Model> {
        let mut active: friend_request::ActiveModel = model.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().into());
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a friend request by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        FriendRequest::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Accepted edges touching `user_id`.
    pub async fn find_accepted_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(either_side(user_id))
            .filter(friend_request::Column::Status.eq(FriendshipStatus::Accepted))
            .order_by_desc(friend_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accepted edges touching any of `user_ids`.
    pub async fn find_accepted_for_users(
        &self,
        user_ids: &[String],
    ) -> AppResult<Vec<friend_request::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        FriendRequest::find()
            .filter(
                Condition::any()
                    .add(friend_request::Column::RequesterId.is_in(user_ids.to_vec()))
                    .add(friend_request::Column::RecipientId.is_in(user_ids.to_vec())),
            )
            .filter(friend_request::Column::Status.eq(FriendshipStatus::Accepted))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every edge touching `user_id`, whatever its status.
    pub async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(either_side(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending requests addressed to `user_id`, newest first.
    pub async fn find_pending_received(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::RecipientId.eq(user_id))
            .filter(friend_request::Column::Status.eq(FriendshipStatus::Pending))
            .order_by_desc(friend_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn either_side(user_id: &str) -> Condition {
    Condition::any()
        .add(friend_request::Column::RequesterId.eq(user_id))
        .add(friend_request::Column::RecipientId.eq(user_id))
}

fn pair_condition(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friend_request::Column::RequesterId.eq(a))
                .add(friend_request::Column::RecipientId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friend_request::Column::RequesterId.eq(b))
                .add(friend_request::Column::RecipientId.eq(a)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_request(
        id: &str,
        requester_id: &str,
        recipient_id: &str,
        status: FriendshipStatus,
    ) -> friend_request::Model {
        friend_request::Model {
            id: id.to_string(),
            requester_id: requester_id.to_string(),
            recipient_id: recipient_id.to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_active_between_found() {
        let request = create_test_request("r1", "alice", "bob", FriendshipStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()]])
                .into_connection(),
        );

        let repo = FriendRequestRepository::new(db);
        let found = repo.find_active_between("bob", "alice").await.unwrap();

        assert_eq!(found.unwrap().id, "r1");
    }

    #[tokio::test]
    async fn test_find_accepted_for_users_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = FriendRequestRepository::new(db);
        let edges = repo.find_accepted_for_users(&[]).await.unwrap();

        assert!(edges.is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let request = create_test_request("r1", "alice", "bob", FriendshipStatus::Pending);
        let accepted = create_test_request("r1", "alice", "bob", FriendshipStatus::Accepted);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[accepted]])
                .into_connection(),
        );

        let repo = FriendRequestRepository::new(db);
        let updated = repo
            .update_status(request, FriendshipStatus::Accepted)
            .await
            .unwrap();

        assert_eq!(updated.status, FriendshipStatus::Accepted);
    }

    #[tokio::test]
    async fn test_find_pending_received() {
        let r1 = create_test_request("r2", "carol", "bob", FriendshipStatus::Pending);
        let r2 = create_test_request("r1", "alice", "bob", FriendshipStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = FriendRequestRepository::new(db);
        let pending = repo.find_pending_received("bob").await.unwrap();

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, "r2");
    }
}
