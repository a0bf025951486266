//! Friendship service.
//!
//! Owns the friend request lifecycle:
//!
//! ```text
//! (none) --send_request--> pending --respond(accepted)--> accepted
//!                              \----respond(declined)--> declined
//! ```
//!
//! Any edge can be removed by either side, whatever its status. At most one
//! pending or accepted edge exists per unordered pair of users.

use std::collections::{BTreeSet, HashMap};

use crate::{
    locks::{KeyedLocks, pair_key},
    services::{
        notification::NotificationService,
        social_graph::{self, RankedCandidate},
        user::UserSummary,
        visibility::{self, needs_friendship},
    },
};
use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{
        friend_request::{self, FriendshipStatus},
        notification::NotificationType,
        user,
    },
    repositories::{FriendRequestRepository, UserRepository},
};
use chrono::{DateTime, FixedOffset};
use sea_orm::Set;
use serde::Serialize;
use tracing::{debug, info};

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    friend_request_repo: FriendRequestRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    locks: KeyedLocks,
    suggestion_limit: usize,
    id_gen: IdGenerator,
}

/// A friend as listed on a friends page.
#[derive(Debug, Clone, Serialize)]
pub struct FriendSummary {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub is_verified: bool,
    /// Edge id, used to remove the friendship.
    pub friendship_id: String,
    /// When the request was accepted.
    pub since: DateTime<FixedOffset>,
}

/// An incoming friend request awaiting a response.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    pub request_id: String,
    pub requester: UserSummary,
    pub created_at: DateTime<FixedOffset>,
}

/// A suggested friend.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub mutual_friends: usize,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub fn new(
        friend_request_repo: FriendRequestRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        suggestion_limit: usize,
    ) -> Self {
        Self {
            friend_request_repo,
            user_repo,
            notifications,
            locks: KeyedLocks::new(),
            suggestion_limit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a friend request.
    pub async fn send_request(
        &self,
        requester_id: &str,
        recipient_id: &str,
    ) -> AppResult<friend_request::Model> {
        if requester_id == recipient_id {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        self.user_repo
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        let request = {
            let _guard = self.locks.lock(&pair_key(requester_id, recipient_id)).await;

            if let Some(existing) = self
                .friend_request_repo
                .find_active_between(requester_id, recipient_id)
                .await?
            {
                let message = if existing.status == FriendshipStatus::Accepted {
                    "You are already friends"
                } else {
                    "Friend request already exists"
                };
                return Err(AppError::Conflict(message.to_string()));
            }

            let now = chrono::Utc::now();
            let model = friend_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                requester_id: Set(requester_id.to_string()),
                recipient_id: Set(recipient_id.to_string()),
                status: Set(FriendshipStatus::Pending),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            self.friend_request_repo.create(model).await?
        };

        info!(
            request_id = %request.id,
            requester_id = %requester_id,
            recipient_id = %recipient_id,
            "Friend request sent"
        );

        self.notifications
            .notify_best_effort(
                recipient_id,
                requester_id,
                NotificationType::FriendRequest,
                Some(&request.id),
            )
            .await;

        Ok(request)
    }

    /// Accept or decline a pending request addressed to `responder_id`.
    pub async fn respond(
        &self,
        request_id: &str,
        responder_id: &str,
        status: FriendshipStatus,
    ) -> AppResult<friend_request::Model> {
        if !matches!(
            status,
            FriendshipStatus::Accepted | FriendshipStatus::Declined
        ) {
            return Err(AppError::BadRequest(
                "Status must be accepted or declined".to_string(),
            ));
        }

        let request = self
            .friend_request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))?;

        if request.recipient_id != responder_id {
            return Err(AppError::Forbidden(
                "Not authorized to respond to this request".to_string(),
            ));
        }

        if request.status != FriendshipStatus::Pending {
            return Err(AppError::Conflict(
                "Friend request is no longer pending".to_string(),
            ));
        }

        let updated = self
            .friend_request_repo
            .update_status(request, status)
            .await?;

        info!(request_id = %request_id, status = ?status, "Friend request answered");

        if status == FriendshipStatus::Accepted {
            self.notifications
                .notify_best_effort(
                    &updated.requester_id,
                    responder_id,
                    NotificationType::FriendAccept,
                    Some(&updated.id),
                )
                .await;
        }

        Ok(updated)
    }

    /// Delete an edge the user is part of.
    pub async fn remove(&self, request_id: &str, user_id: &str) -> AppResult<()> {
        let request = self
            .friend_request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Friendship not found".to_string()))?;

        if !request.involves(user_id) {
            return Err(AppError::Forbidden(
                "Not authorized to remove this friendship".to_string(),
            ));
        }

        self.friend_request_repo.delete(request_id).await?;
        info!(request_id = %request_id, user_id = %user_id, "Friendship removed");

        Ok(())
    }

    /// Whether an accepted edge connects `a` and `b`.
    pub async fn are_friends(&self, a: &str, b: &str) -> AppResult<bool> {
        if a == b {
            return Ok(false);
        }
        Ok(self
            .friend_request_repo
            .find_accepted_between(a, b)
            .await?
            .is_some())
    }

    /// Ids of every user `user_id` is friends with.
    pub async fn friend_ids(&self, user_id: &str) -> AppResult<BTreeSet<String>> {
        let edges = self
            .friend_request_repo
            .find_accepted_for_user(user_id)
            .await?;
        Ok(social_graph::adjacency(user_id, &edges))
    }

    /// Friends of `user_id`, most recent friendship first.
    pub async fn list_friends(&self, user_id: &str) -> AppResult<Vec<FriendSummary>> {
        let mut edges = self
            .friend_request_repo
            .find_accepted_for_user(user_id)
            .await?;
        // Accepting stamps `updated_at`, so it orders by when the friendship began.
        edges.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let friend_ids: Vec<String> = edges
            .iter()
            .filter_map(|edge| edge.other_party(user_id))
            .map(str::to_string)
            .collect();
        let users = self.users_by_id(&friend_ids).await?;

        Ok(edges
            .iter()
            .filter_map(|edge| {
                let friend = users.get(edge.other_party(user_id)?)?;
                Some(FriendSummary {
                    id: friend.id.clone(),
                    name: friend.name.clone(),
                    avatar: friend.avatar.clone(),
                    location: friend.location.clone(),
                    is_verified: friend.is_verified,
                    friendship_id: edge.id.clone(),
                    since: edge.updated_at,
                })
            })
            .collect())
    }

    /// Another user's friends, subject to their `friends` privacy setting.
    pub async fn list_friends_of(
        &self,
        viewer_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<FriendSummary>> {
        let owner = self.user_repo.get_by_id(user_id).await?;
        let level = owner.privacy().friends;

        let are_friends = if needs_friendship(viewer_id, user_id, level) {
            self.are_friends(viewer_id, user_id).await?
        } else {
            false
        };

        if !visibility::can_view(viewer_id, user_id, level, are_friends) {
            return Err(AppError::Forbidden(
                "Not authorized to view this user's friends".to_string(),
            ));
        }

        self.list_friends(user_id).await
    }

    /// Pending requests addressed to `user_id`, newest first.
    pub async fn list_incoming_pending(&self, user_id: &str) -> AppResult<Vec<PendingRequest>> {
        let requests = self
            .friend_request_repo
            .find_pending_received(user_id)
            .await?;

        let requester_ids: Vec<String> =
            requests.iter().map(|r| r.requester_id.clone()).collect();
        let users = self.users_by_id(&requester_ids).await?;

        Ok(requests
            .into_iter()
            .filter_map(|request| {
                let requester = users.get(&request.requester_id)?;
                Some(PendingRequest {
                    request_id: request.id,
                    requester: UserSummary::from(requester),
                    created_at: request.created_at,
                })
            })
            .collect())
    }

    /// Users who are friends with both `user_id` and `other_id`.
    pub async fn mutual_friends(
        &self,
        user_id: &str,
        other_id: &str,
    ) -> AppResult<Vec<UserSummary>> {
        self.user_repo
            .find_by_id(other_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mine = self.friend_ids(user_id).await?;
        let theirs = self.friend_ids(other_id).await?;
        let shared: Vec<String> = social_graph::mutual(&mine, &theirs).into_iter().collect();

        let users = self.users_by_id(&shared).await?;
        Ok(shared
            .iter()
            .filter_map(|id| users.get(id).map(UserSummary::from))
            .collect())
    }

    /// Friends of friends, ranked by how many friends they share with the user.
    pub async fn suggestions(&self, user_id: &str) -> AppResult<Vec<Suggestion>> {
        let friends = self.friend_ids(user_id).await?;
        if friends.is_empty() {
            return Ok(vec![]);
        }

        let friend_list: Vec<String> = friends.iter().cloned().collect();
        let friend_edges = self
            .friend_request_repo
            .find_accepted_for_users(&friend_list)
            .await?;

        let connected: BTreeSet<String> = self
            .friend_request_repo
            .find_for_user(user_id)
            .await?
            .iter()
            .filter_map(|edge| edge.other_party(user_id))
            .map(str::to_string)
            .collect();

        let ranked = social_graph::rank_suggestions(
            user_id,
            &friends,
            &friend_edges,
            &connected,
            self.suggestion_limit,
        );
        debug!(user_id = %user_id, count = ranked.len(), "Computed friend suggestions");

        let candidate_ids: Vec<String> = ranked.iter().map(|c| c.user_id.clone()).collect();
        let users = self.users_by_id(&candidate_ids).await?;

        Ok(ranked
            .into_iter()
            .filter_map(|candidate: RankedCandidate| {
                let user = users.get(&candidate.user_id)?;
                Some(Suggestion {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    avatar: user.avatar.clone(),
                    location: user.location.clone(),
                    mutual_friends: candidate.mutual_friends,
                })
            })
            .collect())
    }

    async fn users_by_id(&self, ids: &[String]) -> AppResult<HashMap<String, user::Model>> {
        Ok(self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use agora_db::repositories::NotificationRepository;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

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

    fn empty() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(request_db: MockDatabase, user_db: MockDatabase) -> FriendshipService {
        let notifications = NotificationService::new(
            NotificationRepository::new(empty()),
            UserRepository::new(empty()),
        );
        FriendshipService::new(
            FriendRequestRepository::new(Arc::new(request_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            notifications,
            20,
        )
    }

    #[tokio::test]
    async fn test_send_request_to_self_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.send_request("alice", "alice").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_send_request_unknown_recipient() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.send_request("alice", "ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_respond_rejects_other_statuses() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .respond("r1", "bob", FriendshipStatus::Blocked)
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_respond_by_requester_forbidden() {
        let request = create_test_request("r1", "alice", "bob", FriendshipStatus::Pending);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[request]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .respond("r1", "alice", FriendshipStatus::Accepted)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_respond_twice_conflicts() {
        let request = create_test_request("r1", "alice", "bob", FriendshipStatus::Declined);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[request]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .respond("r1", "bob", FriendshipStatus::Accepted)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_by_outsider_forbidden() {
        let request = create_test_request("r1", "alice", "bob", FriendshipStatus::Accepted);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[request]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.remove("r1", "mallory").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friend_request::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.remove("r1", "alice").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_are_friends_with_self_is_false() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(!service.are_friends("alice", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_friend_ids_from_accepted_edges() {
        let edges = vec![
            create_test_request("r2", "carol", "alice", FriendshipStatus::Accepted),
            create_test_request("r1", "alice", "bob", FriendshipStatus::Accepted),
        ];
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([edges]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let ids = service.friend_ids("alice").await.unwrap();
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["bob".to_string(), "carol".to_string()]
        );
    }
}
