//! Notification service.

use std::collections::HashMap;

use crate::services::user::UserSummary;
use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::notification::{self, NotificationType},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::{debug, warn};

/// Name used in messages when the sender no longer exists.
const UNKNOWN_SENDER: &str = "Someone";

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// A notification with a summary of whoever caused it.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: notification::Model,
    /// `None` when the sender has been removed.
    pub sender: Option<UserSummary>,
}

/// Message for a notification of `kind` sent by `sender_name`.
#[must_use]
pub fn render_message(kind: NotificationType, sender_name: Option<&str>) -> String {
    let name = sender_name.unwrap_or(UNKNOWN_SENDER);
    match kind {
        NotificationType::FriendRequest => format!("{name} sent you a friend request"),
        NotificationType::FriendAccept => format!("{name} accepted your friend request"),
        NotificationType::PostLike => format!("{name} liked your post"),
        NotificationType::PostComment => format!("{name} commented on your post"),
        NotificationType::PostShare => format!("{name} shared your post"),
        NotificationType::CommentLike => format!("{name} liked your comment"),
        NotificationType::CommentReply => format!("{name} replied to your comment"),
    }
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Persist a notification.
    ///
    /// The message is rendered from the type template when `message` is
    /// `None`. Self-notifications are stored like any other; callers decide
    /// whether an action should notify at all.
    pub async fn notify(
        &self,
        recipient_id: &str,
        sender_id: &str,
        kind: NotificationType,
        reference_id: Option<&str>,
        message: Option<String>,
    ) -> AppResult<notification::Model> {
        let message = match message {
            Some(message) => message,
            None => {
                let sender = self.user_repo.find_by_id(sender_id).await?;
                render_message(kind, sender.as_ref().map(|s| s.name.as_str()))
            }
        };

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            notification_type: Set(kind),
            reference_id: Set(reference_id.map(ToString::to_string)),
            message: Set(message),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.notification_repo.create(model).await?;
        debug!(
            notification_id = %notification.id,
            recipient_id = %recipient_id,
            kind = ?kind,
            "Notification created"
        );

        Ok(notification)
    }

    /// Persist a notification, logging instead of failing.
    ///
    /// Fan-out runs after the primary mutation has been stored, so an error
    /// here must not turn a successful action into a failed request.
    pub async fn notify_best_effort(
        &self,
        recipient_id: &str,
        sender_id: &str,
        kind: NotificationType,
        reference_id: Option<&str>,
    ) {
        if let Err(e) = self
            .notify(recipient_id, sender_id, kind, reference_id, None)
            .await
        {
            warn!(
                error = %e,
                recipient_id = %recipient_id,
                kind = ?kind,
                "Failed to create notification"
            );
        }
    }

    /// Notifications for a user, newest first, with sender summaries.
    pub async fn list(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<NotificationView>> {
        let notifications = self
            .notification_repo
            .find_by_recipient(user_id, skip, limit)
            .await?;

        let mut sender_ids: Vec<String> =
            notifications.iter().map(|n| n.sender_id.clone()).collect();
        sender_ids.sort();
        sender_ids.dedup();

        let senders: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&sender_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        Ok(notifications
            .into_iter()
            .map(|notification| {
                let sender = senders.get(&notification.sender_id).cloned();
                NotificationView {
                    notification,
                    sender,
                }
            })
            .collect())
    }

    /// Count unread notifications for a user.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> AppResult<()> {
        let notification = self.owned(notification_id, user_id).await?;
        if !notification.is_read {
            self.notification_repo.mark_as_read(notification).await?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Delete one of the user's notifications.
    pub async fn delete(&self, notification_id: &str, user_id: &str) -> AppResult<()> {
        let notification = self.owned(notification_id, user_id).await?;
        self.notification_repo.delete(&notification.id).await
    }

    /// Delete all notifications for a user.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all_for_user(user_id).await
    }

    async fn owned(&self, notification_id: &str, user_id: &str) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to access this notification".to_string(),
            ));
        }

        Ok(notification)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_notification(id: &str, recipient_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            sender_id: "bob".to_string(),
            notification_type: NotificationType::FriendRequest,
            reference_id: Some("edge1".to_string()),
            message: "Bob sent you a friend request".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service(notification_db: MockDatabase) -> NotificationService {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        NotificationService::new(
            NotificationRepository::new(Arc::new(notification_db.into_connection())),
            UserRepository::new(user_db),
        )
    }

    #[test]
    fn test_render_message_templates() {
        assert_eq!(
            render_message(NotificationType::FriendRequest, Some("Ana")),
            "Ana sent you a friend request"
        );
        assert_eq!(
            render_message(NotificationType::FriendAccept, Some("Ana")),
            "Ana accepted your friend request"
        );
        assert_eq!(
            render_message(NotificationType::PostShare, Some("Ana")),
            "Ana shared your post"
        );
        assert_eq!(
            render_message(NotificationType::CommentReply, Some("Ana")),
            "Ana replied to your comment"
        );
    }

    #[test]
    fn test_render_message_unknown_sender() {
        assert_eq!(
            render_message(NotificationType::PostLike, None),
            "Someone liked your post"
        );
    }

    #[tokio::test]
    async fn test_notify_with_explicit_message_skips_sender_lookup() {
        let stored = create_test_notification("n1", "alice");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored.clone()]]),
        );

        let created = service
            .notify(
                "alice",
                "bob",
                NotificationType::FriendRequest,
                Some("edge1"),
                Some(stored.message.clone()),
            )
            .await
            .unwrap();

        assert_eq!(created.recipient_id, "alice");
    }

    #[tokio::test]
    async fn test_mark_read_missing_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()]),
        );

        let result = service.mark_read("missing", "alice").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_other_users_notification_is_forbidden() {
        let stored = create_test_notification("n1", "alice");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored]]),
        );

        let result = service.delete("n1", "mallory").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_already_read_is_noop() {
        let mut stored = create_test_notification("n1", "alice");
        stored.is_read = true;
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored]]),
        );

        assert!(service.mark_read("n1", "alice").await.is_ok());
    }
}
