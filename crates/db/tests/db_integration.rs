//! Database integration tests.
//!
//! Each test runs the migrations against a private in-memory SQLite database.

#![allow(clippy::unwrap_used)]

use agora_db::{
    entities::{
        PrivacyLevel, PrivacySettings,
        friend_request::{self, FriendshipStatus},
        notification::{self, NotificationType},
        post, user,
    },
    repositories::{
        FriendRequestRepository, NotificationRepository, PostRepository, UserRepository,
    },
    test_utils::TestDatabase,
};
use chrono::Utc;
use sea_orm::Set;

async fn insert_user(repo: &UserRepository, id: &str, name: &str) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        name: Set(name.to_string()),
        password_hash: Set("hash".to_string()),
        token: Set(Some(format!("token-{id}"))),
        avatar: Set(None),
        cover_photo: Set(None),
        bio: Set(None),
        location: Set(None),
        work: Set(None),
        education: Set(None),
        relationship_status: Set(None),
        birthday: Set(None),
        phone: Set(None),
        website: Set(None),
        interests: Set(serde_json::json!([])),
        is_verified: Set(false),
        privacy_settings: Set(PrivacySettings::default().to_json()),
        life_events: Set(serde_json::json!([])),
        achievements: Set(serde_json::json!([])),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

async fn insert_edge(
    repo: &FriendRequestRepository,
    id: &str,
    requester: &str,
    recipient: &str,
    status: FriendshipStatus,
) -> friend_request::Model {
    let now = Utc::now();
    repo.create(friend_request::ActiveModel {
        id: Set(id.to_string()),
        requester_id: Set(requester.to_string()),
        recipient_id: Set(recipient.to_string()),
        status: Set(status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .await
    .unwrap()
}

async fn insert_post(
    repo: &PostRepository,
    id: &str,
    author: &str,
    privacy: PrivacyLevel,
) -> post::Model {
    let now = Utc::now();
    repo.create(post::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author.to_string()),
        content: Set(format!("post {id}")),
        media_urls: Set(serde_json::json!([])),
        privacy: Set(privacy),
        likes: Set(serde_json::json!([])),
        comments: Set(serde_json::json!([])),
        shares: Set(0),
        shared_post_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_user_lookup_and_search() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());

    insert_user(&users, "u1", "Alice Smith").await;
    insert_user(&users, "u2", "Bob Stone").await;
    insert_user(&users, "u3", "alicia keys").await;

    let by_email = users.find_by_email("U2@example.com").await.unwrap();
    assert_eq!(by_email.unwrap().id, "u2");

    let by_token = users.find_by_token("token-u3").await.unwrap();
    assert_eq!(by_token.unwrap().name, "alicia keys");

    let found = users.search("ALI", "u1", 20).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "u3");
}

#[tokio::test]
async fn test_friend_edges_are_found_in_either_direction() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());
    let edges = FriendRequestRepository::new(db.connection());

    for id in ["a", "b", "c"] {
        insert_user(&users, id, id).await;
    }
    let pending = insert_edge(&edges, "e1", "a", "b", FriendshipStatus::Pending).await;
    insert_edge(&edges, "e2", "c", "a", FriendshipStatus::Accepted).await;

    let between = edges.find_active_between("b", "a").await.unwrap();
    assert_eq!(between.unwrap().id, "e1");
    assert!(edges.find_accepted_between("a", "b").await.unwrap().is_none());

    edges
        .update_status(pending, FriendshipStatus::Accepted)
        .await
        .unwrap();

    let accepted = edges.find_accepted_for_user("a").await.unwrap();
    assert_eq!(accepted.len(), 2);
    assert!(edges.find_pending_received("b").await.unwrap().is_empty());

    edges.delete("e2").await.unwrap();
    assert!(edges.find_accepted_between("a", "c").await.unwrap().is_none());
}

#[tokio::test]
async fn test_feed_respects_privacy() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());
    let posts = PostRepository::new(db.connection());

    for id in ["viewer", "friend", "stranger"] {
        insert_user(&users, id, id).await;
    }
    insert_post(&posts, "p1", "viewer", PrivacyLevel::Private).await;
    insert_post(&posts, "p2", "friend", PrivacyLevel::Friends).await;
    insert_post(&posts, "p3", "stranger", PrivacyLevel::Friends).await;
    insert_post(&posts, "p4", "stranger", PrivacyLevel::Public).await;
    insert_post(&posts, "p5", "friend", PrivacyLevel::Private).await;

    let feed = posts
        .find_feed("viewer", &["friend".to_string()], 0, 20)
        .await
        .unwrap();
    let ids: Vec<_> = feed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p4", "p2", "p1"]);

    let page = posts
        .find_feed("viewer", &["friend".to_string()], 1, 1)
        .await
        .unwrap();
    assert_eq!(page[0].id, "p2");

    let public_only = posts
        .find_by_author("stranger", &[PrivacyLevel::Public], 0, 20)
        .await
        .unwrap();
    assert_eq!(public_only.len(), 1);
}

#[tokio::test]
async fn test_post_interactions_round_trip() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());
    let posts = PostRepository::new(db.connection());

    insert_user(&users, "a", "a").await;
    let created = insert_post(&posts, "p1", "a", PrivacyLevel::Public).await;

    let comment = post::Comment {
        id: "c1".to_string(),
        author_id: "a".to_string(),
        content: "first".to_string(),
        likes: vec![],
        reply_to: None,
        created_at: Utc::now(),
    };
    posts
        .save_interactions(
            created,
            serde_json::json!(["a"]),
            serde_json::to_value(vec![comment]).unwrap(),
        )
        .await
        .unwrap();
    posts.increment_shares("p1").await.unwrap();

    let stored = posts.get_by_id("p1").await.unwrap();
    assert_eq!(stored.like_ids().unwrap(), vec!["a".to_string()]);
    assert_eq!(stored.comment_list().unwrap()[0].content, "first");
    assert_eq!(stored.shares, 1);
}

#[tokio::test]
async fn test_notification_inbox() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());
    let notifications = NotificationRepository::new(db.connection());

    insert_user(&users, "a", "a").await;
    insert_user(&users, "b", "b").await;

    for id in ["n1", "n2", "n3"] {
        notifications
            .create(notification::ActiveModel {
                id: Set(id.to_string()),
                recipient_id: Set("a".to_string()),
                sender_id: Set("b".to_string()),
                notification_type: Set(NotificationType::PostLike),
                reference_id: Set(Some("p1".to_string())),
                message: Set("b liked your post".to_string()),
                is_read: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    assert_eq!(notifications.count_unread("a").await.unwrap(), 3);

    let n1 = notifications.find_by_id("n1").await.unwrap().unwrap();
    notifications.mark_as_read(n1).await.unwrap();
    assert_eq!(notifications.count_unread("a").await.unwrap(), 2);

    let listed = notifications.find_by_recipient("a", 0, 2).await.unwrap();
    assert_eq!(listed[0].id, "n3");
    assert_eq!(listed.len(), 2);

    assert_eq!(notifications.mark_all_as_read("a").await.unwrap(), 2);
    assert_eq!(notifications.delete_all_for_user("a").await.unwrap(), 3);
    assert_eq!(notifications.count_unread("a").await.unwrap(), 0);
}
