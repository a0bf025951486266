//! Core business logic for agora.
//!
//! Services are layered the same way requests flow through them:
//!
//! - [`UserService`] owns accounts, profiles and privacy settings.
//! - [`FriendshipService`] owns the friend request lifecycle and the graph
//!   queries built on it (mutual friends, suggestions).
//! - [`visibility`] decides who may see a profile surface or a post.
//! - [`PostService`] and [`SocialActionService`] own the post aggregate and
//!   the likes, comments and shares applied to it.
//! - [`NotificationService`] persists and serves notifications fanned out by
//!   the other services.

pub mod locks;
pub mod services;

pub use locks::KeyedLocks;
pub use services::*;
