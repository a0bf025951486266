//! Database entities.

pub mod friend_request;
pub mod notification;
pub mod post;
pub mod privacy;
pub mod user;

pub use friend_request::Entity as FriendRequest;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use user::Entity as User;

pub use privacy::{PrivacyLevel, PrivacySettings, Surface};
