//! Database repositories.

mod friend_request;
mod notification;
mod post;
mod user;

pub use friend_request::FriendRequestRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use user::UserRepository;
