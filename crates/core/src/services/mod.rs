//! Business logic services.

pub mod auth;
pub mod friendship;
pub mod notification;
pub mod post;
pub mod social_action;
pub mod social_graph;
pub mod user;
pub mod visibility;

pub use auth::AuthService;
pub use friendship::{FriendSummary, FriendshipService, PendingRequest, Suggestion};
pub use notification::{NotificationService, NotificationView};
pub use post::{
    CommentView, CreatePostInput, PostDetail, PostService, PostView, UpdatePostInput,
};
pub use social_action::{
    AddCommentInput, LikeResult, ShareResult, SharePostInput, SocialActionService,
};
pub use user::{
    AchievementInput, LifeEventInput, LoginInput, ProfileView, RegisterInput, SearchResult,
    Session, UpdateProfileInput, UserService, UserSummary,
};
