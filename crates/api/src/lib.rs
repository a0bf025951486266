//! HTTP API layer for agora.
//!
//! - **Endpoints**: auth, users, friends, posts and notifications
//! - **Extractors**: authenticated user, paging parameters
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
