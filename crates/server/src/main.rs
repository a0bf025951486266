//! agora server entry point.

use std::sync::Arc;

use agora_api::{AppState, auth_middleware, router as api_router};
use agora_common::Config;
use agora_core::{
    FriendshipService, NotificationService, PostService, SocialActionService, UserService,
};
use agora_db::repositories::{
    FriendRequestRepository, NotificationRepository, PostRepository, UserRepository,
};
use axum::{Router, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Install the global subscriber; `json` switches the fmt layer to JSON lines.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agora=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(config.log.json);

    info!("Starting agora server...");

    let db = agora_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    agora_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let friend_request_repo = FriendRequestRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Services
    let notification_service = NotificationService::new(notification_repo, user_repo.clone());
    let friendship_service = FriendshipService::new(
        friend_request_repo,
        user_repo.clone(),
        notification_service.clone(),
        config.social.suggestion_limit,
    );
    let user_service = UserService::new(user_repo.clone(), friendship_service.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        friendship_service.clone(),
    );
    let social_action_service = SocialActionService::new(
        post_repo,
        user_repo,
        post_service.clone(),
        notification_service.clone(),
    );

    let state = AppState::new(
        user_service,
        friendship_service,
        post_service,
        social_action_service,
        notification_service,
        config.social.clone(),
    );

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
