use anyhow::Result;
use axum::{
    extract::Extension,
    routing::{any, get, post},
    Router,
};
use proxi_core::{config::ServerConfig, SharedOperations};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing;

use crate::handlers;

/// All routes, with the operations injected as an extension.
///
/// `get` would also answer `HEAD`, so the list routes reject it explicitly.
/// The `/*id` captures take everything after the prefix, so extra segments
/// and trailing slashes reach the id check instead of a 404.
pub fn router(ops: SharedOperations) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/v1/users",
            get(handlers::get_users)
                .head(handlers::method_not_allowed)
                .post(handlers::create_user)
                .fallback(handlers::method_not_allowed),
        )
        .route("/v1/users/", any(handlers::id_required))
        .route("/v1/users/*id", any(handlers::user_by_id))
        .route(
            "/v1/notif",
            get(handlers::get_notifications)
                .head(handlers::method_not_allowed)
                .post(handlers::create_notification)
                .fallback(handlers::method_not_allowed),
        )
        .route("/v1/notif/", any(handlers::id_required))
        .route("/v1/notif/*id", any(handlers::notification_by_id))
        .route(
            "/v1/user/pro-positions",
            post(handlers::upsert_position).fallback(handlers::method_not_allowed),
        )
        .layer(Extension(ops))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let mut cors = CorsLayer::new();
            for origin in origins {
                if let Ok(parsed) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed);
                } else {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                }
            }
            cors.allow_methods(Any).allow_headers(Any)
        }
        None => {
            tracing::warn!("CORS_ORIGINS not set, using permissive CORS");
            CorsLayer::permissive()
        }
    }
}

pub async fn run(config: &ServerConfig, ops: SharedOperations) -> Result<()> {
    let app = router(ops).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config)),
    );

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.api_port)).await?;
    tracing::info!("Starting API server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
