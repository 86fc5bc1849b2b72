pub mod error;
pub mod routes;
pub mod state;
pub mod sweep;

use axum::routing::{get, patch, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Workers
        .route("/api/workers", get(routes::workers::list_workers))
        .route("/api/workers", post(routes::workers::create_worker))
        .route("/api/workers/{id}", patch(routes::workers::update_worker))
        .route(
            "/api/workers/{id}/activate",
            post(routes::workers::activate_worker),
        )
        .route(
            "/api/workers/{id}/deactivate",
            post(routes::workers::deactivate_worker),
        )
        // Items
        .route("/api/items", get(routes::items::list_items))
        .route("/api/items", post(routes::items::create_item))
        .route("/api/items/{id}/assign", post(routes::items::assign_item))
        // Reconcile
        .route("/api/reconcile", post(routes::reconcile::reconcile))
        // Dashboard
        .route("/api/stats", get(routes::stats::get_stats))
        .route("/api/config", get(routes::config::get_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the HTTP server on `port`.
///
/// Spawns the scheduled reconcile sweep when `reconcile.interval_secs` is
/// configured.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the HTTP server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();

    for warning in app_state.config.validate() {
        tracing::warn!(level = ?warning.level, "config: {}", warning.message);
    }

    if let Some(schedule) = &app_state.config.reconcile {
        if schedule.interval_secs > 0 {
            tracing::info!(interval_secs = schedule.interval_secs, "scheduled reconcile enabled");
            tokio::spawn(sweep::run(
                app_state.db.clone(),
                Duration::from_secs(schedule.interval_secs),
            ));
        }
    }

    let app = build_router(app_state);
    tracing::info!("rota server listening on http://localhost:{actual_port}");
    axum::serve(listener, app).await?;
    Ok(())
}
