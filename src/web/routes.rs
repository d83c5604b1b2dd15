use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - REST API used by the UI
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Sessions
            .route("/sessions", post(handlers::api::create_session))
            .route("/sessions/{session_id}", delete(handlers::api::end_session))

            // Conversion
            .route("/convert", post(handlers::api::convert))

            // History
            .route(
                "/history/{session_id}",
                get(handlers::api::list_history).delete(handlers::api::clear_history),
            )

            // Schema shown in the sidebar
            .route("/schema", get(handlers::api::get_schema))

            // Model connection
            .route("/model/reconnect", post(handlers::api::reconnect_model))

            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
