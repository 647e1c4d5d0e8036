use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::state::AppState;

use crate::handlers;

pub fn professional_routes(state: Arc<AppState>) -> Router {
    // Calendar browsing and management both require authentication
    let protected_routes = Router::new()
        .route("/{professional_id}", get(handlers::get_professional))
        .route("/{professional_id}/availability", get(handlers::list_windows))
        .route("/{professional_id}/availability", post(handlers::create_window))
        .route("/availability/{window_id}", put(handlers::update_window))
        .route("/availability/{window_id}", delete(handlers::delete_window))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
