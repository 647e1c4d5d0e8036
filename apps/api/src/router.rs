use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::json;

use booking_cell::router::booking_routes;
use professional_cell::router::professional_routes;
use reporting_cell::router::reporting_routes;
use shared_utils::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Booking and reporting share the /appointments prefix; reporting's
    // static paths take precedence over booking's `/{appointment_id}` capture.
    Router::new()
        .route("/", get(|| async { "Inkline API is running!" }))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest(
            "/appointments",
            booking_routes(state.clone()).merge(reporting_routes(state.clone())),
        )
        .nest("/professionals", professional_routes(state))
}
