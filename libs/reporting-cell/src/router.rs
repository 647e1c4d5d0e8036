use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_utils::extractor::auth_middleware;
use shared_utils::state::AppState;

use crate::handlers;

/// Read-only views and the export endpoint. Paths are static on purpose:
/// the api binary merges this router with the booking one, whose
/// `/{appointment_id}` capture must not swallow these routes.
pub fn reporting_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/mine", get(handlers::my_bookings))
        .route("/mine/future", get(handlers::my_future_bookings))
        .route("/mine/past", get(handlers::my_past_bookings))
        .route("/engagements/future", get(handlers::my_future_engagements))
        .route("/engagements/past", get(handlers::my_past_engagements))
        .route("/export", get(handlers::export_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
