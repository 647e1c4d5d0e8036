use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::access;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::{AvailabilityError, CreateWindowRequest, UpdateWindowRequest};
use crate::services::availability::AvailabilityService;

#[axum::debug_handler]
pub async fn get_professional(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.config);

    let professional = service
        .get_professional(professional_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({ "professional": professional })))
}

#[axum::debug_handler]
pub async fn list_windows(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.config);

    // Listing is open to any authenticated caller; clients browse calendars
    // before booking.
    let windows = service
        .list_windows(professional_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "professional_id": professional_id,
        "windows": windows,
        "total": windows.len()
    })))
}

#[axum::debug_handler]
pub async fn create_window(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.config);

    let professional = service
        .get_professional(professional_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    let caller = user.caller();
    if !access::can_manage_calendar(&caller, professional.user_id) {
        return Err(AppError::Forbidden(
            "Only the owning professional may manage this calendar".to_string(),
        ));
    }

    let window = service
        .create_window(professional_id, request, auth.token())
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "window": window,
        "message": "Availability window created"
    })))
}

#[axum::debug_handler]
pub async fn update_window(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(window_id): Path<Uuid>,
    Json(request): Json<UpdateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.config);

    let window = service
        .get_window(window_id, auth.token())
        .await
        .map_err(map_availability_error)?;
    let professional = service
        .get_professional(window.professional_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    let caller = user.caller();
    if !access::can_manage_calendar(&caller, professional.user_id) {
        return Err(AppError::Forbidden(
            "Only the owning professional may manage this calendar".to_string(),
        ));
    }

    let updated = service
        .update_window(window_id, request, auth.token())
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "window": updated,
        "message": "Availability window updated"
    })))
}

#[axum::debug_handler]
pub async fn delete_window(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.config);

    let window = service
        .get_window(window_id, auth.token())
        .await
        .map_err(map_availability_error)?;
    let professional = service
        .get_professional(window.professional_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    let caller = user.caller();
    if !access::can_manage_calendar(&caller, professional.user_id) {
        return Err(AppError::Forbidden(
            "Only the owning professional may manage this calendar".to_string(),
        ));
    }

    service
        .delete_window(window_id, auth.token())
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability window deleted"
    })))
}

fn map_availability_error(err: AvailabilityError) -> AppError {
    match err {
        AvailabilityError::ProfessionalNotFound(_) | AvailabilityError::WindowNotFound(_) => {
            AppError::NotFound(err.to_string())
        }
        AvailabilityError::InvalidWindow(_) => AppError::BadRequest {
            code: "invalid_window",
            message: err.to_string(),
        },
        AvailabilityError::WindowOverlap => AppError::Conflict {
            code: "window_overlap",
            message: err.to_string(),
        },
        AvailabilityError::InvalidTimezone(_) => AppError::Internal(err.to_string()),
        AvailabilityError::Store(inner) => map_store_error(inner),
    }
}

pub(crate) fn map_store_error(err: StoreError) -> AppError {
    match err {
        StoreError::Transient(msg) => AppError::Transient(msg),
        StoreError::Auth(msg) => AppError::Internal(format!("data api rejected credentials: {}", msg)),
        other => AppError::Internal(other.to_string()),
    }
}
