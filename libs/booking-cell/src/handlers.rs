use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::pagination::{Page, PageQuery};
use shared_utils::state::AppState;

use crate::models::{
    CreateAppointmentRequest, ListQuery, SchedulingError, StatusChangeRequest,
    UpdateAppointmentRequest,
};
use crate::services::booking::BookingService;

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .create(request, &user.caller(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment scheduled"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get(appointment_id, &user.caller(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let caller = user.caller();

    let page = Page::from_query(&PageQuery {
        page: query.page,
        size: query.size,
    })
    .map_err(|e| map_scheduling_error(e.into()))?;

    let appointments = match (query.by_client, query.by_professional) {
        (Some(client_id), None) => {
            service
                .list_for_client(client_id, &page, &caller, auth.token())
                .await
        }
        (None, Some(professional_id)) => {
            service
                .list_for_professional(professional_id, &page, &caller, auth.token())
                .await
        }
        _ => {
            return Err(AppError::BadRequest {
                code: "invalid_argument",
                message: "exactly one of by_client or by_professional is required".to_string(),
            })
        }
    }
    .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "page": page.number(),
        "size": page.size(),
        "count": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .update(appointment_id, request, &user.caller(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment updated"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .cancel(appointment_id, &user.caller(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .set_status(appointment_id, request.status, &user.caller(), auth.token())
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment status updated"
    })))
}

fn map_scheduling_error(err: SchedulingError) -> AppError {
    let code = err.code();
    match &err {
        SchedulingError::InvalidServiceType(_)
        | SchedulingError::InvalidDate
        | SchedulingError::InvalidArgument(_)
        | SchedulingError::SelfBookingNotAllowed => AppError::BadRequest {
            code,
            message: err.to_string(),
        },
        SchedulingError::ProfessionalUnavailable
        | SchedulingError::TimeConflict
        | SchedulingError::UpdateNotAllowed(_)
        | SchedulingError::CancellationNotAllowed(_)
        | SchedulingError::InvalidTransition { .. } => AppError::Conflict {
            code,
            message: err.to_string(),
        },
        SchedulingError::NotAuthorized => AppError::Forbidden(err.to_string()),
        SchedulingError::NotFound(_) => AppError::NotFound(err.to_string()),
        SchedulingError::Transient(msg) => AppError::Transient(msg.clone()),
        SchedulingError::Internal(msg) => AppError::Internal(msg.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_errors_map_onto_transport_statuses() {
        let conflict = map_scheduling_error(SchedulingError::TimeConflict);
        assert_eq!(conflict.code(), "time_conflict");

        let unavailable = map_scheduling_error(SchedulingError::ProfessionalUnavailable);
        assert_eq!(unavailable.code(), "professional_unavailable");

        let denied = map_scheduling_error(SchedulingError::NotAuthorized);
        assert_eq!(denied.code(), "not_authorized");

        let transient = map_scheduling_error(SchedulingError::Transient("store down".into()));
        assert_eq!(transient.code(), "transient");
    }
}
